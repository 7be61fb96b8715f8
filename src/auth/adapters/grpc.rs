use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::{error, info};

use crate::auth::domain::AuthError;
use crate::auth::ports::AuthUseCase;
use crate::generated::sso::auth_server::{Auth, AuthServer};
use crate::generated::sso::{
    IsAdminRequest, IsAdminResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};

const EMPTY_VALUE: i64 = 0;

pub struct GrpcAuthService<T: AuthUseCase> {
    auth_service: Arc<T>,
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        if err.is_caller_error() {
            // 分類済みのエラーは固定メッセージのみ返す
            return Status::internal(err.to_string());
        }
        error!("internal error: {:?}", err);
        Status::internal("internal server error")
    }
}

impl<T: AuthUseCase> GrpcAuthService<T> {
    pub fn new(auth_service: Arc<T>) -> Self {
        Self { auth_service }
    }
}

fn validate_login(req: &LoginRequest) -> Result<(), Status> {
    if req.username.is_empty() {
        return Err(Status::invalid_argument("username required"));
    }
    if req.password.is_empty() {
        return Err(Status::invalid_argument("password required"));
    }
    if i64::from(req.app_id) == EMPTY_VALUE {
        return Err(Status::invalid_argument("app id required"));
    }
    Ok(())
}

fn validate_register(req: &RegisterRequest) -> Result<(), Status> {
    if req.username.is_empty() {
        return Err(Status::invalid_argument("username required"));
    }
    if req.password.is_empty() {
        return Err(Status::invalid_argument("password required"));
    }
    Ok(())
}

fn validate_is_admin(req: &IsAdminRequest) -> Result<(), Status> {
    if req.user_id == EMPTY_VALUE {
        return Err(Status::invalid_argument("user id required"));
    }
    Ok(())
}

#[tonic::async_trait]
impl<T: AuthUseCase + 'static> Auth for GrpcAuthService<T> {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();
        validate_register(&req)?;

        let user_id = self
            .auth_service
            .register_new_user(&req.username, &req.password)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(RegisterResponse { user_id }))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();
        validate_login(&req)?;

        let token = self
            .auth_service
            .login(&req.username, &req.password, req.app_id)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(LoginResponse { token }))
    }

    async fn is_admin(
        &self,
        request: Request<IsAdminRequest>,
    ) -> Result<Response<IsAdminResponse>, Status> {
        let req = request.into_inner();
        validate_is_admin(&req)?;

        let is_admin = self
            .auth_service
            .is_admin(req.user_id)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(IsAdminResponse { is_admin }))
    }
}

/// `shutdown` が完了するまで gRPC サーバーを動かす
///
/// `timeout` を超えたリクエストはハンドラの future ごと破棄され、
/// 実行中のストレージ呼び出しも中断される。
pub async fn serve<T, F>(
    auth_service: Arc<T>,
    addr: SocketAddr,
    timeout: Duration,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    T: AuthUseCase + 'static,
    F: Future<Output = ()>,
{
    info!("gRPC server listening on {}", addr);

    Server::builder()
        .timeout(timeout)
        .add_service(AuthServer::new(GrpcAuthService::new(auth_service)))
        .serve_with_shutdown(addr, shutdown)
        .await
}
