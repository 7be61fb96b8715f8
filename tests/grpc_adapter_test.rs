mod common;

use std::sync::Arc;

use common::MockAuthService;
use grpc_sso::auth::adapters::grpc::GrpcAuthService;
use grpc_sso::auth::domain::{AuthError, StorageError};
use grpc_sso::generated::sso::auth_server::Auth;
use grpc_sso::generated::sso::{IsAdminRequest, LoginRequest, RegisterRequest};
use tonic::{Code, Request, Status};

fn login_request(username: &str, password: &str, app_id: i32) -> Request<LoginRequest> {
    Request::new(LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
        app_id,
    })
}

#[tokio::test]
async fn test_login_success() {
    let mock_service = Arc::new(MockAuthService::new());
    let grpc_service = GrpcAuthService::new(mock_service.clone());
    mock_service.set_login_response(Ok("signed.jwt.token".to_string()));

    let response = grpc_service
        .login(login_request("alice", "s3cret", 42))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.token, "signed.jwt.token");
    assert_eq!(mock_service.calls(), 1);
}

#[tokio::test]
async fn test_login_validation_never_reaches_service() {
    let mock_service = Arc::new(MockAuthService::new());
    let grpc_service = GrpcAuthService::new(mock_service.clone());
    mock_service.set_login_response(Ok("unused".to_string()));

    let cases = [
        (login_request("", "p", 1), "username required"),
        (login_request("u", "", 1), "password required"),
        (login_request("u", "p", 0), "app id required"),
    ];

    for (request, message) in cases {
        let status = grpc_service.login(request).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), message);
    }
    assert_eq!(mock_service.calls(), 0);
}

#[tokio::test]
async fn test_register_success_and_validation() {
    let mock_service = Arc::new(MockAuthService::new());
    let grpc_service = GrpcAuthService::new(mock_service.clone());
    mock_service.set_register_response(Ok(1));

    let response = grpc_service
        .register(Request::new(RegisterRequest {
            username: "alice".to_string(),
            password: "s3cret".to_string(),
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(response.user_id, 1);

    let status = grpc_service
        .register(Request::new(RegisterRequest {
            username: "alice".to_string(),
            password: String::new(),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "password required");

    let status = grpc_service
        .register(Request::new(RegisterRequest {
            username: String::new(),
            password: "s3cret".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.message(), "username required");

    assert_eq!(mock_service.calls(), 1);
}

#[tokio::test]
async fn test_is_admin_success_and_validation() {
    let mock_service = Arc::new(MockAuthService::new());
    let grpc_service = GrpcAuthService::new(mock_service.clone());
    mock_service.set_is_admin_response(Ok(true));

    let response = grpc_service
        .is_admin(Request::new(IsAdminRequest { user_id: 5 }))
        .await
        .unwrap()
        .into_inner();
    assert!(response.is_admin);

    let status = grpc_service
        .is_admin(Request::new(IsAdminRequest { user_id: 0 }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "user id required");
    assert_eq!(mock_service.calls(), 1);
}

#[tokio::test]
async fn test_domain_errors_keep_legacy_status_code() {
    let mock_service = Arc::new(MockAuthService::new());
    let grpc_service = GrpcAuthService::new(mock_service.clone());
    mock_service.set_login_response(Err(AuthError::InvalidCredentials));

    let status = grpc_service
        .login(login_request("alice", "wrong", 42))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert_eq!(status.message(), "invalid credentials");
}

#[test]
fn test_auth_error_to_status_conversion() {
    assert_eq!(
        Status::from(AuthError::UserAlreadyExists).message(),
        "user already exists"
    );
    assert_eq!(
        Status::from(AuthError::UserNotFound(3)).message(),
        "user not found: 3"
    );
    assert_eq!(
        Status::from(AuthError::InvalidAppId(7)).message(),
        "invalid app id: 7"
    );

    // 内部エラーの詳細は呼び出し側に出さない
    let status = Status::from(AuthError::Storage {
        op: "auth.login",
        source: StorageError::Backend("password=hunter2 host=db".to_string()),
    });
    assert_eq!(status.code(), Code::Internal);
    assert_eq!(status.message(), "internal server error");

    let status = Status::from(AuthError::InternalError("argon2 exploded".to_string()));
    assert_eq!(status.message(), "internal server error");
}
