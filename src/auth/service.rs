use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::auth::domain::{AuthError, AuthResult, StorageError};
use crate::auth::password::PasswordHasher;
use crate::auth::ports::{AppProvider, AuthUseCase, UserStorage};
use crate::auth::token;

/// ログイン・登録・管理者判定のユースケース
///
/// 注入された依存以外に状態を持たないため、複数のリクエストから
/// 同時に呼び出してよい。
pub struct AuthService {
    span: Span,
    user_storage: Arc<dyn UserStorage>,
    app_provider: Arc<dyn AppProvider>,
    hasher: PasswordHasher,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        user_storage: Arc<dyn UserStorage>,
        app_provider: Arc<dyn AppProvider>,
        hasher: PasswordHasher,
        token_ttl: Duration,
    ) -> Self {
        Self {
            span: Span::current(),
            user_storage,
            app_provider,
            hasher,
            token_ttl,
        }
    }

    /// 各操作のスパンの親を差し替える（テストでのログ捕捉用）
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    async fn login_inner(&self, username: &str, password: &str, app_id: i32) -> AuthResult<String> {
        const OP: &str = "auth.login";

        let user = match self.user_storage.user(username).await {
            Ok(user) => user,
            Err(StorageError::UserNotFound) => {
                warn!("user not found");
                self.hasher.verify_dummy_blocking(password).await?;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "failed to fetch user");
                return Err(AuthError::storage(OP, e));
            }
        };

        if !self.hasher.verify_blocking(password, &user.pass_hash).await? {
            info!("invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let app = match self.app_provider.app(app_id).await {
            Ok(app) => app,
            Err(StorageError::AppNotFound) => {
                warn!("app not found");
                return Err(AuthError::InvalidAppId(app_id));
            }
            Err(e) => {
                error!(error = %e, "failed to fetch app");
                return Err(AuthError::storage(OP, e));
            }
        };

        let token = token::issue(&user, &app, self.token_ttl).map_err(|e| {
            error!(error = %e, "failed to generate token");
            AuthError::from(e)
        })?;

        info!(user_id = user.id, "user logged in");
        Ok(token)
    }

    async fn register_inner(&self, username: &str, password: &str) -> AuthResult<i64> {
        const OP: &str = "auth.register_new_user";

        info!("registering user");
        let pass_hash = self.hasher.hash_blocking(password).await.map_err(|e| {
            error!(error = %e, "failed to hash password");
            e
        })?;

        match self.user_storage.save_user(username, &pass_hash).await {
            Ok(id) => {
                info!(user_id = id, "user registered");
                Ok(id)
            }
            Err(StorageError::UserExists) => {
                warn!("user already exists");
                Err(AuthError::UserAlreadyExists)
            }
            Err(e) => {
                error!(error = %e, "failed to save user");
                Err(AuthError::storage(OP, e))
            }
        }
    }

    async fn is_admin_inner(&self, user_id: i64) -> AuthResult<bool> {
        const OP: &str = "auth.is_admin";

        info!("checking if user is admin");
        match self.user_storage.is_admin(user_id).await {
            Ok(is_admin) => {
                info!(is_admin, "checked if user is admin");
                Ok(is_admin)
            }
            Err(StorageError::UserNotFound) => {
                warn!("user not found");
                Err(AuthError::UserNotFound(user_id))
            }
            Err(e) => {
                error!(error = %e, "failed to check admin flag");
                Err(AuthError::storage(OP, e))
            }
        }
    }
}

#[async_trait]
impl AuthUseCase for AuthService {
    async fn login(&self, username: &str, password: &str, app_id: i32) -> AuthResult<String> {
        let span = info_span!(parent: &self.span, "auth.login", username, app_id);
        self.login_inner(username, password, app_id)
            .instrument(span)
            .await
    }

    async fn register_new_user(&self, username: &str, password: &str) -> AuthResult<i64> {
        let span = info_span!(parent: &self.span, "auth.register_new_user", username);
        self.register_inner(username, password)
            .instrument(span)
            .await
    }

    async fn is_admin(&self, user_id: i64) -> AuthResult<bool> {
        let span = info_span!(parent: &self.span, "auth.is_admin", user_id);
        self.is_admin_inner(user_id).instrument(span).await
    }
}
