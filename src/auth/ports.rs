use crate::auth::domain::{App, AuthResult, StorageResult, User};
use async_trait::async_trait;

/// ユーザーの永続化
///
/// ユーザー名の一意性はバックエンド側で保証し、衝突は
/// `StorageError::UserExists` として返す。
#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn save_user(&self, username: &str, pass_hash: &str) -> StorageResult<i64>;

    /// 見つからなければ `StorageError::UserNotFound`
    async fn user(&self, username: &str) -> StorageResult<User>;

    /// 見つからなければ `StorageError::UserNotFound`
    async fn is_admin(&self, user_id: i64) -> StorageResult<bool>;
}

/// 呼び出し元アプリケーションの参照（読み取り専用）
#[async_trait]
pub trait AppProvider: Send + Sync {
    /// 見つからなければ `StorageError::AppNotFound`
    async fn app(&self, app_id: i32) -> StorageResult<App>;
}

/// gRPC アダプタから呼ばれる認証ユースケース
#[async_trait]
pub trait AuthUseCase: Send + Sync {
    async fn login(&self, username: &str, password: &str, app_id: i32) -> AuthResult<String>;

    async fn register_new_user(&self, username: &str, password: &str) -> AuthResult<i64>;

    async fn is_admin(&self, user_id: i64) -> AuthResult<bool>;
}
