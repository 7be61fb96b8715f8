use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::token::TokenError;

/// 登録済みユーザー
///
/// `pass_hash` は argon2 の PHC 文字列で、平文パスワードは保持しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub pass_hash: String,
    pub is_admin: bool,
}

/// トークンを要求する呼び出し元アプリケーション
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct App {
    pub id: i32,
    pub name: String,
    pub secret: String,
}

/// リポジトリ契約が返すエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("app not found")]
    AppNotFound,

    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("invalid app id: {0}")]
    InvalidAppId(i32),

    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("token issuance failed: {0}")]
    Token(#[from] TokenError),

    #[error("{op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: StorageError,
    },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// 呼び出し側で回復可能な分類済みエラーかどうか
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::UserAlreadyExists
                | AuthError::InvalidAppId(_)
                | AuthError::UserNotFound(_)
        )
    }

    pub(crate) fn storage(op: &'static str, source: StorageError) -> Self {
        AuthError::Storage { op, source }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
pub type StorageResult<T> = Result<T, StorageError>;
