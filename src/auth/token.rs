//! アプリケーション単位で署名するセッショントークンの発行
//!
//! トークンは HS256 の JWT で、署名鍵は [`App::secret`]。
//! サーバー側には保存せず、署名と `exp` だけで有効性が決まる。

use std::time::Duration;

use jsonwebtoken::{decode as jwt_decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::auth::domain::{App, User};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub uid: i64,
    pub username: String,
    pub is_admin: bool,
    pub app_id: i32,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("validity duration must be at least one second")]
    InvalidDuration,

    #[error("invalid subject: {0}")]
    InvalidSubject(&'static str),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("token rejected: {0}")]
    Rejected(String),
}

/// 現在時刻でトークンを発行する
pub fn issue(user: &User, app: &App, ttl: Duration) -> Result<String, TokenError> {
    issue_at(user, app, ttl, OffsetDateTime::now_utc())
}

/// `now` を発行時刻としてトークンを発行する
///
/// `iat` は秒単位に切り捨て、`exp = iat + ttl` を秒単位で厳密に保つ。
/// `ttl` の 1 秒未満の端数は無視される。
pub fn issue_at(
    user: &User,
    app: &App,
    ttl: Duration,
    now: OffsetDateTime,
) -> Result<String, TokenError> {
    let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| TokenError::InvalidDuration)?;
    if ttl_secs == 0 {
        return Err(TokenError::InvalidDuration);
    }
    if user.id <= 0 {
        return Err(TokenError::InvalidSubject("user id"));
    }
    if user.username.is_empty() {
        return Err(TokenError::InvalidSubject("username"));
    }
    if app.id <= 0 {
        return Err(TokenError::InvalidSubject("app id"));
    }
    if app.secret.is_empty() {
        return Err(TokenError::Signing("app has no signing secret".to_string()));
    }

    let iat = now.unix_timestamp();
    let exp = iat
        .checked_add(ttl_secs)
        .ok_or(TokenError::InvalidDuration)?;

    let claims = Claims {
        uid: user.id,
        username: user.username.clone(),
        is_admin: user.is_admin,
        app_id: app.id,
        iat,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(app.secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// アプリの秘密鍵で署名と有効期限を検証し、クレームを返す
pub fn decode(token: &str, app: &App) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = jwt_decode::<Claims>(
        token,
        &DecodingKey::from_secret(app.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| TokenError::Rejected(e.to_string()))?;

    if data.claims.app_id != app.id {
        return Err(TokenError::Rejected("token issued for another app".to_string()));
    }
    Ok(data.claims)
}
