use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tokio::task;
use tracing::debug;

use crate::auth::domain::{AuthError, AuthResult};
use crate::config::HashingConfig;

/// argon2id によるパスワードハッシュ
///
/// コストは設定で変えられる。ハッシュ計算は CPU を占有するため、
/// async 側からは `hash_blocking` / `verify_blocking` を使う。
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    // 存在しないユーザーの照合に使う、同じコストのハッシュ
    dummy_hash: String,
}

const DUMMY_PASSWORD: &str = "unknown-user-dummy-password";

impl PasswordHasher {
    pub fn new(config: &HashingConfig) -> AuthResult<Self> {
        let params = Params::new(
            config.memory_cost_kib,
            config.time_cost,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::ConfigError(format!("invalid argon2 params: {e}")))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::InternalError(format!("failed to hash password: {e}")))?;

        Ok(hash.to_string())
    }

    /// 保存済みハッシュと照合する
    ///
    /// ハッシュ自体に埋め込まれたパラメータで検証するので、
    /// コスト変更前に作られたハッシュもそのまま検証できる。
    pub fn verify(&self, password: &str, pass_hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(pass_hash)
            .map_err(|e| AuthError::InternalError(format!("malformed password hash: {e}")))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::InternalError(format!(
                "password verification failed: {e}"
            ))),
        }
    }

    pub async fn hash_blocking(&self, password: &str) -> AuthResult<String> {
        let hasher = self.clone();
        let password = password.to_string();
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::InternalError(format!("hashing task failed: {e}")))?
    }

    pub async fn verify_blocking(&self, password: &str, pass_hash: &str) -> AuthResult<bool> {
        debug!("verifying password");
        let hasher = self.clone();
        let password = password.to_string();
        let pass_hash = pass_hash.to_string();
        task::spawn_blocking(move || hasher.verify(&password, &pass_hash))
            .await
            .map_err(|e| AuthError::InternalError(format!("verification task failed: {e}")))?
    }

    /// 存在しないユーザーに対しても同じコストの照合を行う
    ///
    /// 応答時間からユーザー名の有無が分からないようにするため。
    pub async fn verify_dummy_blocking(&self, password: &str) -> AuthResult<()> {
        let dummy_hash = self.dummy_hash.clone();
        self.verify_blocking(password, &dummy_hash).await.map(|_| ())
    }
}
