#![allow(dead_code)]

use async_trait::async_trait;
use grpc_sso::auth::adapters::memory::MemoryStorage;
use grpc_sso::auth::domain::{App, AuthError, AuthResult, StorageError, StorageResult, User};
use grpc_sso::auth::password::PasswordHasher;
use grpc_sso::auth::ports::{AppProvider, AuthUseCase, UserStorage};
use grpc_sso::auth::AuthService;
use grpc_sso::config::HashingConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TOKEN_TTL: Duration = Duration::from_secs(3600);

pub fn test_app() -> App {
    App {
        id: 42,
        name: "billing".to_string(),
        secret: "billing-signing-secret".to_string(),
    }
}

/// テストを速くするための低コスト設定
pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(&HashingConfig {
        memory_cost_kib: 1024,
        time_cost: 1,
        parallelism: 1,
    })
    .unwrap()
}

pub fn memory_service() -> (Arc<MemoryStorage>, AuthService) {
    let storage = Arc::new(MemoryStorage::with_apps([test_app()]));
    let service = AuthService::new(storage.clone(), storage.clone(), cheap_hasher(), TOKEN_TTL);
    (storage, service)
}

/// 常に同じエラーを返すストレージ
pub struct FailingStorage {
    pub error: StorageError,
}

#[async_trait]
impl UserStorage for FailingStorage {
    async fn save_user(&self, _username: &str, _pass_hash: &str) -> StorageResult<i64> {
        Err(self.error.clone())
    }

    async fn user(&self, _username: &str) -> StorageResult<User> {
        Err(self.error.clone())
    }

    async fn is_admin(&self, _user_id: i64) -> StorageResult<bool> {
        Err(self.error.clone())
    }
}

#[async_trait]
impl AppProvider for FailingStorage {
    async fn app(&self, _app_id: i32) -> StorageResult<App> {
        Err(self.error.clone())
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// 応答を返さないストレージ
///
/// 呼び出しが始まると `entered`、その future が破棄されると `dropped` が立つ。
#[derive(Default)]
pub struct PendingStorage {
    entered: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

impl PendingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    async fn hang<T>(&self) -> StorageResult<T> {
        self.entered.store(true, Ordering::SeqCst);
        let _guard = DropFlag(self.dropped.clone());
        std::future::pending::<StorageResult<T>>().await
    }
}

#[async_trait]
impl UserStorage for PendingStorage {
    async fn save_user(&self, _username: &str, _pass_hash: &str) -> StorageResult<i64> {
        self.hang().await
    }

    async fn user(&self, _username: &str) -> StorageResult<User> {
        self.hang().await
    }

    async fn is_admin(&self, _user_id: i64) -> StorageResult<bool> {
        self.hang().await
    }
}

#[async_trait]
impl AppProvider for PendingStorage {
    async fn app(&self, _app_id: i32) -> StorageResult<App> {
        self.hang().await
    }
}

/// 応答を差し替えられる認証ユースケースのモック
pub struct MockAuthService {
    pub login_response: Mutex<Option<AuthResult<String>>>,
    pub register_response: Mutex<Option<AuthResult<i64>>>,
    pub is_admin_response: Mutex<Option<AuthResult<bool>>>,
    pub calls: AtomicUsize,
}

impl MockAuthService {
    pub fn new() -> Self {
        Self {
            login_response: Mutex::new(None),
            register_response: Mutex::new(None),
            is_admin_response: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_login_response(&self, response: AuthResult<String>) {
        *self.login_response.lock() = Some(response);
    }

    pub fn set_register_response(&self, response: AuthResult<i64>) {
        *self.register_response.lock() = Some(response);
    }

    pub fn set_is_admin_response(&self, response: AuthResult<bool>) {
        *self.is_admin_response.lock() = Some(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn no_response<T>() -> AuthResult<T> {
        Err(AuthError::InternalError("No mock response set".to_string()))
    }
}

#[async_trait]
impl AuthUseCase for MockAuthService {
    async fn login(&self, _username: &str, _password: &str, _app_id: i32) -> AuthResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.login_response
            .lock()
            .clone()
            .unwrap_or_else(Self::no_response)
    }

    async fn register_new_user(&self, _username: &str, _password: &str) -> AuthResult<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.register_response
            .lock()
            .clone()
            .unwrap_or_else(Self::no_response)
    }

    async fn is_admin(&self, _user_id: i64) -> AuthResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.is_admin_response
            .lock()
            .clone()
            .unwrap_or_else(Self::no_response)
    }
}
