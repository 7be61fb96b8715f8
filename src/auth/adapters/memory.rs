use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::auth::domain::{App, StorageError, StorageResult, User};
use crate::auth::ports::{AppProvider, UserStorage};

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    by_username: HashMap<String, i64>,
    apps: HashMap<i32, App>,
    next_id: i64,
}

/// プロセス内に保持するストレージ
///
/// ローカル実行とテスト用。ユーザー名の重複確認と挿入は同じ書き込み
/// ロックの中で行うため、同名の同時登録はちょうど一件だけ成功する。
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apps(apps: impl IntoIterator<Item = App>) -> Self {
        let storage = Self::new();
        for app in apps {
            storage.insert_app(app);
        }
        storage
    }

    /// アプリを登録する（同じ id は上書き）
    pub fn insert_app(&self, app: App) {
        self.tables.write().apps.insert(app.id, app);
    }

    /// 管理者フラグを直接書き換える
    pub fn set_admin(&self, user_id: i64, is_admin: bool) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(StorageError::UserNotFound)?;
        user.is_admin = is_admin;
        Ok(())
    }

    pub fn user_count(&self) -> usize {
        self.tables.read().users.len()
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn save_user(&self, username: &str, pass_hash: &str) -> StorageResult<i64> {
        let mut tables = self.tables.write();
        if tables.by_username.contains_key(username) {
            return Err(StorageError::UserExists);
        }

        tables.next_id += 1;
        let id = tables.next_id;
        tables.by_username.insert(username.to_string(), id);
        tables.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                pass_hash: pass_hash.to_string(),
                is_admin: false,
            },
        );
        Ok(id)
    }

    async fn user(&self, username: &str) -> StorageResult<User> {
        let tables = self.tables.read();
        tables
            .by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned()
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin(&self, user_id: i64) -> StorageResult<bool> {
        self.tables
            .read()
            .users
            .get(&user_id)
            .map(|user| user.is_admin)
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl AppProvider for MemoryStorage {
    async fn app(&self, app_id: i32) -> StorageResult<App> {
        self.tables
            .read()
            .apps
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::AppNotFound)
    }
}
