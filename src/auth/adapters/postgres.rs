use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::auth::domain::{App, StorageError, StorageResult, User};
use crate::auth::ports::{AppProvider, UserStorage};
use crate::config::PostgresConfig;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id        BIGSERIAL PRIMARY KEY,
        username  TEXT NOT NULL UNIQUE,
        pass_hash TEXT NOT NULL,
        is_admin  BOOLEAN NOT NULL DEFAULT FALSE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS apps (
        app_id INTEGER PRIMARY KEY,
        name   TEXT NOT NULL UNIQUE,
        secret TEXT NOT NULL
    )"#,
];

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    pass_hash: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            pass_hash: row.pass_hash,
            is_admin: row.is_admin,
        }
    }
}

#[derive(FromRow)]
struct AppRow {
    app_id: i32,
    name: String,
    secret: String,
}

impl From<AppRow> for App {
    fn from(row: AppRow) -> Self {
        Self {
            id: row.app_id,
            name: row.name,
            secret: row.secret,
        }
    }
}

/// PostgreSQL 上のユーザー・アプリ
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// 接続し、スキーマが無ければ作成する
    pub async fn connect(config: &PostgresConfig) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(connect_options(config))
            .await
            .map_err(backend)?;

        let storage = Self::from_pool(pool);
        storage.migrate().await?;
        info!(host = %config.host, database = %config.database, "connected to postgres");
        Ok(storage)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StorageResult<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        Ok(())
    }
}

/// 資格情報を URL に埋め込まず、接続オプションとして個別に渡す
pub fn connect_options(config: &PostgresConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
}

fn backend(err: sqlx::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStorage for PostgresStorage {
    async fn save_user(&self, username: &str, pass_hash: &str) -> StorageResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (username, pass_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(pass_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::UserExists
            } else {
                backend(e)
            }
        })
    }

    async fn user(&self, username: &str) -> StorageResult<User> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, pass_hash, is_admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(User::from)
        .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin(&self, user_id: i64) -> StorageResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT is_admin FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl AppProvider for PostgresStorage {
    async fn app(&self, app_id: i32) -> StorageResult<App> {
        sqlx::query_as::<_, AppRow>("SELECT app_id, name, secret FROM apps WHERE app_id = $1")
            .bind(app_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(App::from)
            .ok_or(StorageError::AppNotFound)
    }
}
