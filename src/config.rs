use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::domain::App;

pub const DEFAULT_CONFIG_PATH: &str = "config/default";

/// コマンドライン引数
///
/// `--config` が `CONFIG_PATH` より優先される。
#[derive(Debug, Parser)]
#[command(name = "grpc-sso", about = "gRPC single sign-on service")]
pub struct Cli {
    /// 設定ファイルのパス（拡張子なし可）
    #[arg(long, env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub env: Env,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    pub grpc: GrpcConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub hashing: HashingConfig,
    #[serde(default)]
    pub apps: Vec<App>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    #[default]
    Local,
    Dev,
    Prod,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrpcConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub postgres: Option<PostgresConfig>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HashingConfig {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

fn default_token_ttl_secs() -> u64 {
    3600
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_connections() -> u32 {
    10
}

impl Settings {
    pub fn new_with_config(config_path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(config_path))
            .add_source(Environment::with_prefix("SSO").separator("__"))
            .build()?;

        Self::from_config(config)
    }

    /// 読み込んだ設定を検証する
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        if settings.token_ttl_secs == 0 {
            return Err(ConfigError::Message(
                "token_ttl_secs must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

impl GrpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
