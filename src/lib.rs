pub mod auth;
pub mod config;
pub mod generated;
pub mod logging;

pub use auth::{AuthService, AuthUseCase};
pub use config::Settings;
