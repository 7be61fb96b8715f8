pub mod adapters;
pub mod domain;
pub mod password;
pub mod ports;
pub mod service;
pub mod token;

pub use domain::{AuthError, AuthResult};
pub use ports::{AppProvider, AuthUseCase, UserStorage};
pub use service::AuthService;
