pub mod auth_service;
pub mod delay;

pub use auth_service::AuthService;
pub use delay::{FailureDelay, RandomDelay};
