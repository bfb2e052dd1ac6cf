pub mod auth_handler;
pub mod health_handler;

pub use auth_handler::{login, me, refresh, register, register_admin};
pub use health_handler::health;
