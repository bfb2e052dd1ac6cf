pub mod refresh_token;
pub mod role_profile;
pub mod user;

pub use refresh_token::{RefreshToken, TokenState};
pub use role_profile::RoleProfile;
pub use user::User;
