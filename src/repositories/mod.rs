pub mod refresh_token_repository;
pub mod role_profile_repository;
pub mod user_repository;

pub use refresh_token_repository::{MongoRefreshTokenRepository, RefreshTokenRepository};
pub use role_profile_repository::{MongoRoleProfileRepository, RoleProfileRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
