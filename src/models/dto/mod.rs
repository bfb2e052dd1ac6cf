pub mod request;
pub mod response;

pub use request::{LoginRequest, RefreshRequest, RegisterRequest};
pub use response::{TokenResponse, UserProfileResponse};
