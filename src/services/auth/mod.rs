pub mod access_jwt;
pub mod claims;
pub mod error;
pub mod factory;
pub mod jwks;

pub use access_jwt::AuthService;
pub use error::AuthError;
pub use factory::build_auth_service;
