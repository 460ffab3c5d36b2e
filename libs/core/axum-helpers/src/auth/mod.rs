//! Stateless JWT authentication.
//!
//! Token issuance (login, refresh) is owned by the identity service; this
//! module only verifies signatures and expiry, and injects the decoded
//! claims into request extensions for downstream handlers.

mod config;
mod jwt;
mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
