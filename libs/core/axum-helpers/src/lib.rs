//! # Axum Helpers
//!
//! A collection of utilities, middleware, and helpers for building Axum web
//! applications.
//!
//! ## Modules
//!
//! - **[`auth`]**: stateless JWT verification middleware
//! - **[`errors`]**: structured error responses
//! - **[`extractors`]**: custom extractors (UUID path, validated JSON)
//! - **[`server`]**: server setup, health checks, graceful shutdown

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod server;

// Re-export auth types
pub use auth::{JwtAuth, JwtClaims, JwtConfig, jwt_auth_middleware};

// Re-export error types
pub use errors::{AppError, ErrorResponse};

// Re-export extractors
pub use extractors::{UuidPath, ValidatedJson};

// Re-export server types
pub use server::{create_app, create_production_app, create_router, health_router, shutdown_signal};
