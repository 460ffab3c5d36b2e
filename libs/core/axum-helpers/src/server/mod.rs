//! Server bootstrap: router assembly, health endpoints, graceful shutdown.

mod app;
mod health;
mod shutdown;

pub use app::{create_app, create_production_app, create_router};
pub use health::{HealthResponse, health_router};
pub use shutdown::shutdown_signal;
