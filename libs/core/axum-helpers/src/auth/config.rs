use core_config::{ConfigError, FromEnv, env_required};

/// JWT verification configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HMAC secret shared with the identity service that mints tokens
    pub secret: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl FromEnv for JwtConfig {
    /// Reads `JWT_SECRET` (required).
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env_required("JWT_SECRET")?,
        })
    }
}
