//! Event domain error types

use axum_helpers::AppError;
use std::fmt;

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Event domain errors, mapped onto the 401/403/400/404/409/500 families.
#[derive(Debug)]
pub enum EventError {
    /// No resolved actor
    Unauthorized { message: String },

    /// Actor resolved but lacks permission for the action
    Forbidden { message: String },

    /// Malformed id, bad date ordering, failed validation; the message
    /// names the offending value
    InvalidArgument { message: String },

    /// Event or referenced category/member absent
    NotFound { entity: &'static str, id: String },

    /// Reserved; not currently raised by this subsystem
    Conflict { message: String },

    /// MongoDB error
    Database {
        message: String,
        source: Option<mongodb::error::Error>,
    },

    /// Internal error
    Internal { message: String },
}

impl EventError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized {
            message: "Authentication required".to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            Self::Forbidden { message } => write!(f, "Forbidden: {}", message),
            Self::InvalidArgument { message } => write!(f, "Invalid argument: {}", message),
            Self::NotFound { entity, id } => write!(f, "{} not found: {}", entity, id),
            Self::Conflict { message } => write!(f, "Conflict: {}", message),
            Self::Database { message, .. } => write!(f, "Database error: {}", message),
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for EventError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database {
                source: Some(e), ..
            } => Some(e),
            _ => None,
        }
    }
}

impl From<mongodb::error::Error> for EventError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<mongodb::bson::ser::Error> for EventError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::Database {
            message: format!("BSON serialization error: {}", err),
            source: None,
        }
    }
}

impl From<mongodb::bson::de::Error> for EventError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        Self::Database {
            message: format!("BSON deserialization error: {}", err),
            source: None,
        }
    }
}

impl From<validator::ValidationErrors> for EventError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidArgument {
            message: err.to_string(),
        }
    }
}

// Convert to axum_helpers::AppError for HTTP responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Unauthorized { message } => AppError::Unauthorized(message),
            EventError::Forbidden { message } => AppError::Forbidden(message),
            EventError::InvalidArgument { message } => AppError::BadRequest(message),
            EventError::NotFound { entity, id } => {
                AppError::NotFound(format!("{} not found: {}", entity, id))
            }
            EventError::Conflict { message } => AppError::Conflict(message),
            EventError::Database { message, .. } => AppError::InternalServerError(message),
            EventError::Internal { message } => AppError::InternalServerError(message),
        }
    }
}

impl axum::response::IntoResponse for EventError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
