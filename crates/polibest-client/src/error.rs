//! # Client Error Types
//!
//! Error types for backend access, configuration and the session context.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Unauthorized           │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  AccessDenied           │ │
//! │  │  ConfigLoad/Save│  │                 │  │  NotFound / Status      │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Session      │  │     Data        │  │      Local I/O          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  NoSession      │  │  Serialization  │  │  Io                     │ │
//! │  │                 │  │  Core           │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use polibest_core::CoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering every failure of a backend call.
///
/// ## Design Principles
/// - Each call is one request/response; no variant is retried automatically
/// - Backend `{"detail": ...}` messages are carried through verbatim
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend or auth URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend rejected the session token (HTTP 401).
    #[error("Not authenticated")]
    Unauthorized,

    /// Sign-in succeeded at the identity provider but the account is not allowed.
    #[error("Access denied for {email}")]
    AccessDenied { email: String },

    /// Resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("Backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// No signed-in session for a call that needs one.
    #[error("Not signed in")]
    NoSession,

    // =========================================================================
    // Data Errors
    // =========================================================================
    /// Body could not be serialized or deserialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Domain rule violated before anything was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Local I/O
    // =========================================================================
    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Serialization(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<polibest_core::ValidationError> for ClientError {
    fn from(err: polibest_core::ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if the user has to sign in (again).
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized | ClientError::NoSession | ClientError::AccessDenied { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the backend could not be reached at all.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, ClientError::Http(_) | ClientError::Timeout)
    }

    /// Returns true for a 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(ClientError::Unauthorized.is_auth_error());
        assert!(ClientError::AccessDenied {
            email: "a@b.c".into()
        }
        .is_auth_error());
        assert!(!ClientError::Timeout.is_auth_error());

        assert!(ClientError::Timeout.is_transport_error());
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
        assert!(ClientError::NotFound("КП не знайдено".into()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Status {
            status: 400,
            detail: "Невірний статус".into(),
        };
        assert_eq!(err.to_string(), "Backend returned 400: Невірний статус");

        let err: ClientError = CoreError::LastRoom.into();
        assert!(matches!(err, ClientError::Core(CoreError::LastRoom)));
    }
}
