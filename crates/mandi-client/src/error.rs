//! # Client Error Types
//!
//! Error types for everything that talks to the backend or the disk.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  HTTP status    │  │   Transport     │  │     Local               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Unauthorized   │  │  Transport      │  │  Config                 │ │
//! │  │  Forbidden      │  │  Decode         │  │  Storage                │ │
//! │  │  NotFound       │  │                 │  │  NotAuthenticated       │ │
//! │  │  Api            │  │                 │  │  Core (rules)           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  401 / 403 ──► requires_login() ──► SessionHolder sends the user to    │
//! │                                     the login page                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors are classified by HTTP status only. The backend's `detail`
//! message is kept so it can be shown as-is.

use mandi_core::CoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Shown when the backend rejects an admin call.
pub const PERMISSION_DENIED_MESSAGE: &str = "Permission denied. Admin access required.";

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // HTTP Status Errors
    // =========================================================================
    /// 401: the token is missing, invalid or expired, or the login failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403: signed in, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404 with the backend's detail.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never got a response.
    #[error("Network error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// The call needs a session and there is none.
    #[error("Not signed in")]
    NotAuthenticated,

    /// A cart or checkout rule rejected the input before any request.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// Builds the error for a non-success HTTP status.
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            401 => ClientError::Unauthorized(detail),
            403 => ClientError::Forbidden(detail),
            404 => ClientError::NotFound(detail),
            _ => ClientError::Api { status, detail },
        }
    }

    /// Whether the presentation layer should send the user to log in.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized(_) | ClientError::Forbidden(_) | ClientError::NotAuthenticated
        )
    }

    /// Whether the stored token can no longer be used.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Text to show the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthorized(detail) if !detail.is_empty() => detail.clone(),
            ClientError::Unauthorized(_) => {
                "Your session has expired. Please log in again.".to_string()
            }
            ClientError::Forbidden(_) => PERMISSION_DENIED_MESSAGE.to_string(),
            ClientError::NotFound(detail) if !detail.is_empty() => detail.clone(),
            ClientError::NotFound(_) => "Not found.".to_string(),
            ClientError::Api { detail, .. } if !detail.is_empty() => detail.clone(),
            ClientError::Api { status, .. } => {
                format!("The server returned an error ({}). Please try again.", status)
            }
            ClientError::Transport(_) => {
                "Could not reach the server. Please check your connection.".to_string()
            }
            ClientError::Decode(_) => "Unexpected response from the server.".to_string(),
            ClientError::Config(msg) => format!("Configuration problem: {}", msg),
            ClientError::Storage(_) => "Could not access the saved session.".to_string(),
            ClientError::NotAuthenticated => "Please log in to continue.".to_string(),
            ClientError::Core(err) => err.to_string(),
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::from_status(status.as_u16(), err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid URL: {}", err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<mandi_core::ValidationError> for ClientError {
    fn from(err: mandi_core::ValidationError) -> Self {
        ClientError::Core(err.into())
    }
}
