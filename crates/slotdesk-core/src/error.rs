//! Error types for Slot Desk Core
//!
//! Provides error handling for:
//! - Gateway (transport, HTTP status, decoding) failures
//! - Form validation failures that must never reach the gateway
//! - Access denial at page load
//! - Configuration problems

use crate::session::DenialReason;

/// Main Slot Desk error type
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    /// Remote gateway call failed
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Form input rejected before reaching the gateway
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// Page access denied
    #[error("access denied: {0}")]
    AccessDenied(DenialReason),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl SlotError {
    /// Check if the error came from the network or the remote service
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Gateway(e) if e.is_transport())
    }

    /// Check if the error is a validation failure of the form
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Form(_))
    }
}

/// Remote gateway errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Connection, timeout or other transport failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Service answered with a non-success status
    #[error("service returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message reported by the service, or the status reason
        message: String,
    },

    /// Response body could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),

    /// Base URL rejected at construction
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

impl GatewayError {
    /// Check if the failure happened on the wire or at the service
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// Form validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// No school year selected
    #[error("no school year selected")]
    MissingYear,

    /// No program selected
    #[error("no program selected")]
    MissingProgram,

    /// No max-slots value entered
    #[error("no max slots value entered")]
    MissingMaxSlots,

    /// Max-slots input is not a positive integer
    #[error("invalid quantity: {0:?}")]
    InvalidQuantity(String),

    /// A save is already outstanding
    #[error("a save is already in flight")]
    SaveInFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_error_display() {
        let err = SlotError::from(FormError::InvalidQuantity("abc".to_string()));
        assert!(err.to_string().contains("invalid quantity"));
        assert!(err.is_validation());
        assert!(!err.is_transport());
    }

    #[test]
    fn gateway_error_classification() {
        assert!(GatewayError::Transport("refused".to_string()).is_transport());
        assert!(GatewayError::Status {
            status: 500,
            message: "boom".to_string()
        }
        .is_transport());
        assert!(!GatewayError::Decode("eof".to_string()).is_transport());

        let err = SlotError::from(GatewayError::Transport("refused".to_string()));
        assert!(err.is_transport());
    }

    #[test]
    fn status_error_carries_service_message() {
        let err = GatewayError::Status {
            status: 404,
            message: "Year not found".to_string(),
        };
        assert_eq!(err.to_string(), "service returned 404: Year not found");
    }
}
