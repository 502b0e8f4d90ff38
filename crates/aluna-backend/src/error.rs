//! Error types for the backend boundary.
//!
//! Every transport failure is folded into one of these variants before it
//! leaves this crate; callers never see a raw `reqwest::Error`.

use aluna_core::AlunaError;

/// Errors from the assistant backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be reached or the connection broke mid-flight.
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// The requested company is not registered.
    #[error("company not found: {0}")]
    NotFound(String),
    /// The backend rejected the submitted input.
    #[error("validation error: {0}")]
    Validation(String),
    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<BackendError> for AlunaError {
    fn from(err: BackendError) -> Self {
        AlunaError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_variants() {
        let err = BackendError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "network error: connection refused");

        let err = BackendError::Server {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "server error (500): boom");

        let err = BackendError::NotFound("msbc_group".to_string());
        assert_eq!(err.to_string(), "company not found: msbc_group");

        let err = BackendError::Validation("company_url is required".to_string());
        assert_eq!(err.to_string(), "validation error: company_url is required");

        let err = BackendError::Decode("unexpected EOF".to_string());
        assert_eq!(err.to_string(), "decode error: unexpected EOF");
    }

    #[test]
    fn test_into_aluna_error() {
        let err: AlunaError = BackendError::NotFound("acme".to_string()).into();
        assert!(matches!(err, AlunaError::Backend(_)));
        assert!(err.to_string().contains("acme"));
    }
}
