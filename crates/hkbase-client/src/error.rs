//! Error taxonomy for hkbase client operations.
//!
//! Two tiers: errors the server itself reported ([`HkError::Server`],
//! [`HkError::NotConnected`]) pass through every layer unchanged; anything
//! else that fails inside an operation (network, JSON decoding, file
//! reads) is wrapped into [`HkError::Client`] with the original cause
//! retained as `source`. Caller-input errors are returned directly and
//! never wrapped.

use std::error::Error as StdError;

/// Errors returned by [`HkBase`](crate::HkBase) and
/// [`HkRepository`](crate::HkRepository) operations.
#[derive(Debug, thiserror::Error)]
pub enum HkError {
    /// Client construction failed (invalid URL, HTTP client setup)
    #[error("client init error: {0}")]
    Init(String),
    /// The server answered with a non-success status
    #[error("server error (status {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body text
        message: String,
    },
    /// The named repository is not in the server's listing
    #[error("could not connect to repository {0:?}")]
    NotConnected(String),
    /// A raw entity value that is not a JSON object was passed to a
    /// mutation operation
    #[error("entity value is not a JSON object")]
    InvalidEntity,
    /// A non-server failure inside an operation, with its cause
    #[error("{message}")]
    Client {
        /// What the operation was trying to do
        message: String,
        /// The underlying failure
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl HkError {
    /// Wrap a non-domain failure with an operation-specific message.
    pub(crate) fn wrap<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        HkError::Client {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn wrap_retains_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = HkError::wrap("entities not added", cause);

        assert_eq!(err.to_string(), "entities not added");
        assert!(err.source().is_some());
    }

    #[test]
    fn server_error_reports_status_and_body() {
        let err = HkError::Server {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "server error (status 500): boom");
    }
}
