//! Error types for the Cloud Connector provider.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors that can occur while serving a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested object does not exist on the Cloud Connector.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider is not configured or its configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// Invalid request from the host (malformed state, bad import id).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The Cloud Connector answered with a non-success status.
    ///
    /// `kind` and `message` come from the `{type, message}` error body.
    #[error("Cloud Connector API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `type` field of the error body, empty if the body was not JSON.
        kind: String,
        /// The `message` field of the error body, or the raw body.
        message: String,
    },

    /// The request never produced a response.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured instance URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::InvalidRequest(msg) => msg,
            Self::Api { message, .. } => message,
            Self::Http(_) => "transport error (see Debug output)",
            Self::Serialization(_) => "serialization error (see Debug output)",
            Self::Url(_) => "URL error (see Debug output)",
        }
    }

    /// Whether the error means the remote object is gone.
    ///
    /// Both an explicit [`ProviderError::NotFound`] and an HTTP 404 from the
    /// API count.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Api { status: 404, .. })
    }

    /// Convert into an error diagnostic for the host.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Api {
                status,
                kind,
                message,
            } => {
                let summary = if kind.is_empty() {
                    "Cloud Connector API error".to_string()
                } else {
                    kind.clone()
                };
                Diagnostic::error(summary).with_detail(format!("HTTP {}: {}", status, message))
            },
            other => Diagnostic::error(other.to_string()),
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("subaccount cf.eu10/abc".to_string());
        assert_eq!(format!("{}", err), "Resource not found: subaccount cf.eu10/abc");

        let err = ProviderError::UnknownResource("sapcc_widget".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: sapcc_widget");

        let err = ProviderError::Api {
            status: 409,
            kind: "ILLEGAL_STATE".to_string(),
            message: "mapping exists".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Cloud Connector API error (409): mapping exists"
        );
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::Configuration("missing username".to_string());
        assert_eq!(err.message(), "missing username");

        let err = ProviderError::Api {
            status: 400,
            kind: "INVALID_REQUEST".to_string(),
            message: "bad port".to_string(),
        };
        assert_eq!(err.message(), "bad port");
    }

    #[test]
    fn test_is_not_found() {
        assert!(ProviderError::NotFound("x".to_string()).is_not_found());
        assert!(ProviderError::Api {
            status: 404,
            kind: String::new(),
            message: String::new(),
        }
        .is_not_found());
        assert!(!ProviderError::Api {
            status: 500,
            kind: String::new(),
            message: String::new(),
        }
        .is_not_found());
        assert!(!ProviderError::Validation("x".to_string()).is_not_found());
    }

    #[test]
    fn test_api_error_to_diagnostic() {
        let err = ProviderError::Api {
            status: 400,
            kind: "INVALID_REQUEST".to_string(),
            message: "Port must be numeric".to_string(),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.summary, "INVALID_REQUEST");
        assert_eq!(diag.detail.as_deref(), Some("HTTP 400: Port must be numeric"));

        let err = ProviderError::Api {
            status: 502,
            kind: String::new(),
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_diagnostic().summary, "Cloud Connector API error");
    }

    #[test]
    fn test_other_error_to_diagnostic() {
        let diag: Diagnostic = ProviderError::Configuration("no client".to_string()).into();
        assert_eq!(diag.summary, "Configuration error: no client");
        assert!(diag.detail.is_none());
    }
}
