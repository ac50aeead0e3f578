//! Invoker Error Types

use std::error::Error as _;
use tensor_encoder::EncodingError;
use thiserror::Error;
use tonic::{Code, Status};

/// Errors while assembling or dispatching a predict call
#[derive(Debug, Error)]
pub enum InvokerError {
    /// Tensor could not be built from the input
    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    /// Request rejected locally before any network traffic
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Channel could not be established or the call never completed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Service ran the call and reported a failure
    #[error("Remote error ({code:?}): {message}")]
    Remote { code: Code, message: String },
}

impl InvokerError {
    /// Classify a gRPC status.
    ///
    /// Statuses tied to reaching the server (unavailable, cancelled,
    /// deadline) are connection errors, as is `Unknown` when it wraps a local
    /// transport error. Everything else came from the service itself.
    pub fn from_status(status: Status) -> Self {
        let transport = match status.code() {
            Code::Unavailable | Code::Cancelled | Code::DeadlineExceeded => true,
            Code::Unknown => status.source().is_some(),
            _ => false,
        };

        if transport {
            InvokerError::Connection(status_text(&status))
        } else {
            InvokerError::Remote {
                code: status.code(),
                message: status.message().to_string(),
            }
        }
    }

    /// Whether this is a transport-level failure
    pub fn is_connection(&self) -> bool {
        matches!(self, InvokerError::Connection(_))
    }
}

impl From<Status> for InvokerError {
    fn from(status: Status) -> Self {
        InvokerError::from_status(status)
    }
}

impl From<tonic::transport::Error> for InvokerError {
    fn from(err: tonic::transport::Error) -> Self {
        let mut text = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        InvokerError::Connection(text)
    }
}

fn status_text(status: &Status) -> String {
    if status.message().is_empty() {
        format!("{:?}", status.code())
    } else {
        format!("{:?}: {}", status.code(), status.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_codes_are_connection_errors() {
        for status in [
            Status::unavailable("connection refused"),
            Status::cancelled("client went away"),
            Status::deadline_exceeded("too slow"),
        ] {
            assert!(InvokerError::from_status(status).is_connection());
        }
    }

    #[test]
    fn test_application_codes_are_remote_errors() {
        let err = InvokerError::from_status(Status::not_found("Servable not found for request: Latest(resnet)"));
        match err {
            InvokerError::Remote { code, message } => {
                assert_eq!(code, Code::NotFound);
                assert_eq!(message, "Servable not found for request: Latest(resnet)");
            }
            other => panic!("expected remote error, got {other:?}"),
        }

        let err = InvokerError::from_status(Status::invalid_argument("input size does not match signature"));
        assert!(matches!(err, InvokerError::Remote { code: Code::InvalidArgument, .. }));
    }

    #[test]
    fn test_plain_unknown_is_remote() {
        let err = InvokerError::from_status(Status::unknown("op failed"));
        assert!(matches!(err, InvokerError::Remote { code: Code::Unknown, .. }));
    }

    #[test]
    fn test_unknown_with_local_source_is_connection() {
        let status = Status::from_error("stream closed mid-body".into());
        assert_eq!(status.code(), Code::Unknown);
        assert!(InvokerError::from_status(status).is_connection());
    }

    #[test]
    fn test_encoding_error_converts() {
        let err: InvokerError = EncodingError::ShapeOverflow(vec![u64::MAX, 2]).into();
        assert!(matches!(err, InvokerError::Encoding(_)));
    }
}
