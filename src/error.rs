//! Error types shared across the request coordinator.

use std::fmt;

/// Closed set of failure categories the coordinator can report.
///
/// Boundary errors (everything except [`ErrorKind::SchedulingFailed`] once a request
/// is already dispatched) are returned synchronously to the caller of the manager API
/// and never escalate. See the error handling section of the design for the full
/// propagation policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Null/typed-mismatch at the API boundary (e.g. `create_request` with `Unknown`).
    InvalidArgument,
    /// Operation invoked before a dispatcher was set on the manager.
    NotInitialized,
    /// `fulfill`/`reject` referenced a request ID the manager does not know about.
    NotFound,
    /// Options or value did not match the request kind of its target.
    TypeMismatch,
    /// The consumer's task loop refused to schedule a task.
    SchedulingFailed,
    /// A reserved operation (`Provider::get`) is not implemented.
    NotImplemented,
    /// The manager observed an abort completing for a request.
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotInitialized => "dispatcher not initialized",
            ErrorKind::NotFound => "request not found",
            ErrorKind::TypeMismatch => "request kind/value mismatch",
            ErrorKind::SchedulingFailed => "task loop refused to schedule work",
            ErrorKind::NotImplemented => "operation not implemented",
            ErrorKind::Cancelled => "request cancelled",
        };
        f.write_str(text)
    }
}

/// An [`ErrorKind`] plus optional free-form context, the coordinator's single error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    context: Option<String>,
}

impl Error {
    /// Builds an error carrying only a kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, context: None }
    }

    /// Builds an error carrying a kind and a human-readable context string.
    pub fn with_context(kind: ErrorKind, context: impl Into<String>) -> Self {
        Self { kind, context: Some(context.into()) }
    }

    /// The error's category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}: {}", self.kind, context),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_context_when_present() {
        let err = Error::with_context(ErrorKind::NotFound, "request 42");
        assert_eq!(err.to_string(), "request not found: request 42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn displays_bare_kind() {
        let err: Error = ErrorKind::Cancelled.into();
        assert_eq!(err.to_string(), "request cancelled");
    }
}
