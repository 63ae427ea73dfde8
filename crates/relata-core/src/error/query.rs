use super::Error;

/// Error when a query is malformed.
///
/// This occurs when a query is rendered before it is finalised, when a
/// condition is built with an unsupported operator/value combination, or when
/// the bracketed groups of a criteria list do not balance. Query errors are
/// raised while building or rendering, never deferred to execution.
#[derive(Debug)]
pub(super) struct QueryError {
    message: Box<str>,
}

impl std::error::Error for QueryError {}

impl core::fmt::Display for QueryError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "query error: {}", self.message)
    }
}

impl Error {
    /// Creates a query error.
    pub fn query(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Query(QueryError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a query error.
    pub fn is_query(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Query(_)))
    }
}
