use super::Error;

/// Error for a broken internal invariant.
///
/// Raised when the compiler observes a state that valid input can never
/// produce: a referenced table missing from the type's table closure, a
/// join-predicate column-count mismatch, or a linking pass that makes no
/// progress. Always fatal, never retried.
#[derive(Debug)]
pub(super) struct InternalConsistencyError {
    message: Box<str>,
}

impl std::error::Error for InternalConsistencyError {}

impl core::fmt::Display for InternalConsistencyError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "internal consistency violation: {}", self.message)
    }
}

impl Error {
    /// Creates an internal-consistency error.
    pub fn consistency(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InternalConsistency(
            InternalConsistencyError {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an internal-consistency error.
    pub fn is_consistency(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InternalConsistency(_))
    }
}
