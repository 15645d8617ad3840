use super::Error;

/// Error for a lock request the mapping cannot honor.
///
/// For example, force-increment locking on a type whose version column is
/// generated by the database on execution. Reported immediately as a usage
/// error rather than swallowed.
#[derive(Debug)]
pub(super) struct UnsupportedLockingError {
    message: Box<str>,
}

impl std::error::Error for UnsupportedLockingError {}

impl core::fmt::Display for UnsupportedLockingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported lock request: {}", self.message)
    }
}

impl Error {
    /// Creates an unsupported-locking error.
    pub fn unsupported_locking(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedLocking(
            UnsupportedLockingError {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an unsupported-locking error.
    pub fn is_unsupported_locking(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedLocking(_))
    }
}
