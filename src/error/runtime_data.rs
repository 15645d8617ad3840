use super::Error;
use crate::stmt;

/// Error translating a lower-level data-access failure.
///
/// Carries the owning entity name and identifier so a lazy-load or snapshot
/// failure can be diagnosed without the originating statement in hand. The
/// current operation is aborted; the descriptor stays usable.
#[derive(Debug)]
pub(super) struct RuntimeDataError {
    entity: Box<str>,
    id: stmt::Value,
    message: Box<str>,
}

impl std::error::Error for RuntimeDataError {}

impl core::fmt::Display for RuntimeDataError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "data access failure for `{}` #{:?}: {}",
            self.entity, self.id, self.message
        )
    }
}

impl Error {
    /// Creates a runtime data-access error for the given entity and identifier.
    pub fn runtime_data(
        entity: impl Into<String>,
        id: &stmt::Value,
        message: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::RuntimeData(RuntimeDataError {
            entity: entity.into().into(),
            id: id.clone(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a runtime data-access error.
    pub fn is_runtime_data(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::RuntimeData(_))
    }
}
