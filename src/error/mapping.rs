use super::Error;

/// Error for malformed or contradictory boot metadata.
///
/// This occurs when:
/// - A discriminator declaration uses an unsupported literal type
/// - Two subtypes claim the same discriminator literal (or sentinel)
/// - A property's declared columns do not match its value's column count
/// - A property path collides across sibling subtypes
///
/// Mapping errors are fatal at bootstrap; no recovery is attempted.
#[derive(Debug)]
pub(super) struct MappingDefinitionError {
    entity: Box<str>,
    message: Box<str>,
}

impl std::error::Error for MappingDefinitionError {}

impl core::fmt::Display for MappingDefinitionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "invalid mapping for entity `{}`: {}",
            self.entity, self.message
        )
    }
}

impl Error {
    /// Creates a mapping-definition error naming the offending entity.
    pub fn mapping(entity: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::MappingDefinition(MappingDefinitionError {
            entity: entity.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a mapping-definition error.
    pub fn is_mapping(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MappingDefinition(_))
    }
}
