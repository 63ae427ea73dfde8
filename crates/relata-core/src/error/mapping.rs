use super::Error;

/// Error when mapping metadata is structurally inconsistent.
///
/// This occurs when:
/// - The root entity, or a child reached through a required join, has no table
/// - A relationship's source and target key columns differ in count
/// - A relationship names a child class but has no relationship type
/// - A custom repository named by a table mapping is not registered
///
/// Mapping errors are always fatal to the operation in progress.
#[derive(Debug)]
pub(super) struct MappingError {
    class: Box<str>,
    property: Option<Box<str>>,
    message: Box<str>,
}

impl std::error::Error for MappingError {}

impl core::fmt::Display for MappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.property {
            Some(property) => write!(
                f,
                "mapping error on {}::{}: {}",
                self.class, property, self.message
            ),
            None => write!(f, "mapping error on {}: {}", self.class, self.message),
        }
    }
}

impl Error {
    /// Creates a mapping error for the given class and (optionally) property.
    pub fn mapping(class: &str, property: Option<&str>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Mapping(MappingError {
            class: class.into(),
            property: property.map(Into::into),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a mapping error.
    pub fn is_mapping(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Mapping(_)))
    }
}
