use worldforge_kernel::SchemaError;

/// A proposed update was rejected.
///
/// `details` carries structured context such as the underlying schema-parse
/// message when the current world itself failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub details: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Rejection for a current world that does not satisfy the document model.
    pub fn invalid_world(details: impl Into<String>) -> Self {
        Self::new("Current world data is invalid").with_details(details)
    }
}

impl From<SchemaError> for ValidationError {
    fn from(err: SchemaError) -> Self {
        Self::invalid_world(err.to_string())
    }
}
