/// Errors raised when a raw document does not conform to the world model.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed world document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("duplicate region name: {0}")]
    DuplicateRegion(String),
    #[error("city keyed as '{key}' is named '{name}'")]
    CityKeyMismatch { key: String, name: String },
}
