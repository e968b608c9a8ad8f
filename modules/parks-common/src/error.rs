use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParksError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid park filter: {0}")]
    Filter(#[from] FilterError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl ParksError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        ParksError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ParksError::NotFound { .. })
    }
}

/// Rejection of a park search parameter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },
}
