//! Error types for port operations.

/// Failures talking to the text-generation service.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Transport failure or non-success HTTP status.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    /// The service answered with an explicit error object.
    #[error("LLM service error: {0}")]
    Service(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Catalog lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog's backing data is missing. Lookups treat this as a miss.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown catalog id or entry id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl CatalogError {
    pub fn catalog_not_found(catalog_id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Catalog",
            id: catalog_id.to_string(),
        }
    }

    pub fn entry_not_found(entry_id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Catalog entry",
            id: entry_id.to_string(),
        }
    }

    /// Whether a lookup should treat this error as "no match" rather than fail.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::NotFound { .. })
    }
}

/// Host record creation errors.
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("Record creation failed in {operation}: {message}")]
    CreationFailed {
        operation: &'static str,
        message: String,
    },

    #[error("Record not found: {0}")]
    NotFound(String),
}

impl RecordStoreError {
    pub fn creation(operation: &'static str, message: impl ToString) -> Self {
        Self::CreationFailed {
            operation,
            message: message.to_string(),
        }
    }
}
