use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    #[error("Product {product_id} has no image at index {index}")]
    NoGarmentImage { product_id: String, index: usize },

    #[error("Failed to fetch garment image: {status_code} {status_text}")]
    UpstreamFetchFailed { status_code: u16, status_text: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Inference service unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("Invalid or missing URL for {field} image")]
    InvalidInferenceResponse { field: &'static str },

    #[error("Inference contract mismatch on {endpoint}: {reason}")]
    InferenceContractMismatch { endpoint: String, reason: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::InferenceUnavailable(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for the missing-resource classes (missing upload, product or product image).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::ProductNotFound { .. } | Self::NoGarmentImage { .. }
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short user-facing message for the error class. The full cause goes in `details`.
    pub fn user_message(&self) -> String {
        match self {
            Self::ProductNotFound { .. } | Self::NoGarmentImage { .. } => {
                "Product or product image not found".to_string()
            }
            Self::NotFound(what) => format!("Missing {what}"),
            Self::UpstreamFetchFailed { .. } => self.to_string(),
            Self::Network(_) => "Failed to fetch garment image".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Io(_) => "Failed to read uploaded image".to_string(),
            _ => "Failed to process virtual try-on".to_string(),
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let envelope = ErrorEnvelope::new(self.user_message());
        match self {
            // The product route answers with the bare message, like the catalog routes.
            Self::ProductNotFound { .. } | Self::NoGarmentImage { .. } => envelope,
            _ => envelope.with_details(self.to_string()),
        }
    }
}
