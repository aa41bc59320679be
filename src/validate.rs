use crate::{Error, Result, inference::RawInferenceResponse};
use serde_json::Value;
use tracing::debug;

/// The two result artifacts, guaranteed to be non-empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedResponse {
    pub output_image_url: String,
    pub masked_image_url: String,
}

/// Narrow parse of the model reply: position 0 is the composited output, position 1 the mask.
/// Everything else in the reply is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, raw: &RawInferenceResponse) -> Result<ValidatedResponse> {
        let artifacts = raw.data.as_array().map(Vec::as_slice).unwrap_or_default();
        debug!("Validating inference reply with {} artifacts", artifacts.len());

        let output_image_url = artifact_url(artifacts.first(), "output")?;
        let masked_image_url = artifact_url(artifacts.get(1), "mask")?;

        Ok(ValidatedResponse {
            output_image_url,
            masked_image_url,
        })
    }
}

fn artifact_url(artifact: Option<&Value>, field: &'static str) -> Result<String> {
    match artifact.and_then(|a| a.get("url")).and_then(Value::as_str) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(Error::InvalidInferenceResponse { field }),
    }
}
