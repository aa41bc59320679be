use crate::acquire::ImageBytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One positional argument of the remote try-on procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceParam {
    Image { name: &'static str, image: ImageBytes },
    Text(String),
    Null,
    Bool(bool),
    Int(i64),
}

impl InferenceParam {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Text(_) => "text",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
        }
    }
}

/// Argument tuple for the hosted try-on procedure. Field order is the wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceInvocation {
    pub person: ImageBytes,
    pub garment: ImageBytes,
    pub prompt: String,
    pub mask_override: Option<String>,
    pub auto_mask: bool,
    pub auto_crop: bool,
    pub denoise_steps: i64,
    pub guidance_scale: i64,
}

impl InferenceInvocation {
    /// Number of positional parameters the remote procedure declares.
    pub const ARITY: usize = 8;

    pub fn parameters(&self) -> Vec<InferenceParam> {
        vec![
            InferenceParam::Image {
                name: "person",
                image: self.person.clone(),
            },
            InferenceParam::Image {
                name: "garment",
                image: self.garment.clone(),
            },
            InferenceParam::Text(self.prompt.clone()),
            match &self.mask_override {
                Some(mask) => InferenceParam::Text(mask.clone()),
                None => InferenceParam::Null,
            },
            InferenceParam::Bool(self.auto_mask),
            InferenceParam::Bool(self.auto_crop),
            InferenceParam::Int(self.denoise_steps),
            InferenceParam::Int(self.guidance_scale),
        ]
    }
}

/// Unvalidated reply of the remote procedure. Only `data` is ever read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInferenceResponse {
    #[serde(default)]
    pub data: Value,
}

impl RawInferenceResponse {
    pub fn new(data: Value) -> Self {
        Self { data }
    }
}
