use crate::acquire::{ImageSource, TempUpload};
use serde::{Deserialize, Serialize};

/// One inbound try-on call. Upload guards travel with the request and are released
/// when the orchestrator finishes with it.
#[derive(Debug)]
pub struct TryOnRequest {
    pub person: ImageSource,
    pub garment: ImageSource,
    pub uploads: Vec<TempUpload>,
}

impl TryOnRequest {
    pub fn new(person: ImageSource, garment: ImageSource) -> Self {
        Self {
            person,
            garment,
            uploads: Vec::new(),
        }
    }

    pub fn with_upload(mut self, upload: TempUpload) -> Self {
        self.uploads.push(upload);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnResult {
    pub output_image_url: String,
    pub masked_image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_details: Option<ProductDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub image: String,
    pub price: f64,
}
