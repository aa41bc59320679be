use super::{ProductDetails, TryOnEvent, TryOnRequest, TryOnResult, TryOnStateMachine};
use crate::{
    Error, Result,
    acquire::{ImageAcquirer, ImageSource, TempUpload},
    catalog::ProductSummary,
    inference::{InferenceClient, InferenceInvocation},
    validate::ResponseValidator,
};
use std::sync::Arc;
use tracing::{debug, error, info};

// Fixed model policy; not caller-configurable.
pub const PROMPT: &str = "Hello!!";
pub const AUTO_MASK: bool = true;
pub const AUTO_CROP: bool = true;
pub const DENOISE_STEPS: i64 = 20;
pub const GUIDANCE_SCALE: i64 = 20;

pub struct TryOnOrchestrator {
    acquirer: ImageAcquirer,
    inference: Arc<dyn InferenceClient>,
    validator: ResponseValidator,
}

impl TryOnOrchestrator {
    pub fn new(acquirer: ImageAcquirer, inference: Arc<dyn InferenceClient>) -> Self {
        Self {
            acquirer,
            inference,
            validator: ResponseValidator::new(),
        }
    }

    /// Runs one request to completion. Uploads attached to the request are released
    /// before this returns, whatever the outcome.
    pub async fn run(&self, request: TryOnRequest) -> Result<TryOnResult> {
        let TryOnRequest {
            person,
            garment,
            uploads,
        } = request;
        info!("Starting try-on: person={}, garment={}", person, garment);

        let mut fsm = TryOnStateMachine::new();
        let outcome = self.drive(&mut fsm, &person, &garment).await;

        if let Err(ref e) = outcome {
            error!("Try-on failed in state {:?}: {}", fsm.current_state(), e);
            fsm.transition(TryOnEvent::ErrorOccurred)?;
        }

        let released = release(uploads);
        let result = outcome?;
        released?;

        info!("Try-on completed: {}", result.output_image_url);
        Ok(result)
    }

    async fn drive(
        &self,
        fsm: &mut TryOnStateMachine,
        person: &ImageSource,
        garment: &ImageSource,
    ) -> Result<TryOnResult> {
        fsm.transition(TryOnEvent::Start)?;

        let (garment, product) = match garment {
            ImageSource::CatalogRef { product_id, index } => {
                let product = self.acquirer.lookup_product(product_id).await?;
                let url = product.image(*index).map(str::to_string).ok_or_else(|| {
                    Error::NoGarmentImage {
                        product_id: product_id.clone(),
                        index: *index,
                    }
                })?;
                (ImageSource::remote(url.clone()), Some((product, url)))
            }
            other => (other.clone(), None),
        };

        let (person_bytes, garment_bytes) = tokio::try_join!(
            self.acquirer.acquire(person),
            self.acquirer.acquire(&garment)
        )?;
        debug!(
            "Acquired person ({} bytes, {}) and garment ({} bytes, {})",
            person_bytes.len(),
            person_bytes.content_type,
            garment_bytes.len(),
            garment_bytes.content_type
        );
        fsm.transition(TryOnEvent::ImagesAcquired)?;

        let invocation = InferenceInvocation {
            person: person_bytes,
            garment: garment_bytes,
            prompt: PROMPT.to_string(),
            mask_override: None,
            auto_mask: AUTO_MASK,
            auto_crop: AUTO_CROP,
            denoise_steps: DENOISE_STEPS,
            guidance_scale: GUIDANCE_SCALE,
        };
        let raw = self.inference.invoke(invocation).await?;
        fsm.transition(TryOnEvent::InferenceReturned)?;

        let validated = self.validator.validate(&raw)?;
        fsm.transition(TryOnEvent::ResponseValidated)?;

        Ok(TryOnResult {
            output_image_url: validated.output_image_url,
            masked_image_url: validated.masked_image_url,
            product_details: product.map(|(summary, image)| details(summary, image)),
        })
    }
}

fn details(summary: ProductSummary, image: String) -> ProductDetails {
    ProductDetails {
        name: summary.name,
        image,
        price: summary.price,
    }
}

fn release(uploads: Vec<TempUpload>) -> Result<()> {
    let count = uploads.len();
    let mut first_error = None;
    for upload in uploads {
        if let Err(e) = upload.release() {
            first_error.get_or_insert(e);
        }
    }
    debug!("Released {} upload(s)", count);
    first_error.map_or(Ok(()), Err)
}
