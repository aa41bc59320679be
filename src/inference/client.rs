use super::{InferenceInvocation, RawInferenceResponse};
use crate::Result;
use async_trait::async_trait;

/// Pass-through adapter over the external try-on model. Replies are not validated here.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn invoke(&self, invocation: InferenceInvocation) -> Result<RawInferenceResponse>;
}
