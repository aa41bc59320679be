use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tryon_gateway::{
    Error, Result,
    inference::{InferenceClient, InferenceInvocation, RawInferenceResponse},
};

#[derive(Debug, Clone)]
pub enum StubReply {
    Data(Value),
    Unavailable(String),
}

/// Inference client double that records every invocation and answers with a fixed reply.
#[derive(Debug, Clone)]
pub struct StubInferenceClient {
    pub reply: StubReply,
    pub invocations: Arc<Mutex<Vec<InferenceInvocation>>>,
}

impl StubInferenceClient {
    pub fn with_data(data: Value) -> Self {
        Self {
            reply: StubReply::Data(data),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replies with the two artifacts `https://x/out.png` and `https://x/mask.png`.
    pub fn well_formed() -> Self {
        Self::with_data(json!([
            {"url": "https://x/out.png"},
            {"url": "https://x/mask.png"}
        ]))
    }

    pub fn unavailable(message: &str) -> Self {
        Self {
            reply: StubReply::Unavailable(message.to_string()),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn invocations(&self) -> Vec<InferenceInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceClient for StubInferenceClient {
    async fn invoke(&self, invocation: InferenceInvocation) -> Result<RawInferenceResponse> {
        self.invocations.lock().unwrap().push(invocation);

        match &self.reply {
            StubReply::Data(data) => Ok(RawInferenceResponse::new(data.clone())),
            StubReply::Unavailable(message) => Err(Error::inference(message.clone())),
        }
    }
}
