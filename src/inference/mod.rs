mod client;
mod gradio;
mod types;

pub use client::InferenceClient;
pub use gradio::{
    EndpointInfo, GradioClient, ParameterInfo, PythonType, TRYON_ENDPOINT, check_signature,
    parse_event_stream,
};
pub use types::{InferenceInvocation, InferenceParam, RawInferenceResponse};
