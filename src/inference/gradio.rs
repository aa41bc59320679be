use super::{InferenceClient, InferenceInvocation, InferenceParam, RawInferenceResponse};
use crate::{Error, Result, acquire::ImageBytes, config::InferenceConfig};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Remote procedure invoked on the hosted model.
pub const TRYON_ENDPOINT: &str = "/tryon";

/// Client for a model hosted as a Gradio app. A fresh session is opened per call.
pub struct GradioClient {
    http: reqwest::Client,
    config: InferenceConfig,
    permits: Option<Arc<Semaphore>>,
}

#[derive(Debug, Deserialize)]
struct HostInfo {
    host: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    named_endpoints: HashMap<String, EndpointInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointInfo {
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    #[serde(default)]
    pub returns: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterInfo {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub python_type: PythonType,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PythonType {
    #[serde(default, rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Deserialize)]
struct CallAccepted {
    event_id: String,
}

struct GradioSession<'a> {
    http: &'a reqwest::Client,
    root: String,
    token: Option<&'a str>,
    endpoint: EndpointInfo,
}

impl GradioClient {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let permits = config
            .max_concurrent
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));

        Ok(Self {
            http,
            config,
            permits,
        })
    }

    async fn resolve_host(&self) -> Result<String> {
        if let Some(ref host) = self.config.host {
            return Ok(host.trim_end_matches('/').to_string());
        }
        if self.config.model.starts_with("http://") || self.config.model.starts_with("https://") {
            return Ok(self.config.model.trim_end_matches('/').to_string());
        }

        let url = format!(
            "{}/api/spaces/{}/host",
            self.config.hub_url.trim_end_matches('/'),
            self.config.model
        );
        debug!("Resolving model host via {}", url);

        let response = authorized(self.http.get(&url), self.config.token.as_deref())
            .send()
            .await
            .map_err(unavailable("host lookup"))?;
        let response = ensure_success(response, "host lookup").await?;
        let info: HostInfo = response.json().await.map_err(unavailable("host lookup"))?;

        Ok(info.host.trim_end_matches('/').to_string())
    }

    async fn connect(&self) -> Result<GradioSession<'_>> {
        let host = self.resolve_host().await?;
        let root = format!("{}{}", host, normalize_prefix(&self.config.api_prefix));
        let token = self.config.token.as_deref();

        let response = authorized(self.http.get(format!("{root}/info")), token)
            .send()
            .await
            .map_err(unavailable("api info"))?;
        let response = ensure_success(response, "api info").await?;
        let info: ApiInfo = response.json().await.map_err(unavailable("api info"))?;

        let endpoint = info
            .named_endpoints
            .get(TRYON_ENDPOINT)
            .cloned()
            .ok_or_else(|| Error::InferenceContractMismatch {
                endpoint: TRYON_ENDPOINT.to_string(),
                reason: "endpoint not exposed by the model".to_string(),
            })?;

        info!(
            "Connected to model '{}' at {} ({} declared parameters)",
            self.config.model,
            root,
            endpoint.parameters.len()
        );

        Ok(GradioSession {
            http: &self.http,
            root,
            token,
            endpoint,
        })
    }
}

#[async_trait]
impl InferenceClient for GradioClient {
    async fn invoke(&self, invocation: InferenceInvocation) -> Result<RawInferenceResponse> {
        let _permit = match self.permits {
            Some(ref permits) => Some(
                permits
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::inference("inference limiter closed"))?,
            ),
            None => None,
        };

        let params = invocation.parameters();
        let session = self.connect().await?;
        check_signature(TRYON_ENDPOINT, &session.endpoint, &params)?;

        let data = session.encode(&params).await?;
        let event_id = session.submit(&data).await?;
        let result = session.await_result(&event_id).await?;

        Ok(RawInferenceResponse::new(result))
    }
}

impl GradioSession<'_> {
    fn endpoint_name(&self) -> &str {
        TRYON_ENDPOINT.trim_start_matches('/')
    }

    /// Uploads the image parameters and renders every parameter as JSON, in order.
    async fn encode(&self, params: &[InferenceParam]) -> Result<Vec<Value>> {
        let images: Vec<(&str, &ImageBytes)> = params
            .iter()
            .filter_map(|p| match p {
                InferenceParam::Image { name, image } => Some((*name, image)),
                _ => None,
            })
            .collect();
        let mut uploaded = self.upload(&images).await?.into_iter();

        let mut data = Vec::with_capacity(params.len());
        for (position, param) in params.iter().enumerate() {
            let value = match param {
                InferenceParam::Image { name, image } => {
                    let path = uploaded.next().ok_or_else(|| {
                        Error::inference("upload returned fewer paths than images sent")
                    })?;
                    let file = file_data(&path, name, image);
                    let component = self
                        .endpoint
                        .parameters
                        .get(position)
                        .map(|p| p.component.to_ascii_lowercase())
                        .unwrap_or_default();
                    if component == "imageeditor" {
                        json!({"background": file, "layers": [], "composite": null})
                    } else {
                        file
                    }
                }
                InferenceParam::Text(text) => Value::String(text.clone()),
                InferenceParam::Null => Value::Null,
                InferenceParam::Bool(b) => Value::Bool(*b),
                InferenceParam::Int(n) => json!(n),
            };
            data.push(value);
        }
        Ok(data)
    }

    async fn upload(&self, images: &[(&str, &ImageBytes)]) -> Result<Vec<String>> {
        let mut form = Form::new();
        for (name, image) in images {
            let part = Part::bytes(image.bytes.clone())
                .file_name(format!("{name}.{}", image.extension()))
                .mime_str(&image.content_type)
                .map_err(unavailable("upload"))?;
            form = form.part("files", part);
        }

        let response = authorized(self.http.post(format!("{}/upload", self.root)), self.token)
            .multipart(form)
            .send()
            .await
            .map_err(unavailable("upload"))?;
        let response = ensure_success(response, "upload").await?;
        let paths: Vec<String> = response.json().await.map_err(unavailable("upload"))?;

        debug!("Uploaded {} images to model", paths.len());
        Ok(paths)
    }

    async fn submit(&self, data: &[Value]) -> Result<String> {
        let url = format!("{}/call/{}", self.root, self.endpoint_name());
        let response = authorized(self.http.post(&url), self.token)
            .json(&json!({ "data": data }))
            .send()
            .await
            .map_err(unavailable("call"))?;
        let response = ensure_success(response, "call").await?;
        let accepted: CallAccepted = response.json().await.map_err(unavailable("call"))?;

        debug!("Submitted {} with event id {}", TRYON_ENDPOINT, accepted.event_id);
        Ok(accepted.event_id)
    }

    async fn await_result(&self, event_id: &str) -> Result<Value> {
        let url = format!("{}/call/{}/{}", self.root, self.endpoint_name(), event_id);
        let response = authorized(self.http.get(&url), self.token)
            .send()
            .await
            .map_err(unavailable("result stream"))?;
        let response = ensure_success(response, "result stream").await?;
        let body = response.text().await.map_err(unavailable("result stream"))?;

        parse_event_stream(&body)
    }
}

/// Verifies the declared signature matches the invocation before anything is sent.
pub fn check_signature(
    endpoint: &str,
    declared: &EndpointInfo,
    params: &[InferenceParam],
) -> Result<()> {
    let mismatch = |reason: String| Error::InferenceContractMismatch {
        endpoint: endpoint.to_string(),
        reason,
    };

    if declared.parameters.len() != params.len() {
        return Err(mismatch(format!(
            "expected {} parameters, model declares {}",
            params.len(),
            declared.parameters.len()
        )));
    }

    for (position, (param, info)) in params.iter().zip(&declared.parameters).enumerate() {
        if !accepts(info, param) {
            return Err(mismatch(format!(
                "parameter {} ({}) declared as {} '{}', cannot take {}",
                position,
                info.label.as_deref().unwrap_or("unnamed"),
                info.component,
                info.python_type.type_name,
                param.kind()
            )));
        }
    }

    if !declared.returns.is_empty() && declared.returns.len() < 2 {
        return Err(mismatch(format!(
            "expected at least 2 outputs, model declares {}",
            declared.returns.len()
        )));
    }

    Ok(())
}

fn accepts(info: &ParameterInfo, param: &InferenceParam) -> bool {
    let component = info.component.to_ascii_lowercase();
    let type_name = info.python_type.type_name.to_ascii_lowercase();
    if component.is_empty() && type_name.is_empty() {
        return true;
    }

    match param {
        InferenceParam::Image { .. } => component.contains("image") || type_name.contains("filepath"),
        InferenceParam::Text(_) => {
            component == "textbox" || component == "dropdown" || type_name.starts_with("str")
        }
        InferenceParam::Null => true,
        InferenceParam::Bool(_) => component == "checkbox" || type_name == "bool",
        InferenceParam::Int(_) => {
            matches!(component.as_str(), "number" | "slider")
                || type_name.starts_with("float")
                || type_name.starts_with("int")
        }
    }
}

/// Extracts the `complete` payload from a Gradio server-sent event stream.
pub fn parse_event_stream(body: &str) -> Result<Value> {
    let mut event: Option<&str> = None;

    for line in body.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = Some(name.trim());
        } else if let Some(payload) = line.strip_prefix("data:") {
            match event {
                Some("complete") => {
                    return serde_json::from_str(payload.trim()).map_err(|e| {
                        Error::inference(format!("unreadable result payload: {e}"))
                    });
                }
                Some("error") => {
                    warn!("Model reported an error: {}", payload.trim());
                    return Err(Error::inference(format!(
                        "model reported an error: {}",
                        payload.trim()
                    )));
                }
                _ => {}
            }
        } else if line.is_empty() {
            event = None;
        }
    }

    Err(Error::inference("result stream ended without a result"))
}

fn file_data(path: &str, name: &str, image: &ImageBytes) -> Value {
    json!({
        "path": path,
        "orig_name": format!("{name}.{}", image.extension()),
        "mime_type": image.content_type,
        "meta": {"_type": "gradio.FileData"},
    })
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn authorized(request: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn unavailable(step: &'static str) -> impl FnOnce(reqwest::Error) -> Error {
    move |e| {
        if e.is_timeout() {
            Error::inference(format!("{step} timed out: {e}"))
        } else {
            Error::inference(format!("{step} failed: {e}"))
        }
    }
}

async fn ensure_success(response: reqwest::Response, step: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(256).collect();
    Err(Error::inference(format!("{step} returned {status}: {snippet}")))
}
