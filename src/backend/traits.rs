//! Common traits and types for image generation backends

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Model name that selects the DALL-E backend
pub const DALLE_MODEL: &str = "dalle";

/// Which provider serves a request, resolved once from the model name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI images API
    Dalle,
    /// Stable Diffusion dreambooth API with the given model id
    StableDiffusion { model_id: String },
}

impl ProviderKind {
    /// Resolve the provider for a model name. Only the exact name `dalle`
    /// selects DALL-E; everything else, including an empty name, is a
    /// Stable Diffusion model id.
    pub fn from_model(model: &str) -> Self {
        if model == DALLE_MODEL {
            Self::Dalle
        } else {
            Self::StableDiffusion {
                model_id: model.to_string(),
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dalle => "openai",
            Self::StableDiffusion { .. } => "stable_diffusion",
        }
    }
}

/// Request to generate images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// The prompt to generate images from
    pub prompt: String,

    /// Number of images to generate
    pub n: i64,

    /// Requested size. Both providers generate at a fixed 512x512.
    pub size: String,

    /// Provider and model
    pub provider: ProviderKind,
}

/// One generated image as reported by the OpenAI images API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// Normalized Stable Diffusion response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DreamboothEnvelope {
    pub output: Vec<String>,
    pub status: String,
    pub fetch_result: String,
}

impl DreamboothEnvelope {
    /// Pick the known fields out of a response object. A field that is
    /// missing, `null` or of the wrong type keeps its zero value without
    /// discarding the others.
    pub fn from_fields(fields: &serde_json::Map<String, Value>) -> Self {
        Self {
            output: field_or_default(fields, "output"),
            status: field_or_default(fields, "status"),
            fetch_result: field_or_default(fields, "fetch_result"),
        }
    }
}

fn field_or_default<T: DeserializeOwned + Default>(
    fields: &serde_json::Map<String, Value>,
    key: &str,
) -> T {
    fields
        .get(key)
        .and_then(|value| T::deserialize(value).ok())
        .unwrap_or_default()
}

/// Outcome of reading a Stable Diffusion response body
#[derive(Debug, Clone, PartialEq)]
pub enum DreamboothReply {
    /// The body was a JSON object
    Envelope(DreamboothEnvelope),
    /// The call went through but the body was not a JSON object
    Unparseable { body: String, reason: String },
}

impl DreamboothReply {
    /// Classify a raw response body
    pub fn from_body(body: &[u8]) -> Self {
        let reason = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => {
                return Self::Envelope(DreamboothEnvelope::from_fields(&fields))
            }
            Ok(other) => format!("expected a JSON object, found {}", json_kind(&other)),
            Err(e) => e.to_string(),
        };

        Self::Unparseable {
            body: String::from_utf8_lossy(body).into_owned(),
            reason,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// What a backend hands back to the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    /// Image list from the OpenAI images API
    Images(Vec<ImageDescriptor>),
    /// Stable Diffusion response
    Dreambooth(DreamboothReply),
}

/// Trait for image generation backends
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Generate images from a request
    async fn generate(&self, request: &GenerateRequest) -> Result<ProviderReply>;
}
