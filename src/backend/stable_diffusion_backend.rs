//! Stable Diffusion backend using the dreambooth text-to-image API

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::traits::{
    DreamboothReply, GenerateRequest, ImageBackend, ProviderKind, ProviderReply,
};
use crate::config::StableDiffusionConfig;
use crate::error::{AppError, Result};

/// Dreambooth API request body.
///
/// The API expects most numeric parameters as strings.
#[derive(Debug, Serialize)]
pub struct DreamboothRequest<'a> {
    pub key: &'a str,
    pub model_id: &'a str,
    pub prompt: &'a str,
    pub negative_prompt: &'static str,
    pub width: &'static str,
    pub height: &'static str,
    pub samples: String,
    pub num_inference_steps: &'static str,
    pub safety_checker: &'static str,
    pub enhance_prompt: &'static str,
    pub seed: Option<i64>,
    pub guidance_scale: f64,
    pub webhook: Option<String>,
    pub track_id: Option<String>,
}

impl<'a> DreamboothRequest<'a> {
    /// Fill the fixed generation parameters around the caller's values
    pub fn new(key: &'a str, model_id: &'a str, prompt: &'a str, samples: i64) -> Self {
        Self {
            key,
            model_id,
            prompt,
            negative_prompt: "",
            width: "512",
            height: "512",
            samples: samples.to_string(),
            num_inference_steps: "30",
            safety_checker: "no",
            enhance_prompt: "no",
            seed: None,
            guidance_scale: 7.5,
            webhook: None,
            track_id: None,
        }
    }
}

/// Dreambooth-backed image generation
pub struct StableDiffusionBackend {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl StableDiffusionBackend {
    /// Create a new Stable Diffusion backend from configuration
    pub fn new(config: &StableDiffusionConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl ImageBackend for StableDiffusionBackend {
    fn name(&self) -> &str {
        "stable_diffusion"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<ProviderReply> {
        let model_id = match &request.provider {
            ProviderKind::StableDiffusion { model_id } => model_id.as_str(),
            other => {
                return Err(AppError::Internal(format!(
                    "Stable Diffusion backend cannot serve provider '{}'",
                    other.name()
                )))
            }
        };

        let body = DreamboothRequest::new(&self.api_key, model_id, &request.prompt, request.n);

        debug!(endpoint = %self.endpoint, model = %model_id, samples = request.n, "Sending dreambooth request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "Dreambooth request failed");
                AppError::HttpClient(e)
            })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        let reply = DreamboothReply::from_body(&bytes);
        if let DreamboothReply::Unparseable { reason, .. } = &reply {
            warn!(status = %status, error = %reason, "Dreambooth response did not match the envelope");
        }

        Ok(ProviderReply::Dreambooth(reply))
    }
}
