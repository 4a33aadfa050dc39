//! DALL-E backend using the OpenAI images API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::traits::{GenerateRequest, ImageBackend, ImageDescriptor, ProviderReply};
use crate::config::OpenAiConfig;
use crate::error::{AppError, Result};

/// Size requested from OpenAI regardless of the inbound `size`
pub const DALLE_IMAGE_SIZE: &str = "512x512";
const DALLE_RESPONSE_FORMAT: &str = "url";

/// OpenAI-backed image generation
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    generations_url: String,
}

#[derive(Debug, Serialize)]
struct ApiImageRequest<'a> {
    prompt: &'a str,
    /// Left out when zero so the API applies its own default of one image
    #[serde(skip_serializing_if = "is_zero")]
    n: i64,
    size: &'static str,
    response_format: &'static str,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

#[derive(Debug, Deserialize)]
struct ApiImageResponse {
    #[serde(default)]
    data: Vec<ImageDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiBackend {
    /// Create a new OpenAI backend from configuration
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
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
            generations_url: format!("{}/images/generations", config.base_url.trim_end_matches('/')),
        })
    }

    fn provider_error(message: String) -> AppError {
        AppError::Provider {
            provider: "openai",
            message,
        }
    }
}

#[async_trait]
impl ImageBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<ProviderReply> {
        let api_request = ApiImageRequest {
            prompt: &request.prompt,
            n: request.n,
            size: DALLE_IMAGE_SIZE,
            response_format: DALLE_RESPONSE_FORMAT,
        };

        debug!(url = %self.generations_url, n = request.n, "Sending image creation request");

        let response = self
            .client
            .post(&self.generations_url)
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<ApiErrorResponse>(&body) {
                Ok(api_error) => api_error.error.message,
                Err(_) => format!("{}: {}", status, String::from_utf8_lossy(&body)),
            };
            warn!(status = %status, error = %message, "Image creation error");
            return Err(Self::provider_error(message));
        }

        let api_response: ApiImageResponse = serde_json::from_slice(&body)
            .map_err(|e| Self::provider_error(format!("Failed to parse response: {}", e)))?;

        debug!(images = api_response.data.len(), "Image creation succeeded");
        Ok(ProviderReply::Images(api_response.data))
    }
}
