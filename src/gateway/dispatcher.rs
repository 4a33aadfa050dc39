//! Dispatcher routing each request to the backend for its provider kind

use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::openai_backend::OpenAiBackend;
use crate::backend::stable_diffusion_backend::StableDiffusionBackend;
use crate::backend::traits::{
    DreamboothEnvelope, DreamboothReply, GenerateRequest, ImageBackend, ProviderKind,
    ProviderReply,
};
use crate::config::ProvidersConfig;
use crate::error::{AppError, Result};
use crate::response::ImageResponse;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Answer unparseable Stable Diffusion bodies with an empty envelope
    pub lenient_envelope: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            lenient_envelope: true,
        }
    }
}

/// Routes requests to one of the two backends
pub struct Dispatcher {
    dalle: Arc<dyn ImageBackend>,
    stable_diffusion: Arc<dyn ImageBackend>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher over explicit backends
    pub fn new(
        dalle: Arc<dyn ImageBackend>,
        stable_diffusion: Arc<dyn ImageBackend>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            dalle,
            stable_diffusion,
            config,
        }
    }

    /// Build both HTTP backends from provider configuration
    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let dalle = Arc::new(OpenAiBackend::new(&config.openai)?);
        let stable_diffusion = Arc::new(StableDiffusionBackend::new(&config.stable_diffusion)?);

        Ok(Self::new(
            dalle,
            stable_diffusion,
            DispatcherConfig {
                lenient_envelope: config.stable_diffusion.lenient_envelope,
            },
        ))
    }

    fn backend_for(&self, provider: &ProviderKind) -> &Arc<dyn ImageBackend> {
        match provider {
            ProviderKind::Dalle => &self.dalle,
            ProviderKind::StableDiffusion { .. } => &self.stable_diffusion,
        }
    }

    /// Run one request against its backend and build the envelope
    pub async fn dispatch(&self, request: GenerateRequest) -> Result<ImageResponse> {
        let backend = self.backend_for(&request.provider);
        debug!(backend = %backend.name(), size = %request.size, "Dispatching image request");

        let reply = backend.generate(&request).await.map_err(|e| {
            warn!(backend = %backend.name(), error = %e, "Image generation failed");
            e
        })?;

        match reply {
            ProviderReply::Images(output) => Ok(ImageResponse::images(output)),
            ProviderReply::Dreambooth(DreamboothReply::Envelope(envelope)) => {
                Ok(ImageResponse::dreambooth(envelope))
            }
            ProviderReply::Dreambooth(DreamboothReply::Unparseable { reason, .. }) => {
                if self.config.lenient_envelope {
                    Ok(ImageResponse::dreambooth(DreamboothEnvelope::default()))
                } else {
                    Err(AppError::MalformedEnvelope(reason))
                }
            }
        }
    }
}
