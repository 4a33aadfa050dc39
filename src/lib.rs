//! Image Generation Relay
//!
//! Accepts image generation requests over HTTP and forwards them to either
//! the OpenAI images API (model `dalle`) or the Stable Diffusion dreambooth
//! API (any other model id), returning a uniform JSON envelope.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod response;

pub use error::{AppError, Result};

use gateway::dispatcher::Dispatcher;

/// Application state shared across all handlers
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Build the state from loaded settings
    pub fn from_settings(settings: &config::Settings) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::from_config(&settings.providers)?,
        })
    }
}
