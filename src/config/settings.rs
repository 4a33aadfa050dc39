//! Application settings and configuration management

use crate::error::{AppError, Result};
use axum::http::HeaderValue;
use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Plain environment variables honoured on top of the prefixed ones
const PORT_VAR: &str = "PORT";
const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
const STABLE_DIFFUSION_KEY_VAR: &str = "STABLEDIFFUSION_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Cross-origin configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://ttimage.vercel.app".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Outbound provider configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub stable_diffusion: StableDiffusionConfig,
}

/// DALL-E (OpenAI images API) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// No timeout beyond the transport defaults when unset
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            timeout_ms: None,
        }
    }
}

/// Stable Diffusion (dreambooth API) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StableDiffusionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_dreambooth_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Answer unparseable provider bodies with an empty envelope instead of an error
    #[serde(default = "default_true")]
    pub lenient_envelope: bool,
}

fn default_dreambooth_endpoint() -> String {
    "https://stablediffusionapi.com/api/v4/dreambooth".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StableDiffusionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_dreambooth_endpoint(),
            timeout_ms: None,
            lenient_envelope: true,
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_env(path, std::env::vars().collect())
    }

    /// Load settings from a file and an explicit set of environment variables
    pub fn load_with_env<P: AsRef<Path>>(path: P, vars: Map<String, String>) -> Result<Self> {
        let path = path
            .as_ref()
            .to_str()
            .ok_or_else(|| AppError::Internal("Configuration path is not valid UTF-8".to_string()))?;

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            // Load from configuration file
            .add_source(File::with_name(path).required(false))
            // Override with environment variables (prefixed with IMAGE_RELAY__)
            .add_source(
                Environment::with_prefix("IMAGE_RELAY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .source(Some(vars.clone())),
            )
            // The plain variable names take precedence over everything else
            .set_override_option("server.port", non_empty(&vars, PORT_VAR))?
            .set_override_option("providers.openai.api_key", non_empty(&vars, OPENAI_KEY_VAR))?
            .set_override_option(
                "providers.stable_diffusion.api_key",
                non_empty(&vars, STABLE_DIFFUSION_KEY_VAR),
            )?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        for origin in &self.cors.allowed_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Invalid CORS origin '{}'",
                    origin
                ))));
            }
        }

        for (name, url) in [
            ("providers.openai.base_url", &self.providers.openai.base_url),
            (
                "providers.stable_diffusion.endpoint",
                &self.providers.stable_diffusion.endpoint,
            ),
        ] {
            if reqwest::Url::parse(url).is_err() {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "'{}' is not a valid URL: {}",
                    name, url
                ))));
            }
        }

        Ok(())
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty(vars: &Map<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|value| !value.is_empty()).cloned()
}
