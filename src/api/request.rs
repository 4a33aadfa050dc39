//! Inbound `/image` request body

use serde::Deserialize;
use serde_json::Value;

use crate::backend::traits::{GenerateRequest, ProviderKind};
use crate::error::{AppError, Result};

/// Body of `POST /image`.
///
/// Keys match case-insensitively and the last occurrence of a key wins.
/// Absent fields take their zero value and `null` members are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageRequest {
    pub prompt: String,
    pub n: i64,
    pub size: String,
    pub model: String,
}

impl ImageRequest {
    /// Decode a raw request body
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(AppError::InvalidJson)?;
        serde_json::from_value(normalize_keys(value)).map_err(AppError::InvalidJson)
    }
}

/// Lowercase object keys, keeping the later value on collisions and
/// skipping `null` members.
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut normalized = serde_json::Map::with_capacity(fields.len());
            for (key, value) in fields {
                if !value.is_null() {
                    normalized.insert(key.to_lowercase(), value);
                }
            }
            Value::Object(normalized)
        }
        other => other,
    }
}

impl From<ImageRequest> for GenerateRequest {
    fn from(request: ImageRequest) -> Self {
        Self {
            provider: ProviderKind::from_model(&request.model),
            prompt: request.prompt,
            n: request.n,
            size: request.size,
        }
    }
}
