//! Response envelope returned by `/image`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::backend::traits::{DreamboothEnvelope, ImageDescriptor};

/// Success flag of the envelope.
///
/// DALL-E replies carry the string `"true"` while Stable Diffusion replies
/// carry the boolean, and existing clients read both shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseStatus {
    Flag(bool),
    Text(&'static str),
}

/// Payload under `data`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Images { output: Vec<ImageDescriptor> },
    Dreambooth(DreamboothEnvelope),
}

/// Success envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageResponse {
    pub status: ResponseStatus,
    pub data: ResponseData,
}

impl ImageResponse {
    pub fn images(output: Vec<ImageDescriptor>) -> Self {
        Self {
            status: ResponseStatus::Text("true"),
            data: ResponseData::Images { output },
        }
    }

    pub fn dreambooth(envelope: DreamboothEnvelope) -> Self {
        Self {
            status: ResponseStatus::Flag(true),
            data: ResponseData::Dreambooth(envelope),
        }
    }
}

impl IntoResponse for ImageResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
