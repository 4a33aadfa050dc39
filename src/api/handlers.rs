//! HTTP handlers

use axum::{body::Bytes, extract::State};
use std::sync::Arc;
use tracing::info;

use crate::api::request::ImageRequest;
use crate::backend::traits::GenerateRequest;
use crate::error::Result;
use crate::response::ImageResponse;
use crate::AppState;

/// `GET /`
pub async fn health() -> &'static str {
    "Working fine"
}

/// `POST /image`
///
/// The body is decoded by hand rather than through the `Json` extractor so
/// that decoding failures use the relay's own error envelope.
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ImageResponse> {
    let request: GenerateRequest = ImageRequest::parse(&body)?.into();
    info!(provider = %request.provider.name(), n = request.n, "Image request received");

    state.dispatcher.dispatch(request).await
}
