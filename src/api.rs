//! Transport-agnostic request handlers.
//!
//! Each handler returns an [`ApiResponse`] carrying an HTTP status code and a JSON body, so any
//! server (or the CLI) can serve them unchanged.

use serde_json::json;

use crate::foundation::error::ParticleError;
use crate::pipeline::{GenerationRequest, Pipeline};
use crate::upload::UploadRecord;

/// Message returned with every successful generation.
pub const SUCCESS_MESSAGE: &str = "Animation generated successfully!";
/// Body text for any server-side failure.
pub const GENERATION_FAILED: &str = "Failed to generate animation";

/// Status code plus JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON response body.
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// `200` with `body`.
    pub fn ok(body: serde_json::Value) -> Self {
        Self { status: 200, body }
    }

    /// `{"error": message}` with `status`.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// Whether `status` is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Readiness payload.
pub fn handle_status() -> ApiResponse {
    ApiResponse::ok(json!({
        "message": "Particle Animation Generator API",
        "status": "ready",
    }))
}

/// Accept one upload and turn it into an animation.
///
/// Rejected uploads answer 400 with the rejection message. Anything that fails after the upload
/// was accepted is logged and answered with a generic 500.
#[tracing::instrument(skip_all, fields(file = record.as_ref().map(|r| r.file_name.as_str())))]
pub fn handle_upload(
    pipeline: &Pipeline,
    record: Option<UploadRecord>,
    request: &GenerationRequest,
) -> ApiResponse {
    match pipeline.process(record, request) {
        Ok(asset) => {
            tracing::info!(url = %asset.url, "animation generated");
            ApiResponse::ok(json!({
                "success": true,
                "animationUrl": asset.url,
                "message": SUCCESS_MESSAGE,
            }))
        }
        Err(ParticleError::Upload(message)) => {
            tracing::warn!(%message, "upload rejected");
            ApiResponse::error(400, message)
        }
        Err(e) => {
            tracing::error!(error = %e, "animation generation failed");
            ApiResponse::error(500, GENERATION_FAILED)
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/api/api.rs"]
mod tests;
