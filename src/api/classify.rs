//! POST /api/classify: accepts JSON `{"text": ...}` or a multipart form with
//! `file` and/or `text` fields.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;

use super::AppState;
use super::error::ApiError;
use crate::error::InputError;
use crate::input;
use crate::pipeline::types::ClassificationResponse;

#[derive(Deserialize)]
struct TextRequest {
    #[serde(default)]
    text: Option<String>,
}

/// An uploaded file as received.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// What the client sent, before extraction.
#[derive(Default)]
struct Submission {
    file: Option<Upload>,
    text: Option<String>,
}

impl Submission {
    /// A file wins over text. Empty text counts as absent.
    async fn into_content(self) -> Result<String, InputError> {
        match (self.file, self.text) {
            (Some(upload), _) => input::from_file(&upload.filename, upload.bytes).await,
            (None, Some(text)) if !text.is_empty() => input::from_text(&text),
            _ => Err(InputError::MissingContent),
        }
    }
}

pub(super) async fn classify_email(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ClassificationResponse>, ApiError> {
    let submission = read_submission(request).await?;
    let content = submission.into_content().await?;
    let response = state.processor.process(&content).await?;
    Ok(Json(response))
}

async fn read_submission(request: Request) -> Result<Submission, InputError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    if content_type.contains("application/json") {
        read_json(request).await
    } else if content_type.contains("multipart/form-data") {
        read_multipart(request).await
    } else {
        debug!(content_type = %content_type, "Unsupported content type for classify");
        Ok(Submission::default())
    }
}

async fn read_json(request: Request) -> Result<Submission, InputError> {
    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| InputError::InvalidJson(e.to_string()))?;
    let parsed: TextRequest =
        serde_json::from_slice(&body).map_err(|e| InputError::InvalidJson(e.to_string()))?;
    Ok(Submission {
        file: None,
        text: parsed.text,
    })
}

async fn read_multipart(request: Request) -> Result<Submission, InputError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| InputError::InvalidMultipart(e.to_string()))?;

    let mut submission = Submission::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| InputError::InvalidMultipart(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| InputError::InvalidMultipart(e.to_string()))?;
                submission.file = Some(Upload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            Some("text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| InputError::InvalidMultipart(e.to_string()))?;
                submission.text = Some(text);
            }
            other => debug!(field = ?other, "Ignoring unknown multipart field"),
        }
    }
    Ok(submission)
}
