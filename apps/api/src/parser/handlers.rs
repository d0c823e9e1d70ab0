use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::Json;
use bytes::Bytes;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::parser::pipeline::DocumentRef;
use crate::state::AppState;
use crate::storage;

const UPLOAD_FORM: &str = r#"<html>
<head><title>Resume Parser</title></head>
<body>
  <h1>Upload Your Resume (PDF)</h1>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <input type="file" name="pdf" accept="application/pdf" />
    <button type="submit">Upload</button>
  </form>
</body>
</html>"#;

/// GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// POST /upload
///
/// Accepts a multipart PDF under the `pdf` field, stores it, and runs the
/// parse pipeline. The response is always a single JSON document: either
/// the structured resume or an extraction diagnostic.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut pdf: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("pdf") {
            pdf = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?,
            );
        }
    }

    let pdf = pdf
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::Validation("No file uploaded or file is invalid".to_string()))?;

    info!(bytes = pdf.len(), "resume upload received");

    let key = storage::upload_document(&state.s3, &state.config.s3_bucket, pdf).await?;
    let document = DocumentRef {
        bucket: state.config.s3_bucket.clone(),
        key,
    };

    let parsed = state.pipeline.run(&document).await?;
    Ok(Json(parsed))
}
