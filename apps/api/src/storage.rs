use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Writes an uploaded document to the bucket under a fresh key and returns
/// the key for the OCR submission call.
pub async fn upload_document(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    bytes: Bytes,
) -> Result<String, AppError> {
    let key = document_key();

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .content_type("application/pdf")
        .body(ByteStream::from(bytes))
        .send()
        .await
        .map_err(|e| AppError::S3(e.to_string()))?;

    info!(%key, "document stored");
    Ok(key)
}

/// Storage key for one uploaded document: `pdf/<uuid-v4>.pdf`.
fn document_key() -> String {
    format!("pdf/{}.pdf", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_has_namespace_prefix_and_extension() {
        let key = document_key();
        assert!(key.starts_with("pdf/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn test_key_embeds_a_valid_uuid() {
        let key = document_key();
        let id = key
            .strip_prefix("pdf/")
            .and_then(|rest| rest.strip_suffix(".pdf"))
            .unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_keys_are_unique_per_upload() {
        assert_ne!(document_key(), document_key());
    }
}
