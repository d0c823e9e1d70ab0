//! OCR service seam — the Textract transport behind a narrow trait so the
//! polling state machine can be driven by any block-producing backend.

use async_trait::async_trait;
use aws_sdk_textract::types::{
    BlockType, DocumentLocation, JobStatus as TextractJobStatus, S3Object,
};
use thiserror::Error;
use tracing::debug;

pub mod poller;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR job {job_id} reported FAILED")]
    JobFailed { job_id: String },

    #[error("OCR job {job_id} still running after {waited_secs}s")]
    TimedOut { job_id: String, waited_secs: u64 },

    #[error("OCR service call failed: {0}")]
    Service(String),
}

/// Terminal and non-terminal states of an asynchronous OCR job.
/// Every non-terminal service state maps to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Line,
    Word,
    Other,
}

/// One detected text unit, in the order the service emitted it.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: String,
}

/// One status read of an in-flight job. `blocks` is complete (all result
/// pages) whenever the status is terminal.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub blocks: Vec<TextBlock>,
}

/// Asynchronous document-text-detection service.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Submits the document at `bucket`/`key` and returns the job id.
    async fn submit(&self, bucket: &str, key: &str) -> Result<String, OcrError>;

    /// Reads the current status and accumulated result blocks of a job.
    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot, OcrError>;
}

/// Textract-backed implementation of [`OcrService`].
pub struct TextractOcr {
    client: aws_sdk_textract::Client,
}

impl TextractOcr {
    pub fn new(client: aws_sdk_textract::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OcrService for TextractOcr {
    async fn submit(&self, bucket: &str, key: &str) -> Result<String, OcrError> {
        let location = DocumentLocation::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();

        let response = self
            .client
            .start_document_text_detection()
            .document_location(location)
            .send()
            .await
            .map_err(|e| OcrError::Service(e.to_string()))?;

        response
            .job_id()
            .map(str::to_string)
            .ok_or_else(|| OcrError::Service("start response carried no job id".to_string()))
    }

    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot, OcrError> {
        let first = self
            .client
            .get_document_text_detection()
            .job_id(job_id)
            .send()
            .await
            .map_err(|e| OcrError::Service(e.to_string()))?;

        let status = convert_status(first.job_status());
        let mut blocks: Vec<TextBlock> = first.blocks().iter().map(convert_block).collect();

        // Textract pages large result sets; follow the token chain so the
        // snapshot always carries every block in emission order.
        let mut next = first.next_token().map(str::to_string);
        while let Some(token) = next {
            let page = self
                .client
                .get_document_text_detection()
                .job_id(job_id)
                .next_token(token)
                .send()
                .await
                .map_err(|e| OcrError::Service(e.to_string()))?;
            blocks.extend(page.blocks().iter().map(convert_block));
            next = page.next_token().map(str::to_string);
        }

        debug!(%job_id, ?status, blocks = blocks.len(), "OCR status read");
        Ok(JobSnapshot { status, blocks })
    }
}

fn convert_status(status: Option<&TextractJobStatus>) -> JobStatus {
    match status {
        Some(TextractJobStatus::Succeeded) => JobStatus::Succeeded,
        Some(TextractJobStatus::Failed) => JobStatus::Failed,
        _ => JobStatus::Running,
    }
}

fn convert_block(block: &aws_sdk_textract::types::Block) -> TextBlock {
    let kind = match block.block_type() {
        Some(BlockType::Line) => BlockKind::Line,
        Some(BlockType::Word) => BlockKind::Word,
        _ => BlockKind::Other,
    };
    TextBlock {
        kind,
        text: block.text().unwrap_or_default().to_string(),
    }
}
