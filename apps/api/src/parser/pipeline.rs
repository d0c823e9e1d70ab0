//! Pipeline orchestrator: submit OCR job → poll to completion → build
//! prompt → invoke model → extract structured output.
//!
//! Fatal conditions (OCR failure or timeout, model unavailable) abort the
//! run. Extractor diagnostics are successful outputs: the caller always
//! receives *some* JSON and can inspect `raw_output` when the model
//! misbehaved.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::model::{InvokeConfig, TextModel};
use crate::ocr::poller::JobPoller;
use crate::ocr::OcrService;
use crate::parser::extract::OutputExtractor;
use crate::parser::prompt::build_prompt;

/// Location of an uploaded document in the storage bucket.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub bucket: String,
    pub key: String,
}

pub struct Pipeline {
    ocr: Arc<dyn OcrService>,
    model: Arc<dyn TextModel>,
    extractor: OutputExtractor,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        ocr: Arc<dyn OcrService>,
        model: Arc<dyn TextModel>,
        extractor: OutputExtractor,
        poll_interval: Duration,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            ocr,
            model,
            extractor,
            poll_interval,
            poll_timeout,
        }
    }

    /// Runs the full parse sequence for one uploaded document.
    /// Each run owns its job, prompt, and invocation data exclusively;
    /// nothing is shared across concurrent runs.
    pub async fn run(&self, document: &DocumentRef) -> Result<Value, AppError> {
        let job_id = self.ocr.submit(&document.bucket, &document.key).await?;
        info!(%job_id, key = %document.key, "OCR job submitted");

        let poller = JobPoller::new(self.ocr.as_ref(), self.poll_interval, self.poll_timeout);
        let text = poller.poll(&job_id).await?;
        info!(%job_id, chars = text.len(), "OCR text assembled");

        let prompt = build_prompt(&text);
        let raw_output = self.model.invoke(&prompt, &InvokeConfig::default()).await?;

        Ok(self.extractor.extract(&raw_output).into_value())
    }
}
