//! Polling state machine for asynchronous OCR jobs.
//!
//! The historical behavior re-read job status every two seconds with no
//! deadline, blocking forever on a job that never terminates. The loop here
//! keeps the fixed-interval shape but bounds the total wait and surfaces
//! `OcrError::TimedOut` once the bound is reached.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::ocr::{BlockKind, JobStatus, OcrError, OcrService, TextBlock};

/// Drives one already-submitted OCR job to a terminal state.
pub struct JobPoller<'a> {
    ocr: &'a dyn OcrService,
    interval: Duration,
    max_wait: Duration,
}

impl<'a> JobPoller<'a> {
    pub fn new(ocr: &'a dyn OcrService, interval: Duration, max_wait: Duration) -> Self {
        Self {
            ocr,
            interval,
            max_wait,
        }
    }

    /// Waits for the job to finish and returns its text, one detected line
    /// per row, in the order the service emitted them.
    ///
    /// The first status read happens before any sleep, so an
    /// already-succeeded job returns immediately. A FAILED status is fatal
    /// and never yields partial text.
    pub async fn poll(&self, job_id: &str) -> Result<String, OcrError> {
        let started = Instant::now();
        loop {
            let snapshot = self.ocr.get_status(job_id).await?;
            match snapshot.status {
                JobStatus::Succeeded => return Ok(assemble_lines(&snapshot.blocks)),
                JobStatus::Failed => {
                    return Err(OcrError::JobFailed {
                        job_id: job_id.to_string(),
                    })
                }
                JobStatus::Running => {
                    let waited = started.elapsed();
                    if waited >= self.max_wait {
                        return Err(OcrError::TimedOut {
                            job_id: job_id.to_string(),
                            waited_secs: waited.as_secs(),
                        });
                    }
                    debug!(%job_id, waited_secs = waited.as_secs(), "OCR job still running");
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

/// Joins LINE blocks with newlines, preserving service order.
/// Word- and table-level blocks are excluded.
fn assemble_lines(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Line)
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
