use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::config::Config;
use crate::parser::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum
/// extractors.
#[derive(Clone)]
pub struct AppState {
    pub s3: S3Client,
    pub pipeline: Arc<Pipeline>,
    pub config: Config,
}
