mod config;
mod errors;
mod model;
mod ocr;
mod parser;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::{Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::model::TitanModel;
use crate::ocr::TextractOcr;
use crate::parser::extract::OutputExtractor;
use crate::parser::pipeline::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume parser API v{}", env!("CARGO_PKG_VERSION"));

    // One base AWS config; every service client derives from it
    let aws = build_aws_config(&config).await;
    let s3 = build_s3_client(&config, &aws);
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    let textract = aws_sdk_textract::Client::new(&aws);
    info!("Textract client initialized");

    let bedrock = aws_sdk_bedrockruntime::Client::new(&aws);
    info!("Bedrock client initialized (model: {})", model::MODEL_ID);

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(TextractOcr::new(textract)),
        Arc::new(TitanModel::new(bedrock)),
        OutputExtractor::default(),
        Duration::from_secs(config.ocr_poll_interval_secs),
        Duration::from_secs(config.ocr_poll_timeout_secs),
    ));

    let state = AppState {
        s3,
        pipeline,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the shared AWS SDK config from explicit credentials in `Config`.
/// No client reads ambient process credentials.
async fn build_aws_config(config: &Config) -> SdkConfig {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resume-parser-static",
    );

    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .credentials_provider(credentials)
        .load()
        .await
}

/// Constructs an S3 client, honoring the MinIO endpoint override when set.
fn build_s3_client(config: &Config, aws: &SdkConfig) -> aws_sdk_s3::Client {
    match &config.s3_endpoint {
        Some(endpoint) => {
            let s3_config = aws_sdk_s3::config::Builder::from(aws)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build();
            aws_sdk_s3::Client::from_conf(s3_config)
        }
        None => aws_sdk_s3::Client::new(aws),
    }
}
