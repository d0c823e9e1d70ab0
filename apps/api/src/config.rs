use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Loaded once at startup and passed into components explicitly —
/// no module reads the process environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    pub s3_bucket: String,
    /// Optional endpoint override for MinIO (local). Unset in production.
    pub s3_endpoint: Option<String>,
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Seconds between OCR job status reads.
    pub ocr_poll_interval_secs: u64,
    /// Maximum seconds to wait for an OCR job before surfacing a timeout.
    /// The historical behavior waited forever; the bound is deliberate.
    pub ocr_poll_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: std::env::var("S3_ENDPOINT").ok(),
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ocr_poll_interval_secs: parse_env_or("OCR_POLL_INTERVAL_SECS", 2)?,
            ocr_poll_timeout_secs: parse_env_or("OCR_POLL_TIMEOUT_SECS", 600)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env_or(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .with_context(|| format!("{key} must be a non-negative integer")),
        Err(_) => Ok(default),
    }
}
