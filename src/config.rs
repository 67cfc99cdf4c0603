use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_INFERENCE_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Runtime configuration, resolved once at startup and handed to the clients
/// explicitly. Nothing reads the environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub inference_url: String,
    pub inference_model: String,
    pub inference_api_key: String,
    pub youtube_api_key: Option<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let inference_api_key =
            env::var("HUGGINGFACE_API_KEY").context("HUGGINGFACE_API_KEY is not set")?;
        if inference_api_key.is_empty() {
            anyhow::bail!("HUGGINGFACE_API_KEY is empty");
        }

        let youtube_api_key = env::var("YOUTUBE_API_KEY").ok().filter(|k| !k.is_empty());

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            inference_url: env::var("INFERENCE_URL")
                .unwrap_or_else(|_| DEFAULT_INFERENCE_URL.to_string()),
            inference_model: env::var("INFERENCE_MODEL")
                .unwrap_or_else(|_| DEFAULT_INFERENCE_MODEL.to_string()),
            inference_api_key,
            youtube_api_key,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Full URL of the model endpoint the adapter posts prompts to.
    pub fn inference_endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.inference_url.trim_end_matches('/'),
            self.inference_model
        )
    }
}
