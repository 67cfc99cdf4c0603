use crate::config::Config;
use crate::error::AdapterError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::warn;

const MAX_NEW_TOKENS: u32 = 900;
const TEMPERATURE: f64 = 0.7;
const RAW_SNIPPET_MAX: usize = 800;

/// Seam between the request handlers and the external text-generation
/// endpoint. Handlers only ever see raw generated text or an [`AdapterError`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AdapterError>;
}

/// Hugging Face-style inference client. The endpoint, model, and token all
/// come from [`Config`] at construction; nothing here touches the environment.
pub struct HfClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HfClient {
    pub fn new(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            endpoint: cfg.inference_endpoint(),
            api_key: cfg.inference_api_key.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for HfClient {
    async fn generate(&self, prompt: &str) -> Result<String, AdapterError> {
        let body = json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": MAX_NEW_TOKENS,
                "temperature": TEMPERATURE,
                "return_full_text": false,
            },
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!("inference endpoint HTTP {}", status.as_u16());
            if !raw.is_empty() {
                let snippet: String = raw.chars().take(RAW_SNIPPET_MAX).collect();
                warn!("inference raw body: {snippet}");
            }
            return Err(AdapterError::Status(status.as_u16()));
        }

        extract_generated_text(&raw)
    }
}

/// Pull the generated text out of an inference response body. The API returns
/// `[{"generated_text": "..."}]` on success and `{"error": "..."}` on failure;
/// some deployments skip the array wrapper.
fn extract_generated_text(raw: &str) -> Result<String, AdapterError> {
    let root: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| AdapterError::EmptyGeneration)?;

    if let Some(err) = root.get("error") {
        let message = err
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| err.to_string());
        return Err(AdapterError::Provider(message));
    }

    let text = root
        .get(0)
        .and_then(|item| item.get("generated_text"))
        .or_else(|| root.get("generated_text"))
        .and_then(|v| v.as_str());

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(AdapterError::EmptyGeneration),
    }
}

/// Best-effort isolation of a JSON payload inside model prose: the span from
/// the first `{` through the last `}`. Text without such a span passes through
/// unchanged so downstream validation fails with the full reply in hand.
pub fn extract_json_span(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}
