use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::LlmConfig;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that outputs strict JSON.";

/// One chat exchange against the text-generation provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> anyhow::Result<String>;
}

/// DashScope text-generation client (`result_format: message`).
pub struct DashScopeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl DashScopeClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build llm client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for DashScopeClient {
    async fn generate(&self, system: &str, user: &str) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "input": {
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ]
            },
            "parameters": { "result_format": "message" }
        });

        let url = format!(
            "{}/api/v1/services/aigc/text-generation/generation",
            self.base_url
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("text generation request failed")?;

        let status = response.status();
        let payload = response
            .json::<Value>()
            .await
            .context("text generation response is not JSON")?;
        if !status.is_success() {
            let code = payload
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            anyhow::bail!("text generation failed: {} {} {}", status, code, message);
        }

        payload
            .pointer("/output/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("text generation response carried no content"))
    }
}
