use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;

use crate::{
    classifier::Classifier,
    config::LlmConfig,
    domain::{RawPayload, SanitizedMessage},
};

use super::inference::{build_request, parse_response};

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(http: Client, config: LlmConfig) -> Self {
        Self { http, config }
    }

    /// Single attempt; the caller turns any error into the fallback result.
    pub async fn complete(&self, message: &SanitizedMessage) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .context("LLM_API_KEY must be configured for LLM classification")?;

        let request = build_request(&self.config, message);
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.config.api_url))?
            .error_for_status()?;

        parse_response(response).await
    }
}

impl Classifier for LlmClient {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn analyze<'a>(&'a self, message: &'a SanitizedMessage) -> BoxFuture<'a, Result<RawPayload>> {
        async move {
            let text = self.complete(message).await?;
            tracing::debug!(target: "llm", chars = text.len(), "received completion");
            Ok(RawPayload::Text(text))
        }
        .boxed()
    }
}
