//! Interchangeable classification strategies behind one trait.

mod heuristic;
mod urls;

use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use reqwest::Client;

use crate::{
    ai::LlmClient,
    config::{AppConfig, ClassifierKind},
    domain::{RawPayload, SanitizedMessage},
};

pub use heuristic::HeuristicClassifier;

pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce an untrusted judgment for the normalizer. Errors mean the
    /// upstream could not be consulted at all.
    fn analyze<'a>(&'a self, message: &'a SanitizedMessage) -> BoxFuture<'a, Result<RawPayload>>;
}

pub fn build_classifier(config: &AppConfig) -> Result<Arc<dyn Classifier>> {
    match config.classifier {
        ClassifierKind::Llm => {
            if config.llm.api_key.is_none() {
                tracing::warn!(
                    target: "llm",
                    "LLM_API_KEY is not set; every request will return the fallback result"
                );
            }
            let http = Client::builder()
                .user_agent(format!("spam-detect-rust/{}", env!("CARGO_PKG_VERSION")))
                .build()?;
            Ok(Arc::new(LlmClient::new(http, config.llm.clone())))
        }
        ClassifierKind::Heuristic => Ok(Arc::new(HeuristicClassifier::new(
            config.heuristic.clone(),
        )?)),
    }
}
