use std::{sync::Arc, time::Instant};

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{
    classifier::Classifier,
    domain::{ClassificationResult, SanitizedMessage},
    normalizer::normalize,
};

use super::error::DetectError;

/// Built once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/detect", post(detect))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn detect(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ClassificationResult>, DetectError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::warn!(target: "detect", error = %rejection, "rejected request body");
        DetectError::InvalidBody
    })?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .and_then(SanitizedMessage::new)
        .ok_or(DetectError::EmptyInput)?;

    let classifier = state.classifier.name();
    let started = Instant::now();

    let raw = state.classifier.analyze(&message).await.map_err(|err| {
        tracing::error!(target: "detect", classifier, error = %format!("{err:#}"), "classifier call failed");
        DetectError::UpstreamUnavailable(err)
    })?;

    let result = normalize(raw).map_err(|err| {
        tracing::warn!(target: "detect", classifier, error = %err, "classifier response unusable");
        DetectError::from(err)
    })?;

    tracing::info!(
        target: "detect",
        classifier,
        is_spam = result.is_spam,
        is_phishing = result.is_phishing,
        confidence = result.confidence,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "message classified"
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, Result};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use futures::future::{self, BoxFuture, FutureExt};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        classifier::HeuristicClassifier, config::HeuristicConfig, domain::RawPayload,
    };

    enum Reply {
        Text(&'static str),
        Fail,
    }

    struct StubClassifier {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Classifier for StubClassifier {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn analyze<'a>(&'a self, _: &'a SanitizedMessage) -> BoxFuture<'a, Result<RawPayload>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = match self.reply {
                Reply::Text(text) => Ok(RawPayload::Text(text.to_string())),
                Reply::Fail => Err(anyhow!("connection refused")),
            };
            future::ready(reply).boxed()
        }
    }

    async fn post_raw(classifier: Arc<dyn Classifier>, body: &str) -> (StatusCode, Value) {
        let app = router(AppState { classifier }, 64 * 1024);
        let request = Request::builder()
            .method("POST")
            .uri("/api/detect")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post(classifier: Arc<dyn Classifier>, body: Value) -> (StatusCode, Value) {
        post_raw(classifier, &body.to_string()).await
    }

    fn fallback_json() -> Value {
        json!({
            "is_spam": false,
            "is_phishing": false,
            "confidence": 50,
            "reasons": ["AI analysis unavailable"],
            "language": "en",
            "suggestions": ["Please review manually"],
        })
    }

    #[tokio::test]
    async fn blank_messages_never_reach_the_classifier() {
        let stub = StubClassifier::new(Reply::Text("{}"));
        for body in [
            json!({"message": ""}),
            json!({"message": "   \n "}),
            json!({"message": 42}),
            json!({}),
        ] {
            let (status, body) = post(stub.clone(), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "Message cannot be empty"}));
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let stub = StubClassifier::new(Reply::Text("{}"));
        let (status, body) = post_raw(stub.clone(), "{\"message\": ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upstream_text_is_normalized() {
        let stub = StubClassifier::new(Reply::Text(
            "Sure!\n```json\n{\"is_spam\": true, \"confidence\": 250, \"reasons\": \"promo\", \"language\": \"fr\"}\n```",
        ));
        let (status, body) = post(stub.clone(), json!({"message": "Win big now"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "is_spam": true,
                "is_phishing": false,
                "confidence": 100,
                "reasons": [],
                "language": "en",
                "suggestions": [],
            })
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unparsable_upstream_returns_fallback() {
        let stub = StubClassifier::new(Reply::Text("I'm sorry, I can't help with that."));
        let (status, body) = post(stub, json!({"message": "hello"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Analysis failed", "fallback": fallback_json()}));
    }

    #[tokio::test]
    async fn upstream_failure_returns_fallback() {
        let stub = StubClassifier::new(Reply::Fail);
        let (status, body) = post(stub.clone(), json!({"message": "hello"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Analysis failed", "fallback": fallback_json()}));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn heuristic_engine_serves_requests() {
        let classifier = Arc::new(HeuristicClassifier::new(HeuristicConfig::default()).unwrap());
        let (status, body) = post(
            classifier,
            json!({"message": "Your account will be locked! Verify now: security-microsoft.com/login"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_phishing"], true);
        assert_eq!(body["language"], "en");
        assert_eq!(body["urls"]["count"], 1);
        assert_eq!(body["urls"]["reasons"][0], "Impersonates Microsoft domain");
    }
}
