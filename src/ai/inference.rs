use anyhow::{Context, Result};
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::{config::LlmConfig, domain::SanitizedMessage};

const SYSTEM_PROMPT: &str = r#"You are a security analyst who detects spam and phishing in short text messages. Reply with a single JSON object and nothing else, using this shape:

{
  "is_spam": boolean,
  "is_phishing": boolean,
  "confidence": number between 1 and 100,
  "urls": {
    "count": number,
    "domains": string[],
    "suspicious": boolean,
    "reasons": string[]
  },
  "reasons": string[],
  "language": "en" | "hi" | "mr",
  "suggestions": string[]
}

Mark a message as PHISHING when it asks for credentials or personal data, carries suspicious links, invents urgency, or pretends to be a known organisation.
Mark a message as SPAM when it is unsolicited promotion, a prize or giveaway, or otherwise irrelevant bulk content.
Treat ordinary professional or personal conversation, single words and greetings as CLEAN.

A link is suspicious when it impersonates a brand (microsoft.verify-security.com), uses a shortener (bit.ly, tinyurl), points at a raw IP address, misspells a brand (micr0soft.com), uses plain HTTP for a sensitive action, or its visible text differs from its target. Links on verified company domains over HTTPS are fine.

Example (phishing)
Message: "Your account will be locked! Verify now: security-microsoft.com/login"
Answer: {"is_spam": false, "is_phishing": true, "confidence": 95, "urls": {"count": 1, "domains": ["security-microsoft.com"], "suspicious": true, "reasons": ["Impersonates Microsoft domain"]}, "reasons": ["Creates false urgency", "Contains credential request", "Suspicious verification link"], "language": "en", "suggestions": ["Do not click the link", "Report as phishing"]}

Example (spam)
Message: "Win a free iPhone! Click: bit.ly/win-apple"
Answer: {"is_spam": true, "is_phishing": false, "confidence": 85, "urls": {"count": 1, "domains": ["bit.ly"], "suspicious": true, "reasons": ["Shortened URL hides destination"]}, "reasons": ["Promotional content", "Prize/giveaway offer"], "language": "en", "suggestions": ["Mark as spam"]}

Example (clean)
Message: "Hi John, meeting at 3pm tomorrow"
Answer: {"is_spam": false, "is_phishing": false, "confidence": 99, "urls": {"count": 0, "domains": [], "suspicious": false, "reasons": []}, "reasons": ["Normal professional communication"], "language": "en", "suggestions": []}"#;

pub fn build_request(config: &LlmConfig, message: &SanitizedMessage) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: SYSTEM_PROMPT.into(),
            },
            ChatMessage {
                role: "user".into(),
                content: format!("Now analyze this message:\n\"\"\"{}\"\"\"", message.as_str()),
            },
        ],
        temperature: config.temperature,
        top_p: 1.0,
        max_tokens: 1024,
        response_format: ResponseFormat {
            r#type: "json_object".into(),
        },
    }
}

pub async fn parse_response(response: Response) -> Result<String> {
    let completion: ChatCompletionResponse = response
        .json()
        .await
        .context("chat completion body was not valid JSON")?;
    completion_text(completion)
}

fn completion_text(completion: ChatCompletionResponse) -> Result<String> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .context("chat completion did not contain any choices")?;

    choice
        .message
        .and_then(|msg| msg.content)
        .filter(|content| !content.trim().is_empty())
        .context("chat completion missing message content")
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: i32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub r#type: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn config() -> LlmConfig {
        LlmConfig {
            api_url: "http://localhost/v1/chat/completions".into(),
            api_key: Some("test".into()),
            model: "test-model".into(),
            temperature: 0.3,
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn request_embeds_the_sanitized_message() {
        let message = SanitizedMessage::new("click \"here\"\nnow").unwrap();
        let request = serde_json::to_value(build_request(&config(), &message)).unwrap();

        assert_eq!(request["model"], "test-model");
        assert_eq!(request["response_format"]["type"], "json_object");
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(
            request["messages"][1]["content"],
            "Now analyze this message:\n\"\"\"click 'here' now\"\"\""
        );
    }

    #[test]
    fn first_choice_content_is_returned() {
        let completion: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"content": "{\"is_spam\": true}"}},
                {"message": {"content": "ignored"}}
            ]
        }))
        .unwrap();
        assert_eq!(completion_text(completion).unwrap(), "{\"is_spam\": true}");
    }

    #[test]
    fn empty_completions_are_errors() {
        let no_choices: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(completion_text(no_choices).is_err());

        let blank: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": "  "}}]})).unwrap();
        assert!(completion_text(blank).is_err());

        let missing: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"message": null}]})).unwrap();
        assert!(completion_text(missing).is_err());
    }
}
