use serde_json::{Map, Value};

use crate::domain::{ClassificationResult, Language, UrlAnalysis};

const DEFAULT_CONFIDENCE: f64 = 50.0;

pub fn coerce(value: &Value) -> ClassificationResult {
    ClassificationResult {
        is_spam: truthy(value.get("is_spam")),
        is_phishing: truthy(value.get("is_phishing")),
        confidence: confidence(value.get("confidence")),
        reasons: string_list(value.get("reasons")),
        language: value
            .get("language")
            .and_then(Value::as_str)
            .and_then(Language::from_code)
            .unwrap_or_default(),
        suggestions: string_list(value.get("suggestions")),
        urls: value.get("urls").and_then(Value::as_object).map(url_analysis),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn confidence(value: Option<&Value>) -> u8 {
    let n = finite_number(value).unwrap_or(DEFAULT_CONFIDENCE);
    n.round().clamp(1.0, 100.0) as u8
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn url_analysis(urls: &Map<String, Value>) -> UrlAnalysis {
    let domains = string_list(urls.get("domains"));
    let count = finite_number(urls.get("count"))
        .map(|n| n.round().clamp(0.0, f64::from(u32::MAX)) as u32)
        .unwrap_or(domains.len() as u32);

    UrlAnalysis {
        count,
        domains,
        suspicious: truthy(urls.get("suspicious")),
        reasons: string_list(urls.get("reasons")),
    }
}
