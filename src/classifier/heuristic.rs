use anyhow::{Context, Result};
use futures::future::{self, BoxFuture, FutureExt};
use regex::Regex;
use serde_json::{json, Value};

use crate::{
    config::HeuristicConfig,
    domain::{Language, RawPayload, SanitizedMessage},
};

use super::{urls::analyze_urls, Classifier};

const MARATHI_MARKERS: &[&str] = &["आहे", "आणि", "नाही", "तुमचे", "तुमच्या", "आपले"];

struct Keyword {
    text: String,
    pattern: Regex,
}

/// Keyword scoring plus URL inspection, no network access.
pub struct HeuristicClassifier {
    config: HeuristicConfig,
    spam: Vec<Keyword>,
    phishing: Vec<Keyword>,
}

impl HeuristicClassifier {
    pub fn new(config: HeuristicConfig) -> Result<Self> {
        let spam = compile_keywords(&config.spam_keywords)?;
        let phishing = compile_keywords(&config.phishing_keywords)?;
        Ok(Self {
            config,
            spam,
            phishing,
        })
    }

    /// Weights come straight from the environment, so the sum saturates.
    fn points(&self, keyword_hits: usize, flagged_urls: u32) -> u32 {
        let hits = u32::try_from(keyword_hits).unwrap_or(u32::MAX);
        hits.saturating_mul(self.config.keyword_weight)
            .saturating_add(flagged_urls.saturating_mul(self.config.url_weight))
    }

    pub fn score(&self, text: &str) -> Value {
        let spam_hits = matched(&self.spam, text);
        let phishing_hits = matched(&self.phishing, text);
        let findings = analyze_urls(text);

        let suspicious_urls = findings.iter().filter(|f| f.suspicious()).count() as u32;
        let shortened_urls = findings.iter().filter(|f| f.shortened).count() as u32;

        let spam_score = self.points(spam_hits.len(), shortened_urls);
        let phishing_score = self.points(phishing_hits.len(), suspicious_urls);

        let is_spam = spam_score >= self.config.threshold;
        let is_phishing = phishing_score >= self.config.threshold;
        let top = spam_score.max(phishing_score);
        let confidence = if is_spam || is_phishing {
            top.min(100)
        } else {
            100u32.saturating_sub(top)
        };

        let mut reasons: Vec<String> = Vec::new();
        reasons.extend(
            spam_hits
                .iter()
                .map(|kw| format!("Contains promotional keyword '{kw}'")),
        );
        reasons.extend(
            phishing_hits
                .iter()
                .map(|kw| format!("Contains phishing keyword '{kw}'")),
        );
        if suspicious_urls > 0 {
            reasons.push("Contains suspicious link".to_string());
        }
        if !is_spam && !is_phishing {
            reasons.push("No strong spam or phishing indicators".to_string());
        }

        let mut suggestions: Vec<&str> = Vec::new();
        if is_phishing {
            suggestions.extend([
                "Do not click any links",
                "Do not share personal information",
                "Report as phishing",
            ]);
        }
        if is_spam {
            suggestions.push("Mark as spam");
        }

        let url_reasons: Vec<&str> = findings
            .iter()
            .flat_map(|f| f.reasons.iter().map(String::as_str))
            .collect();

        tracing::debug!(
            target: "heuristic",
            spam_score,
            phishing_score,
            urls = findings.len(),
            "scored message"
        );

        json!({
            "is_spam": is_spam,
            "is_phishing": is_phishing,
            "confidence": confidence,
            "urls": {
                "count": findings.len(),
                "domains": findings.iter().map(|f| f.domain.as_str()).collect::<Vec<_>>(),
                "suspicious": suspicious_urls > 0,
                "reasons": url_reasons,
            },
            "reasons": reasons,
            "language": detect_language(text).code(),
            "suggestions": suggestions,
        })
    }
}

impl Classifier for HeuristicClassifier {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn analyze<'a>(&'a self, message: &'a SanitizedMessage) -> BoxFuture<'a, Result<RawPayload>> {
        future::ready(Ok(RawPayload::Object(self.score(message.as_str())))).boxed()
    }
}

fn compile_keywords(keywords: &[String]) -> Result<Vec<Keyword>> {
    keywords
        .iter()
        .map(|keyword| {
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))
                .with_context(|| format!("invalid keyword {keyword:?}"))?;
            Ok(Keyword {
                text: keyword.clone(),
                pattern,
            })
        })
        .collect()
}

fn matched<'a>(keywords: &'a [Keyword], text: &str) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|kw| kw.pattern.is_match(text))
        .map(|kw| kw.text.as_str())
        .collect()
}

fn detect_language(text: &str) -> Language {
    let devanagari = text.chars().any(|ch| ('\u{0900}'..='\u{097F}').contains(&ch));
    if !devanagari {
        return Language::En;
    }
    if MARATHI_MARKERS.iter().any(|marker| text.contains(marker)) {
        Language::Mr
    } else {
        Language::Hi
    }
}
