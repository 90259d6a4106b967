use once_cell::sync::Lazy;
use regex::Regex;
use url::{Host, Url};

const MAX_URLS: usize = 20;

static SCHEME_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bhttps?://[^\s<>]+").expect("valid url regex"));
static BARE_DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[\s(\[<'])((?:www\.)?(?:[a-z0-9-]+\.)+(?:com|net|org|io|co|in|ly|me|info|biz|xyz|top|ru|cn|app|link|gl|at|cc)\b(?:/[^\s<>]*)?)",
    )
    .expect("valid bare domain regex")
});

const SHORTENERS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "cutt.ly",
    "rebrand.ly",
    "shorturl.at",
    "tiny.cc",
];

/// Brand keyword and the domain that brand actually owns.
const BRANDS: &[(&str, &str, &str)] = &[
    ("microsoft", "Microsoft", "microsoft.com"),
    ("paypal", "PayPal", "paypal.com"),
    ("apple", "Apple", "apple.com"),
    ("amazon", "Amazon", "amazon.com"),
    ("google", "Google", "google.com"),
    ("netflix", "Netflix", "netflix.com"),
    ("facebook", "Facebook", "facebook.com"),
    ("instagram", "Instagram", "instagram.com"),
    ("whatsapp", "WhatsApp", "whatsapp.com"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFinding {
    pub domain: String,
    pub shortened: bool,
    pub reasons: Vec<String>,
}

impl UrlFinding {
    pub fn suspicious(&self) -> bool {
        !self.reasons.is_empty()
    }
}

pub fn analyze_urls(text: &str) -> Vec<UrlFinding> {
    let mut findings: Vec<UrlFinding> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for (raw, explicit_scheme) in candidates(text) {
        if findings.len() >= MAX_URLS {
            break;
        }
        let cleaned = normalize_url(&raw);
        if cleaned.is_empty() || seen.contains(&cleaned) {
            continue;
        }
        let parsed = if explicit_scheme {
            Url::parse(&cleaned)
        } else {
            Url::parse(&format!("https://{cleaned}"))
        };
        let Ok(url) = parsed else {
            continue;
        };
        if let Some(finding) = assess(&url, explicit_scheme) {
            seen.push(cleaned);
            findings.push(finding);
        }
    }
    findings
}

fn candidates(text: &str) -> Vec<(String, bool)> {
    let mut out: Vec<(String, bool)> = SCHEME_URL_REGEX
        .find_iter(text)
        .map(|m| (m.as_str().to_string(), true))
        .collect();
    out.extend(
        BARE_DOMAIN_REGEX
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| (m.as_str().to_string(), false)),
    );
    out
}

fn assess(url: &Url, explicit_scheme: bool) -> Option<UrlFinding> {
    let mut reasons = Vec::new();

    let domain = match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.to_ascii_lowercase();
            domain
                .strip_prefix("www.")
                .map(str::to_string)
                .unwrap_or(domain)
        }
        Host::Ipv4(addr) => {
            reasons.push("Uses an IP address instead of a domain".to_string());
            addr.to_string()
        }
        Host::Ipv6(addr) => {
            reasons.push("Uses an IP address instead of a domain".to_string());
            addr.to_string()
        }
    };

    let shortened = SHORTENERS.contains(&domain.as_str());
    if shortened {
        reasons.push("Shortened URL hides destination".to_string());
    }

    if explicit_scheme && url.scheme() == "http" {
        reasons.push("Uses insecure HTTP".to_string());
    }

    let folded = fold_lookalikes(&domain);
    for (keyword, label, official) in BRANDS {
        let owned = domain == *official || domain.ends_with(&format!(".{official}"));
        if owned {
            continue;
        }
        if domain.contains(keyword) {
            reasons.push(format!("Impersonates {label} domain"));
        } else if folded.contains(keyword) {
            reasons.push(format!("Misspelled domain mimicking {label}"));
        }
    }

    Some(UrlFinding {
        domain,
        shortened,
        reasons,
    })
}

fn fold_lookalikes(domain: &str) -> String {
    domain
        .chars()
        .map(|ch| match ch {
            '0' => 'o',
            '1' => 'l',
            '3' => 'e',
            '4' => 'a',
            '5' => 's',
            '7' => 't',
            other => other,
        })
        .collect()
}

fn normalize_url(raw: &str) -> String {
    let mut cleaned = raw.trim_end_matches(char::is_whitespace).to_string();
    while let Some(last) = cleaned.chars().last() {
        let should_trim = match last {
            ')' => !cleaned.contains('('),
            ']' => !cleaned.contains('['),
            '}' => !cleaned.contains('{'),
            '\'' => count_char(&cleaned, '\'') % 2 == 1,
            ',' | '.' | '!' | '?' | ';' | ':' => true,
            _ => false,
        };
        if should_trim {
            cleaned.pop();
        } else {
            break;
        }
    }
    cleaned
}

fn count_char(value: &str, needle: char) -> usize {
    value.chars().filter(|ch| *ch == needle).count()
}
