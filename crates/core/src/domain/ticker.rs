use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const MAX_TICKER_LEN: usize = 5;

// Uppercase tokens that show up in model prose but are not listed symbols.
const COMMON_WORDS: &[&str] = &[
    "THE", "AND", "FOR", "ARE", "YOU", "ALL", "NEW", "TOP", "BEST", "HIGH", "LOW", "ONE",
    "NOT", "BUT", "WITH", "THIS", "NOTE", "CEO", "CFO", "CTO", "USA", "US", "AI", "EPS",
    "ETF", "IPO", "FDA", "SEC", "GDP", "EV", "PE", "ROI", "YOY", "NYSE", "AMEX", "OTC",
    "TSX", "LLC", "INC", "II", "III",
];

/// A validated ticker symbol: 1..=5 ASCII uppercase letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickerError {
    #[error("ticker must be non-empty")]
    Empty,
    #[error("ticker {0:?} is longer than {MAX_TICKER_LEN} characters")]
    TooLong(String),
    #[error("ticker {0:?} must contain only ASCII letters")]
    InvalidCharacters(String),
}

impl Ticker {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('$');
        if s.is_empty() {
            return Err(TickerError::Empty);
        }
        if s.len() > MAX_TICKER_LEN {
            return Err(TickerError::TooLong(s.to_string()));
        }
        if !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TickerError::InvalidCharacters(s.to_string()));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn labelled_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i:symbol|ticker)\**\s*[:\-]\s*\**\s*\$?([A-Z]{1,5})\b")
            .expect("labelled ticker regex is valid")
    })
}

fn exchange_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:NASDAQ|NYSE|AMEX|OTC|TSX)(?:\s+American)?\s*:\s*([A-Z]{1,5})\b")
            .expect("exchange ticker regex is valid")
    })
}

fn cashtag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([A-Z]{1,5})\b").expect("cashtag regex is valid"))
}

fn bare_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("bare ticker regex is valid"))
}

/// Pull the picked symbol out of the discovery text.
///
/// Explicit markers win (`Symbol: XYZ`, `(NASDAQ: XYZ)`, `$XYZ`); otherwise the first
/// standalone uppercase word of 2..=5 letters that is not a common word. A marked
/// candidate that looks like prose (`Symbol: A strong pick`) falls through to the next
/// marker.
pub fn extract_ticker(text: &str) -> Option<Ticker> {
    // (pattern, shortest accepted candidate)
    let markers = [(labelled_re(), 2), (exchange_re(), 1), (cashtag_re(), 1)];
    let marked = markers.into_iter().find_map(|(re, min_len)| {
        re.captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .find(|word| word.len() >= min_len && !COMMON_WORDS.contains(word))
    });
    if let Some(ticker) = marked.and_then(|word| word.parse().ok()) {
        return Some(ticker);
    }

    bare_re()
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|word| !COMMON_WORDS.contains(word))
        .and_then(|word| word.parse().ok())
}
