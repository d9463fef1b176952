//! Cleanup of model output and lenient extraction of the embedded JSON payload.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Maximum number of characters of cleaned text carried by an [`ExtractError`].
pub const PREVIEW_LIMIT: usize = 200;

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*").expect("opening fence pattern compiles"));
static FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*```$").expect("closing fence pattern compiles"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Both the strict and the lenient pass failed.
    #[error("generated text is not a structured record ({reason}): {preview}")]
    Unparseable { preview: String, reason: String },
}

impl ExtractError {
    pub fn preview(&self) -> &str {
        match self {
            ExtractError::Unparseable { preview, .. } => preview,
        }
    }
}

/// Trim and drop a leading/trailing triple-backtick fence (with or without a
/// `json` tag). Used on its own for prose replies.
pub fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let opened = FENCE_OPEN.replace(trimmed, "");
    let closed = FENCE_CLOSE.replace(&opened, "");
    closed.trim().to_string()
}

/// Normalize model output towards a bare JSON object.
///
/// Steps, in order: strip fences, slice from the first `{` to the last `}`,
/// straighten curly quotes, drop byte-order marks, trim.
pub fn sanitize(raw: &str) -> String {
    let mut text = strip_fences(raw);

    if let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) {
        if first < last {
            text = text[first..=last].to_string();
        }
    }

    text.replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{FEFF}', "")
        .trim()
        .to_string()
}

/// Extract a typed record from generated text.
///
/// Strict pass over the sanitized text first, then one lenient pass that
/// sanitizes again. No further retries.
pub fn extract<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    let cleaned = sanitize(raw);
    match serde_json::from_str::<T>(&cleaned) {
        Ok(value) => Ok(value),
        Err(_) => {
            let again = sanitize(&cleaned);
            serde_json::from_str::<T>(&again).map_err(|e| ExtractError::Unparseable {
                preview: preview(&again),
                reason: e.to_string(),
            })
        }
    }
}

/// Untyped variant of [`extract`].
pub fn extract_value(raw: &str) -> Result<Value, ExtractError> {
    extract::<Value>(raw)
}

pub(crate) fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LIMIT {
        return text.to_string();
    }
    let head: String = text.chars().take(PREVIEW_LIMIT - 3).collect();
    format!("{head}...")
}
