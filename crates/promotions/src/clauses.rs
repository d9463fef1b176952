//! Benefit clauses pulled out of an agreement body.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const TARGET_PLACEHOLDER: &str = "혜택 대상 정보 없음";
pub const PERIOD_PLACEHOLDER: &str = "기간 정보 없음";
pub const BENEFIT_PLACEHOLDER: &str = "혜택 정보 없음";
pub const CONDITION_PLACEHOLDER: &str = "조건 정보 없음";

static TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)혜택 제공 대상은 (.+?)으로 한정한다").expect("target pattern compiles")
});
static PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)혜택 제공 기간은 (.+?)까지로 한다").expect("period pattern compiles")
});
static BENEFIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)다음과 같은 혜택을 제공한다:\s*-(.+?)-").expect("benefit pattern compiles")
});
static CONDITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)혜택 이용 시 (.+?) 필수").expect("condition pattern compiles")
});

/// Target, period, benefit and condition sentences of an agreement body.
///
/// Each field holds the matched text, or a fixed placeholder when the body does
/// not contain the corresponding sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyClauses {
    pub target: String,
    pub period: String,
    pub benefit: String,
    pub condition: String,
}

impl BodyClauses {
    pub fn extract(body: &str) -> Self {
        Self {
            target: capture(&TARGET, body).unwrap_or_else(|| TARGET_PLACEHOLDER.to_string()),
            period: capture(&PERIOD, body).unwrap_or_else(|| PERIOD_PLACEHOLDER.to_string()),
            benefit: capture(&BENEFIT, body).unwrap_or_else(|| BENEFIT_PLACEHOLDER.to_string()),
            condition: capture(&CONDITION, body)
                .unwrap_or_else(|| CONDITION_PLACEHOLDER.to_string()),
        }
    }

    /// The extracted period, unless it is the placeholder.
    pub fn period_text(&self) -> Option<&str> {
        (self.period != PERIOD_PLACEHOLDER).then_some(self.period.as_str())
    }
}

fn capture(pattern: &Regex, body: &str) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
