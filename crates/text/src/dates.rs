//! Natural-language date-range resolver.
//!
//! Recognizes Korean calendar text (`2025년 9월 1일 ~ 14일`) and numeric forms
//! (`2025-12-20 ~ 01-05`, `2025.09.01 ~ 2025.09.14`, `12/20 ~ 1/5`), including
//! partial continuations that inherit the year and/or month of the start date.
//! Families are tried in a fixed precedence, most specific first; the first one
//! that yields concrete dates wins.

use std::str::FromStr;

use allyflow_core::DateRange;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::sanitize::preview;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("no date range found in `{preview}`")]
    NoRangeFound { preview: String },
}

/// Pattern families in resolution order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PatternFamily {
    /// `2025년 9월 1일 ~ 2025년 9월 14일`
    KoreanFull,
    /// `2025년 9월 1일 ~ 14일`
    KoreanDayOmitted,
    /// `2025년 12월 20일 ~ 1월 5일`
    KoreanYearOmitted,
    /// `9월 1일 ~ 9월 14일`, `9월 1일 ~ 14일` (year from the reference date)
    KoreanMonthDay,
    /// `2025-09-01 ~ 2025-09-14`
    NumericFull,
    /// `2025-12-20 ~ 01-05`
    NumericYearOmitted,
    /// `2025.09.01 ~ 14`
    NumericDayOmitted,
    /// `12/20 ~ 1/5` (year from the reference date)
    NumericMonthDay,
    /// `2025년 9월 1일` alone
    SingleKorean,
    /// `2025-09-01` alone
    SingleNumeric,
}

impl PatternFamily {
    pub const PRECEDENCE: [PatternFamily; 10] = [
        PatternFamily::KoreanFull,
        PatternFamily::KoreanDayOmitted,
        PatternFamily::KoreanYearOmitted,
        PatternFamily::KoreanMonthDay,
        PatternFamily::NumericFull,
        PatternFamily::NumericYearOmitted,
        PatternFamily::NumericDayOmitted,
        PatternFamily::NumericMonthDay,
        PatternFamily::SingleKorean,
        PatternFamily::SingleNumeric,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatternFamily::KoreanFull => "korean_full",
            PatternFamily::KoreanDayOmitted => "korean_day_omitted",
            PatternFamily::KoreanYearOmitted => "korean_year_omitted",
            PatternFamily::KoreanMonthDay => "korean_month_day",
            PatternFamily::NumericFull => "numeric_full",
            PatternFamily::NumericYearOmitted => "numeric_year_omitted",
            PatternFamily::NumericDayOmitted => "numeric_day_omitted",
            PatternFamily::NumericMonthDay => "numeric_month_day",
            PatternFamily::SingleKorean => "single_korean",
            PatternFamily::SingleNumeric => "single_numeric",
        }
    }

    /// Run this family alone against already-normalized text.
    fn try_match(self, text: &str, reference: NaiveDate) -> Option<DateRange> {
        match self {
            PatternFamily::KoreanFull => first_match(&KO_FULL, text, full),
            PatternFamily::KoreanDayOmitted => first_match(&KO_DAY_OMITTED, text, day_omitted),
            PatternFamily::KoreanYearOmitted => first_match(&KO_YEAR_OMITTED, text, year_omitted),
            PatternFamily::KoreanMonthDay => {
                first_match(&KO_MONTH_DAY, text, |c| month_day(c, reference.year()))
            }
            PatternFamily::NumericFull => first_match(&NUM_FULL, text, full),
            PatternFamily::NumericYearOmitted => first_match(&NUM_YEAR_OMITTED, text, year_omitted),
            PatternFamily::NumericDayOmitted => first_match(&NUM_DAY_OMITTED, text, day_omitted),
            PatternFamily::NumericMonthDay => {
                first_match(&NUM_MONTH_DAY, text, |c| month_day(c, reference.year()))
            }
            PatternFamily::SingleKorean => first_match(&KO_SINGLE, text, single),
            PatternFamily::SingleNumeric => first_match(&NUM_SINGLE, text, single),
        }
    }
}

impl core::fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> =
            Lazy::new(|| Regex::new($re).expect(concat!(stringify!($name), " pattern compiles")));
    };
}

pattern!(SEPARATORS, r"[~∼〜－–—]|부터");
pattern!(WHITESPACE, r"\s+");

pattern!(
    KO_FULL,
    r"(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일\s*~\s*(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일"
);
pattern!(
    KO_DAY_OMITTED,
    r"(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일\s*~\s*(\d{1,2})\s*일"
);
pattern!(
    KO_YEAR_OMITTED,
    r"(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일\s*~\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일"
);
pattern!(
    KO_MONTH_DAY,
    r"(\d{1,2})\s*월\s*(\d{1,2})\s*일\s*~\s*(?:(\d{1,2})\s*월\s*)?(\d{1,2})\s*일"
);
pattern!(
    NUM_FULL,
    r"(\d{4})[-./](\d{1,2})[-./](\d{1,2})\s*~\s*(\d{4})[-./](\d{1,2})[-./](\d{1,2})"
);
pattern!(
    NUM_YEAR_OMITTED,
    r"(\d{4})[-./](\d{1,2})[-./](\d{1,2})\s*~\s*(\d{1,2})[-./](\d{1,2})"
);
pattern!(
    NUM_DAY_OMITTED,
    r"(\d{4})[-./](\d{1,2})[-./](\d{1,2})\s*~\s*(\d{1,2})(?:\s*일)?(?:[^\d./-]|$)"
);
pattern!(
    NUM_MONTH_DAY,
    r"(?:^|[^\d./-])(\d{1,2})[-./](\d{1,2})\s*~\s*(\d{1,2})[-./](\d{1,2})"
);
pattern!(KO_SINGLE, r"(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일");
pattern!(NUM_SINGLE, r"(\d{4})[-./](\d{1,2})[-./](\d{1,2})");

/// Unify range separators to `~` and collapse whitespace runs.
pub fn normalize(text: &str) -> String {
    let unified = SEPARATORS.replace_all(text, "~");
    WHITESPACE.replace_all(&unified, " ").trim().to_string()
}

/// Resolve a date range, reporting which family matched.
pub fn detect(text: &str, reference: NaiveDate) -> Option<(PatternFamily, DateRange)> {
    let normalized = normalize(text);
    PatternFamily::PRECEDENCE
        .iter()
        .find_map(|family| family.try_match(&normalized, reference).map(|range| (*family, range)))
}

/// Resolve `(start, end)` from free text, with `reference` supplying the year
/// for forms that omit it. The result is always ordered.
pub fn resolve(text: &str, reference: NaiveDate) -> Result<DateRange, DateRangeError> {
    detect(text, reference)
        .map(|(_, range)| range)
        .ok_or_else(|| DateRangeError::NoRangeFound {
            preview: preview(text.trim()),
        })
}

/// Try each non-blank candidate in order; the first that resolves wins.
pub fn resolve_first<'a, I>(candidates: I, reference: NaiveDate) -> Result<DateRange, DateRangeError>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut first_seen: Option<&str> = None;
    for candidate in candidates.into_iter().flatten() {
        if candidate.trim().is_empty() {
            continue;
        }
        first_seen.get_or_insert(candidate);
        if let Some((_, range)) = detect(candidate, reference) {
            return Ok(range);
        }
    }
    Err(DateRangeError::NoRangeFound {
        preview: preview(first_seen.unwrap_or_default().trim()),
    })
}

fn first_match(
    re: &Regex,
    text: &str,
    build: impl Fn(&Captures<'_>) -> Option<DateRange>,
) -> Option<DateRange> {
    re.captures_iter(text).find_map(|caps| build(&caps))
}

fn num<T: FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// A continuation month earlier than the start month belongs to the next year.
fn continuation_year(year: i32, start_month: u32, end_month: u32) -> i32 {
    if end_month < start_month { year + 1 } else { year }
}

fn full(c: &Captures<'_>) -> Option<DateRange> {
    let start = ymd(num(c, 1)?, num(c, 2)?, num(c, 3)?)?;
    let end = ymd(num(c, 4)?, num(c, 5)?, num(c, 6)?)?;
    Some(DateRange::ordered(start, end))
}

fn day_omitted(c: &Captures<'_>) -> Option<DateRange> {
    let (year, month): (i32, u32) = (num(c, 1)?, num(c, 2)?);
    let start = ymd(year, month, num(c, 3)?)?;
    let end = ymd(year, month, num(c, 4)?)?;
    Some(DateRange::ordered(start, end))
}

fn year_omitted(c: &Captures<'_>) -> Option<DateRange> {
    let (year, start_month, end_month): (i32, u32, u32) = (num(c, 1)?, num(c, 2)?, num(c, 4)?);
    let start = ymd(year, start_month, num(c, 3)?)?;
    let end = ymd(
        continuation_year(year, start_month, end_month),
        end_month,
        num(c, 5)?,
    )?;
    Some(DateRange::ordered(start, end))
}

fn month_day(c: &Captures<'_>, year: i32) -> Option<DateRange> {
    let start_month: u32 = num(c, 1)?;
    let end_month: u32 = num(c, 3).unwrap_or(start_month);
    let start = ymd(year, start_month, num(c, 2)?)?;
    let end = ymd(
        continuation_year(year, start_month, end_month),
        end_month,
        num(c, 4)?,
    )?;
    Some(DateRange::ordered(start, end))
}

fn single(c: &Captures<'_>) -> Option<DateRange> {
    ymd(num(c, 1)?, num(c, 2)?, num(c, 3)?).map(DateRange::single_day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reference() -> NaiveDate {
        d(2025, 3, 1)
    }

    fn assert_family(text: &str, family: PatternFamily, start: NaiveDate, end: NaiveDate) {
        let (matched, range) = detect(text, reference()).unwrap();
        assert_eq!(matched, family, "family for {text:?}");
        assert_eq!((range.start(), range.end()), (start, end), "range for {text:?}");
    }

    #[test]
    fn korean_full_dates() {
        assert_family(
            "기간: 2025년 9월 1일 ~ 2025년 9월 14일",
            PatternFamily::KoreanFull,
            d(2025, 9, 1),
            d(2025, 9, 14),
        );
    }

    #[test]
    fn korean_day_continuation() {
        assert_family(
            "2025년 9월 1일 ~ 14일",
            PatternFamily::KoreanDayOmitted,
            d(2025, 9, 1),
            d(2025, 9, 14),
        );
    }

    #[test]
    fn korean_month_day_continuation_rolls_year() {
        assert_family(
            "2025년 12월 20일 ~ 1월 5일",
            PatternFamily::KoreanYearOmitted,
            d(2025, 12, 20),
            d(2026, 1, 5),
        );
        assert_family(
            "2025년 9월 1일 ~ 10월 3일",
            PatternFamily::KoreanYearOmitted,
            d(2025, 9, 1),
            d(2025, 10, 3),
        );
    }

    #[test]
    fn korean_month_day_uses_reference_year() {
        assert_family(
            "9월 1일 ~ 9월 14일",
            PatternFamily::KoreanMonthDay,
            d(2025, 9, 1),
            d(2025, 9, 14),
        );
        assert_family(
            "9월 1일 ~ 14일",
            PatternFamily::KoreanMonthDay,
            d(2025, 9, 1),
            d(2025, 9, 14),
        );
        assert_family(
            "12월 20일 ~ 1월 5일",
            PatternFamily::KoreanMonthDay,
            d(2025, 12, 20),
            d(2026, 1, 5),
        );
    }

    #[test]
    fn numeric_full_dates_with_mixed_separators() {
        assert_family(
            "2025-09-01 ~ 2025.09.14",
            PatternFamily::NumericFull,
            d(2025, 9, 1),
            d(2025, 9, 14),
        );
        assert_family(
            "2025/09/01~2025/09/14",
            PatternFamily::NumericFull,
            d(2025, 9, 1),
            d(2025, 9, 14),
        );
    }

    #[test]
    fn numeric_year_omitted_rolls_year() {
        assert_family(
            "2025-12-20 ~ 01-05",
            PatternFamily::NumericYearOmitted,
            d(2025, 12, 20),
            d(2026, 1, 5),
        );
    }

    #[test]
    fn numeric_day_omitted() {
        assert_family(
            "2025.09.01 ~ 14",
            PatternFamily::NumericDayOmitted,
            d(2025, 9, 1),
            d(2025, 9, 14),
        );
        assert_family(
            "2025.09.01 ~ 14일까지",
            PatternFamily::NumericDayOmitted,
            d(2025, 9, 1),
            d(2025, 9, 14),
        );
    }

    #[test]
    fn numeric_month_day_uses_reference_year() {
        assert_family(
            "12/20 ~ 1/5",
            PatternFamily::NumericMonthDay,
            d(2025, 12, 20),
            d(2026, 1, 5),
        );
    }

    #[test]
    fn single_dates_become_single_day_ranges() {
        assert_family(
            "행사일은 2025년 10월 3일입니다",
            PatternFamily::SingleKorean,
            d(2025, 10, 3),
            d(2025, 10, 3),
        );
        assert_family(
            "deadline 2025-10-03",
            PatternFamily::SingleNumeric,
            d(2025, 10, 3),
            d(2025, 10, 3),
        );
    }

    #[test]
    fn separator_glyphs_and_whitespace_are_normalized() {
        for sep in ["~", "∼", "〜", "－", "–", "—", "부터"] {
            let text = format!("2025년  9월\n1일 {sep}   2025년 9월 14일");
            let range = resolve(&text, reference()).unwrap();
            assert_eq!(range.start(), d(2025, 9, 1), "separator {sep}");
            assert_eq!(range.end(), d(2025, 9, 14), "separator {sep}");
        }
    }

    #[test]
    fn inverted_text_order_is_swapped() {
        let range = resolve("2025-09-14 ~ 2025-09-01", reference()).unwrap();
        assert_eq!(range.start(), d(2025, 9, 1));
        assert_eq!(range.end(), d(2025, 9, 14));
    }

    #[test]
    fn impossible_calendar_dates_fall_through() {
        let (family, range) = detect("2025-02-30 ~ 2025-03-02, 2025-04-01", reference()).unwrap();
        assert_eq!(family, PatternFamily::SingleNumeric);
        assert_eq!(range.start(), d(2025, 3, 2));
    }

    #[test]
    fn no_dates_is_no_range_found() {
        let err = resolve("협의 후 결정", reference()).unwrap_err();
        assert_eq!(
            err,
            DateRangeError::NoRangeFound {
                preview: "협의 후 결정".to_string()
            }
        );
    }

    #[test]
    fn resolve_first_skips_blank_and_unresolvable_candidates() {
        let range = resolve_first(
            [None, Some("  "), Some("추후 협의"), Some("2025-09-01 ~ 2025-09-14")],
            reference(),
        )
        .unwrap();
        assert_eq!(range.end(), d(2025, 9, 14));

        let err = resolve_first([None, Some("추후 협의")], reference()).unwrap_err();
        assert_eq!(
            err,
            DateRangeError::NoRangeFound {
                preview: "추후 협의".to_string()
            }
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn date() -> impl Strategy<Value = NaiveDate> {
            (2000i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, day)| d(y, m, day))
        }

        fn korean(date: NaiveDate) -> String {
            format!("{}년 {}월 {}일", date.year(), date.month(), date.day())
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: two localized dates in either order resolve to (min, max).
            #[test]
            fn two_korean_dates_resolve_to_min_max(a in date(), b in date()) {
                let text = format!("{} ~ {}", korean(a), korean(b));
                let range = resolve(&text, reference()).unwrap();
                prop_assert_eq!(range.start(), a.min(b));
                prop_assert_eq!(range.end(), a.max(b));
            }

            /// Property: an earlier continuation month rolls the year forward by one.
            #[test]
            fn earlier_continuation_month_rolls_forward_one_year(
                year in 2000i32..2100,
                start_month in 2u32..=12,
                end_month_seed in 0u32..11,
                start_day in 1u32..=28,
                end_day in 1u32..=28,
            ) {
                let end_month = 1 + end_month_seed % (start_month - 1);
                let text = format!("{year}년 {start_month}월 {start_day}일 ~ {end_month}월 {end_day}일");
                let range = resolve(&text, reference()).unwrap();
                prop_assert_eq!(range.start(), d(year, start_month, start_day));
                prop_assert_eq!(range.end(), d(year + 1, end_month, end_day));
            }
        }
    }
}
