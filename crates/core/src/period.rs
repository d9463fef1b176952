use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Inclusive calendar date range with `start <= end`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl ValueObject for DateRange {}

impl DateRange {
    /// Strict constructor: rejects `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(
                "end_date",
                format!("end date {end} is before start date {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from two dates in either order.
    pub fn ordered(a: NaiveDate, b: NaiveDate) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether any day of the range falls inside the given calendar month.
    pub fn overlaps_month(&self, year: i32, month: u32) -> bool {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return false;
        };
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let Some(last) = next.and_then(|d| d.pred_opt()) else {
            return false;
        };
        debug_assert_eq!(last.month(), month);
        !(self.end < first || self.start > last)
    }
}

impl core::fmt::Display for DateRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}

/// Validates an optional explicit pair: both-or-neither is not required, but a
/// present pair must not be inverted.
pub fn check_optional_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> DomainResult<()> {
    if let (Some(s), Some(e)) = (start, end) {
        DateRange::new(s, e)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn new_rejects_inverted_range() {
        let err = DateRange::new(d(2025, 9, 14), d(2025, 9, 1)).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "end_date", .. }));
    }

    #[test]
    fn ordered_swaps_inverted_input() {
        let r = DateRange::ordered(d(2025, 9, 14), d(2025, 9, 1));
        assert_eq!(r.start(), d(2025, 9, 1));
        assert_eq!(r.end(), d(2025, 9, 14));
    }

    #[test]
    fn overlaps_month_covers_edges() {
        let r = DateRange::ordered(d(2025, 8, 25), d(2025, 9, 1));
        assert!(r.overlaps_month(2025, 8));
        assert!(r.overlaps_month(2025, 9));
        assert!(!r.overlaps_month(2025, 10));
        assert!(DateRange::single_day(d(2025, 12, 31)).overlaps_month(2025, 12));
        assert!(!r.overlaps_month(2025, 13));
    }

    #[test]
    fn optional_range_only_checks_complete_pairs() {
        assert!(check_optional_range(Some(d(2025, 1, 2)), None).is_ok());
        assert!(check_optional_range(Some(d(2025, 1, 2)), Some(d(2025, 1, 1))).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn day() -> impl Strategy<Value = NaiveDate> {
            (0i64..20_000).prop_map(|n| d(2000, 1, 1) + chrono::Duration::days(n))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: `ordered` always yields start <= end and agrees with `new`.
            #[test]
            fn ordered_is_normalized(a in day(), b in day()) {
                let r = DateRange::ordered(a, b);
                prop_assert!(r.start() <= r.end());
                prop_assert_eq!(DateRange::new(r.start(), r.end()).unwrap(), r);
            }

            /// Property: a range overlaps the months of both of its endpoints.
            #[test]
            fn range_overlaps_its_endpoint_months(a in day(), b in day()) {
                let r = DateRange::ordered(a, b);
                prop_assert!(r.overlaps_month(r.start().year(), r.start().month()));
                prop_assert!(r.overlaps_month(r.end().year(), r.end().month()));
            }
        }
    }
}
