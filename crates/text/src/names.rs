//! Proper names lifted out of free text.

use once_cell::sync::Lazy;
use regex::Regex;

static SCHOOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[가-힣A-Za-z]{2,20}대학교").expect("school pattern compiles"));

/// First university name (`...대학교`) mentioned in `text`, suffix included.
pub fn school_name(text: &str) -> Option<&str> {
    SCHOOL.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_first_university() {
        assert_eq!(
            school_name("성신여자대학교 재학생 대상, 서울대학교 제외"),
            Some("성신여자대학교")
        );
        assert_eq!(school_name("대상: Hanyang대학교 학생"), Some("Hanyang대학교"));
    }

    #[test]
    fn short_or_missing_names_do_not_match() {
        assert_eq!(school_name("대학교 축제"), None);
        assert_eq!(school_name("가대학교"), None);
        assert_eq!(school_name("재학생 전원"), None);
        assert_eq!(school_name(""), None);
    }
}
