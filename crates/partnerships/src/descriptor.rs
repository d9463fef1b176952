use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use allyflow_core::{DomainError, DomainResult, ValueObject};

pub const MAX_KEYWORDS: usize = 5;
pub const MAX_KEYWORD_CHARS: usize = 10;

/// How the proposed partnership period is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodKind {
    Weeks,
    Months,
    Semester,
    Custom,
}

impl PeriodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodKind::Weeks => "WEEKS",
            PeriodKind::Months => "MONTHS",
            PeriodKind::Semester => "SEMESTER",
            PeriodKind::Custom => "CUSTOM",
        }
    }
}

impl FromStr for PeriodKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEEKS" => Ok(PeriodKind::Weeks),
            "MONTHS" => Ok(PeriodKind::Months),
            "SEMESTER" => Ok(PeriodKind::Semester),
            "CUSTOM" => Ok(PeriodKind::Custom),
            _ => Err(DomainError::validation(
                "period_type",
                format!("unknown period type `{}`", s.trim()),
            )),
        }
    }
}

/// Kind of proposing organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgKind {
    StudentCouncil,
    Club,
    Department,
    Store,
    Company,
}

impl OrgKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrgKind::StudentCouncil => "STUDENT_COUNCIL",
            OrgKind::Club => "CLUB",
            OrgKind::Department => "DEPARTMENT",
            OrgKind::Store => "STORE",
            OrgKind::Company => "COMPANY",
        }
    }
}

impl FromStr for OrgKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STUDENT_COUNCIL" => Ok(OrgKind::StudentCouncil),
            "CLUB" => Ok(OrgKind::Club),
            "DEPARTMENT" => Ok(OrgKind::Department),
            "STORE" => Ok(OrgKind::Store),
            "COMPANY" => Ok(OrgKind::Company),
            _ => Err(DomainError::validation(
                "org_type",
                format!("unknown organization type `{}`", s.trim()),
            )),
        }
    }
}

impl core::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::fmt::Display for OrgKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Period type plus its free-text value (e.g. `MONTHS` / "3개월").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDescriptor {
    pub kind: PeriodKind,
    pub value: String,
}

impl ValueObject for PeriodDescriptor {}

impl PeriodDescriptor {
    pub fn new(kind: PeriodKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into().trim().to_string(),
        }
    }
}

/// Organization type plus its free-text name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDescriptor {
    pub kind: OrgKind,
    pub value: String,
}

impl ValueObject for OrganizationDescriptor {}

impl OrganizationDescriptor {
    pub fn new(kind: OrgKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into().trim().to_string(),
        }
    }
}

/// Tone keywords for the inquiry message: at most five, each at most ten
/// characters. Blank entries are dropped and duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keywords(BTreeSet<String>);

impl ValueObject for Keywords {}

impl Keywords {
    pub fn parse<I, S>(raw: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for keyword in raw {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                continue;
            }
            if keyword.chars().count() > MAX_KEYWORD_CHARS {
                return Err(DomainError::validation(
                    "keywords",
                    format!("keyword `{keyword}` exceeds {MAX_KEYWORD_CHARS} characters"),
                ));
            }
            set.insert(keyword.to_string());
        }
        if set.len() > MAX_KEYWORDS {
            return Err(DomainError::validation(
                "keywords",
                format!("at most {MAX_KEYWORDS} keywords are allowed, got {}", set.len()),
            ));
        }
        Ok(Self(set))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-separated rendering used in prompts.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(", ")
    }
}
