use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::model::{normalize, ReferenceResult, Registration, Student};
use crate::ranking::{build_result_rank, build_status_rank, RankMap, EMPTY_RANK, UNRANKED};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown sort key: {0}")]
    SortKey(String),
    #[error("unknown sort direction: {0} (expected asc or desc)")]
    SortDirection(String),
    #[error("unknown course sort mode: {0}")]
    CourseSortMode(String),
}

/// A sortable column of the registrations table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    StudentNumber,
    StudentSurname,
    StudentName,
    StudentEmail,
    StudentMajor,
    Result,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::StudentNumber,
        SortKey::StudentSurname,
        SortKey::StudentName,
        SortKey::StudentEmail,
        SortKey::StudentMajor,
        SortKey::Result,
        SortKey::Status,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::StudentNumber => "student.number",
            SortKey::StudentSurname => "student.surname",
            SortKey::StudentName => "student.name",
            SortKey::StudentEmail => "student.email",
            SortKey::StudentMajor => "student.major",
            SortKey::Result => "result",
            SortKey::Status => "status",
        }
    }

    /// The value accessor for this column.
    pub fn accessor(self) -> Accessor {
        match self {
            SortKey::StudentNumber => student_number,
            SortKey::StudentSurname => student_surname,
            SortKey::StudentName => student_name,
            SortKey::StudentEmail => student_email,
            SortKey::StudentMajor => student_major,
            SortKey::Result => result_rank,
            SortKey::Status => status_rank,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseError::SortKey(s.to_string()))
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// What a column contributes to the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortValue {
    Number(i64),
    Text(String),
}

impl SortValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SortValue::Number(n) => serde_json::Value::from(*n),
            SortValue::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

/// Rank tables used by the `result` and `status` columns.
#[derive(Debug, Clone)]
pub struct SortingContext {
    pub result_rank: RankMap<i64>,
    pub status_rank: RankMap<String>,
    /// Normalized result text that means "no grade yet".
    pub empty_token: String,
}

pub const DEFAULT_EMPTY_TOKEN: &str = "<vuoto>";

impl Default for SortingContext {
    fn default() -> Self {
        Self::new::<&str>(&[], None, DEFAULT_EMPTY_TOKEN)
    }
}

impl SortingContext {
    pub fn new<S: AsRef<str>>(
        reference: &[ReferenceResult],
        status_vocabulary: Option<&[S]>,
        empty_token: &str,
    ) -> Self {
        Self {
            result_rank: build_result_rank(reference),
            status_rank: build_status_rank(status_vocabulary),
            empty_token: normalize(empty_token),
        }
    }
}

pub type Accessor = fn(&Registration, &SortingContext) -> SortValue;

fn student_text(r: &Registration, field: impl Fn(&Student) -> Option<&String>) -> SortValue {
    SortValue::Text(
        r.student
            .as_ref()
            .and_then(field)
            .cloned()
            .unwrap_or_default(),
    )
}

fn student_number(r: &Registration, _: &SortingContext) -> SortValue {
    SortValue::Number(r.student_number().unwrap_or(0))
}

fn student_surname(r: &Registration, _: &SortingContext) -> SortValue {
    student_text(r, |s| s.surname.as_ref())
}

fn student_name(r: &Registration, _: &SortingContext) -> SortValue {
    student_text(r, |s| s.name.as_ref())
}

fn student_email(r: &Registration, _: &SortingContext) -> SortValue {
    student_text(r, |s| s.email.as_ref())
}

fn student_major(r: &Registration, _: &SortingContext) -> SortValue {
    SortValue::Text(
        r.student
            .as_ref()
            .and_then(|s| s.major.as_ref())
            .map(|m| m.display_label())
            .unwrap_or_default(),
    )
}

fn result_rank(r: &Registration, ctx: &SortingContext) -> SortValue {
    let Some(result) = r.result.as_ref() else {
        return SortValue::Number(EMPTY_RANK);
    };
    let raw = result.value.as_deref().unwrap_or("").trim();
    if raw.is_empty() || normalize(raw) == ctx.empty_token {
        return SortValue::Number(EMPTY_RANK);
    }
    let rank = result
        .id
        .and_then(|id| ctx.result_rank.get(&id))
        .unwrap_or(UNRANKED);
    SortValue::Number(rank)
}

fn status_rank(r: &Registration, ctx: &SortingContext) -> SortValue {
    let key = normalize(r.status.as_deref().unwrap_or(""));
    if key.is_empty() {
        return SortValue::Number(UNRANKED);
    }
    SortValue::Number(ctx.status_rank.get(key.as_str()).unwrap_or(UNRANKED))
}

pub fn extract_sort_value(r: &Registration, key: SortKey, ctx: &SortingContext) -> SortValue {
    (key.accessor())(r, ctx)
}
