use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{format_description::FormatItem, macros::format_description, Date};

use crate::error::CoreError;

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A user-local calendar day (`YYYY-MM-DD`).
///
/// Entries and goal versions are bucketed by day, never by instant. The day is
/// computed once on the client from the user's calendar and is compared here
/// only by ordering, which matches the lexical order of the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct LocalDate(Date);

impl LocalDate {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn date(&self) -> Date {
        self.0
    }
}

impl FromStr for LocalDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `time` accepts some non-padded forms; the stored key must stay sortable.
        if s.len() != 10 {
            return Err(CoreError::InvalidArgument(format!(
                "invalid date {s:?}; expected YYYY-MM-DD"
            )));
        }
        Date::parse(s, DAY_FORMAT)
            .map(Self)
            .map_err(|_| CoreError::InvalidArgument(format!("invalid date {s:?}; expected YYYY-MM-DD")))
    }
}

impl fmt::Display for LocalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, m, d) = (self.0.year(), u8::from(self.0.month()), self.0.day());
        write!(f, "{y:04}-{m:02}-{d:02}")
    }
}

impl Serialize for LocalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
