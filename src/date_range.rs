//! Symbolic date ranges ("today", "last 7 days", ...) and membership tests.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Duration, OffsetDateTime, Time, macros::time};

use crate::Error;

/// A date range preset offered in the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateRangeToken {
    /// No date filtering.
    #[default]
    All,
    /// From the start to the end of the current day.
    Today,
    /// The last 7 days up to now.
    Last7Days,
    /// The last 30 days up to now.
    Last30Days,
    /// The last 90 days up to now.
    Last90Days,
}

impl DateRangeToken {
    /// Every preset, in the order they are offered to the user.
    pub const ALL: [DateRangeToken; 5] = [
        DateRangeToken::All,
        DateRangeToken::Today,
        DateRangeToken::Last7Days,
        DateRangeToken::Last30Days,
        DateRangeToken::Last90Days,
    ];

    /// The token used in query parameters, e.g. `"last7days"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Last7Days => "last7days",
            Self::Last30Days => "last30days",
            Self::Last90Days => "last90days",
        }
    }

    /// The human readable name shown in the selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Time",
            Self::Today => "Today",
            Self::Last7Days => "Last 7 Days",
            Self::Last30Days => "Last 30 Days",
            Self::Last90Days => "Last 90 Days",
        }
    }

    /// Parse a token, treating anything unrecognized as [DateRangeToken::All].
    pub fn parse_lenient(token: &str) -> Self {
        token.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown date range \"{token}\", showing all dates");
            Self::All
        })
    }

    fn days_back(self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::All | Self::Today => None,
        }
    }
}

impl FromStr for DateRangeToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRangeToken::ALL
            .into_iter()
            .find(|token| token.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownDateRange(s.to_owned()))
    }
}

impl Display for DateRangeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for DateRangeToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DateRangeToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        Ok(DateRangeToken::parse_lenient(&token))
    }
}

/// An inclusive interval between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstantRange {
    /// The earliest instant in the range.
    pub start: OffsetDateTime,
    /// The latest instant in the range.
    pub end: OffsetDateTime,
}

impl InstantRange {
    /// Whether `instant` lies within the range, including both ends.
    pub fn includes(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Whether the start of `date`, in the range's UTC offset, lies within the range.
    pub fn includes_date(&self, date: Date) -> bool {
        self.includes(date.midnight().assume_offset(self.start.offset()))
    }
}

/// Resolve `token` into concrete instants relative to `now`.
///
/// Returns `None` for [DateRangeToken::All], meaning no date filtering.
pub fn range_for(token: DateRangeToken, now: OffsetDateTime) -> Option<InstantRange> {
    match token {
        DateRangeToken::All => None,
        DateRangeToken::Today => Some(InstantRange {
            start: now.replace_time(Time::MIDNIGHT),
            end: now.replace_time(time!(23:59:59.999)),
        }),
        token => token.days_back().map(|days| InstantRange {
            start: now - Duration::days(days),
            end: now,
        }),
    }
}
