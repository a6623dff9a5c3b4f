//! Date keys and the yesterday/today/tomorrow tab mapping.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

static DATE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid date key regex"));

/// Canonical `YYYY-MM-DD` local calendar date used to key fetches and the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a calendar date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Error returned when a string is not a canonical date key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date key {0:?}, expected YYYY-MM-DD")]
pub struct InvalidDateKey(pub String);

impl FromStr for DateKey {
    type Err = InvalidDateKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if !DATE_KEY_RE.is_match(value) {
            return Err(InvalidDateKey(value.to_string()));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| InvalidDateKey(value.to_string()))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The three date tabs the scoreboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateTab {
    /// The day before today.
    Yesterday,
    /// Today's local date.
    #[default]
    Today,
    /// The day after today.
    Tomorrow,
}

impl DateTab {
    /// All tabs in display order.
    pub const ALL: [DateTab; 3] = [DateTab::Yesterday, DateTab::Today, DateTab::Tomorrow];

    /// Title-case tab label.
    pub fn label(self) -> &'static str {
        match self {
            DateTab::Yesterday => "Yesterday",
            DateTab::Today => "Today",
            DateTab::Tomorrow => "Tomorrow",
        }
    }

    /// Lowercase form used inside sentences ("no games scheduled today").
    pub fn phrase(self) -> &'static str {
        match self {
            DateTab::Yesterday => "yesterday",
            DateTab::Today => "today",
            DateTab::Tomorrow => "tomorrow",
        }
    }

    /// Position within [`DateTab::ALL`].
    pub fn index(self) -> usize {
        match self {
            DateTab::Yesterday => 0,
            DateTab::Today => 1,
            DateTab::Tomorrow => 2,
        }
    }

    /// Next tab, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous tab, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Date key for this tab relative to the given local calendar day.
    pub fn date_from(self, today: NaiveDate) -> DateKey {
        let date = match self {
            DateTab::Yesterday => today.checked_sub_days(Days::new(1)),
            DateTab::Today => Some(today),
            DateTab::Tomorrow => today.checked_add_days(Days::new(1)),
        };
        DateKey(date.unwrap_or(today))
    }
}

/// Resolve a tab to its date key using `now`'s calendar date in its own zone.
pub fn resolve<Tz: TimeZone>(tab: DateTab, now: &DateTime<Tz>) -> DateKey {
    tab.date_from(now.date_naive())
}

/// Yesterday, today and tomorrow relative to `today`, in tab order.
pub fn window(today: NaiveDate) -> [DateKey; 3] {
    DateTab::ALL.map(|tab| tab.date_from(today))
}
