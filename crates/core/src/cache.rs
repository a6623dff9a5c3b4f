//! Process-lifetime cache of games keyed by date.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Local};

use crate::{dates::DateKey, models::Game};

/// Games grouped by date, merged additively from partial fetches.
#[derive(Debug, Clone, Default)]
pub struct GameCache {
    entries: HashMap<DateKey, Vec<Game>>,
    refreshed_at: HashMap<DateKey, DateTime<Local>>,
}

impl GameCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list of every date present in `partial`; other dates stay untouched.
    pub fn merge(&mut self, partial: BTreeMap<DateKey, Vec<Game>>) {
        self.merge_at(partial, Local::now());
    }

    /// [`GameCache::merge`] with an explicit refresh timestamp.
    pub fn merge_at(&mut self, partial: BTreeMap<DateKey, Vec<Game>>, at: DateTime<Local>) {
        for (date, games) in partial {
            self.refreshed_at.insert(date, at);
            self.entries.insert(date, games);
        }
    }

    /// Games for a date, empty when the date has never been fetched.
    pub fn get(&self, date: &DateKey) -> &[Game] {
        self.entries.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a date has been fetched at least once.
    pub fn contains(&self, date: &DateKey) -> bool {
        self.entries.contains_key(date)
    }

    /// When a date's list was last replaced.
    pub fn refreshed_at(&self, date: &DateKey) -> Option<DateTime<Local>> {
        self.refreshed_at.get(date).copied()
    }

    /// True until some date has been fetched, even if that date had no games.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when at least one cached date holds games.
    pub fn has_games(&self) -> bool {
        self.entries.values().any(|games| !games.is_empty())
    }

    /// Drop every date not in `keep`.
    pub fn retain_dates(&mut self, keep: &[DateKey]) {
        self.entries.retain(|date, _| keep.contains(date));
        self.refreshed_at.retain(|date, _| keep.contains(date));
    }

    /// Number of cached dates, including dates with no games.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Cached dates in calendar order.
    pub fn dates(&self) -> Vec<DateKey> {
        let mut dates: Vec<_> = self.entries.keys().copied().collect();
        dates.sort();
        dates
    }
}
