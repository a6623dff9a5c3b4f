//! The owned scoreboard state and the polling policy around it.
//!
//! [`ScoreFeed`] bundles cache, selection and load phase into the single
//! object the UI loop mutates. Timer ticks and fetch completions arrive as
//! [`FeedEvent`]s from [`schedule`] and are applied on the UI loop.

/// Timer tasks and fetch spawning.
pub mod schedule;

use chrono::{DateTime, Local, NaiveDate};
use tracing::{info, warn};

use crate::{
    cache::GameCache,
    dates::{self, DateKey, DateTab},
    gateway::{dedup_dates, FetchError, Scoreboard},
    selection::Selection,
    view::{self, LoadPhase, RenderContext, ViewModel},
};

pub use schedule::{spawn_fetch, Schedule, ScheduleHandle};

/// Why a fetch was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    /// First fetch at process start.
    Startup,
    /// Periodic refresh of the visible tab and today.
    Active,
    /// Periodic refresh of all three dates.
    Full,
    /// User asked for a refresh.
    Manual,
}

impl RefreshKind {
    /// Whether this refresh requests the whole three-day window, so dates
    /// outside its response can be evicted.
    pub fn covers_window(self) -> bool {
        !matches!(self, RefreshKind::Active)
    }
}

/// Messages delivered to the UI loop.
#[derive(Debug)]
pub enum FeedEvent {
    /// A timer fired; the loop decides which dates to fetch.
    Refresh(RefreshKind),
    /// A fetch finished.
    Fetched {
        /// What triggered the fetch.
        kind: RefreshKind,
        /// Dates that were requested.
        dates: Vec<DateKey>,
        /// Scores or the failure.
        result: Result<Scoreboard, FetchError>,
    },
}

/// Cache, selection and load bookkeeping for the scoreboard.
#[derive(Debug)]
pub struct ScoreFeed {
    cache: GameCache,
    selection: Selection,
    phase: LoadPhase,
    last_error: Option<String>,
    last_success: Option<DateTime<Local>>,
    in_flight: usize,
}

impl Default for ScoreFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreFeed {
    /// Empty state, waiting for the first fetch.
    pub fn new() -> Self {
        Self {
            cache: GameCache::new(),
            selection: Selection::new(),
            phase: LoadPhase::InitialLoading,
            last_error: None,
            last_success: None,
            in_flight: 0,
        }
    }

    /// Cached games.
    pub fn cache(&self) -> &GameCache {
        &self.cache
    }

    /// Tab and expansion state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Current load phase.
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Message of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Time of the most recent successful fetch.
    pub fn last_success(&self) -> Option<DateTime<Local>> {
        self.last_success
    }

    /// Fetches started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Dates a refresh of the given kind should request, deduplicated.
    pub fn dates_for(&self, kind: RefreshKind, today: NaiveDate) -> Vec<DateKey> {
        match kind {
            RefreshKind::Startup | RefreshKind::Full | RefreshKind::Manual => {
                dates::window(today).to_vec()
            }
            RefreshKind::Active => dedup_dates([
                self.selection.active_tab().date_from(today),
                DateTab::Today.date_from(today),
            ]),
        }
    }

    /// Record that a fetch has been spawned.
    pub fn begin_fetch(&mut self) {
        self.in_flight += 1;
    }

    /// Apply a completed fetch. Any completion ends the initial loading phase.
    pub fn apply(&mut self, kind: RefreshKind, result: Result<Scoreboard, FetchError>) {
        self.apply_at(kind, result, Local::now());
    }

    /// [`ScoreFeed::apply`] with an explicit completion time.
    pub fn apply_at(
        &mut self,
        kind: RefreshKind,
        result: Result<Scoreboard, FetchError>,
        at: DateTime<Local>,
    ) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.phase = LoadPhase::Loaded;
        match result {
            Ok(board) => {
                let games: usize = board.values().map(Vec::len).sum();
                info!(?kind, dates = board.len(), games, "scores merged");
                let covered: Vec<DateKey> = board.keys().copied().collect();
                self.cache.merge_at(board, at);
                if kind.covers_window() {
                    self.cache.retain_dates(&covered);
                }
                self.last_error = None;
                self.last_success = Some(at);
            }
            Err(err) => {
                warn!(?kind, %err, "score fetch failed");
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Switch the visible tab. Never triggers a fetch.
    pub fn select_tab(&mut self, tab: DateTab) -> bool {
        self.selection.select_tab(tab)
    }

    /// Flip a game's detail panel. Never triggers a fetch.
    pub fn toggle(&mut self, game_id: &str) -> bool {
        self.selection.toggle(game_id)
    }

    /// Build the view model for the active tab.
    pub fn view(&self, today: NaiveDate) -> ViewModel {
        let tab = self.selection.active_tab();
        let date = tab.date_from(today);
        let failure = if self.cache.is_empty() {
            self.last_error.as_deref()
        } else {
            None
        };
        view::render(
            tab,
            self.cache.get(&date),
            &self.selection,
            RenderContext {
                date,
                phase: self.phase,
                failure,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Game, GameStatus, TeamLine},
        view::ViewBody,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn key(value: &str) -> DateKey {
        value.parse().unwrap()
    }

    fn game(id: &str, status: GameStatus) -> Game {
        Game {
            game_id: id.to_string(),
            status,
            status_text: String::new(),
            broadcaster: None,
            home_team: TeamLine::default(),
            away_team: TeamLine::default(),
            period: None,
            game_time_utc: None,
        }
    }

    fn board(entries: Vec<(&str, Vec<Game>)>) -> Scoreboard {
        entries
            .into_iter()
            .map(|(date, games)| (key(date), games))
            .collect()
    }

    fn failure() -> FetchError {
        FetchError::Malformed("not json".to_string())
    }

    #[test]
    fn startup_and_full_cover_three_days() {
        let feed = ScoreFeed::new();
        let expected = vec![key("2024-03-14"), key("2024-03-15"), key("2024-03-16")];
        assert_eq!(feed.dates_for(RefreshKind::Startup, today()), expected);
        assert_eq!(feed.dates_for(RefreshKind::Full, today()), expected);
    }

    #[test]
    fn active_refresh_dedups_today() {
        let mut feed = ScoreFeed::new();
        assert_eq!(
            feed.dates_for(RefreshKind::Active, today()),
            vec![key("2024-03-15")]
        );
        feed.select_tab(DateTab::Yesterday);
        assert_eq!(
            feed.dates_for(RefreshKind::Active, today()),
            vec![key("2024-03-14"), key("2024-03-15")]
        );
    }

    #[test]
    fn merge_of_today_keeps_yesterday() {
        let mut feed = ScoreFeed::new();
        feed.apply(
            RefreshKind::Startup,
            Ok(board(vec![("2024-03-14", vec![game("b", GameStatus::Finished)])])),
        );
        feed.apply(
            RefreshKind::Active,
            Ok(board(vec![("2024-03-15", vec![game("a", GameStatus::Live)])])),
        );

        assert_eq!(feed.cache().get(&key("2024-03-14"))[0].game_id, "b");
        assert_eq!(feed.cache().get(&key("2024-03-15"))[0].game_id, "a");
    }

    #[test]
    fn failure_ends_loading_and_shows_message_only_without_data() {
        let mut feed = ScoreFeed::new();
        assert_eq!(feed.view(today()).body, ViewBody::Loading);

        feed.begin_fetch();
        feed.apply(RefreshKind::Startup, Err(failure()));
        assert_eq!(feed.phase(), LoadPhase::Loaded);
        assert_eq!(feed.in_flight(), 0);
        assert!(matches!(feed.view(today()).body, ViewBody::Failed { .. }));

        feed.apply(
            RefreshKind::Full,
            Ok(board(vec![("2024-03-14", vec![game("b", GameStatus::Finished)])])),
        );
        assert!(feed.last_error().is_none());
        feed.apply(RefreshKind::Active, Err(failure()));
        // Stale data elsewhere in the cache suppresses the failure message.
        assert!(matches!(feed.view(today()).body, ViewBody::Empty { .. }));
        feed.select_tab(DateTab::Yesterday);
        assert!(matches!(feed.view(today()).body, ViewBody::Sections(_)));
    }

    #[test]
    fn empty_result_stays_empty_after_a_failed_refresh() {
        let mut feed = ScoreFeed::new();
        feed.apply(
            RefreshKind::Startup,
            Ok(board(vec![
                ("2024-03-14", Vec::new()),
                ("2024-03-15", Vec::new()),
                ("2024-03-16", Vec::new()),
            ])),
        );
        let before = feed.view(today());
        assert!(matches!(before.body, ViewBody::Empty { .. }));

        feed.apply(RefreshKind::Active, Err(failure()));
        assert!(feed.last_error().is_some());
        assert_eq!(feed.view(today()), before);
    }

    #[test]
    fn window_refresh_evicts_dates_that_rolled_off() {
        let mut feed = ScoreFeed::new();
        feed.apply(
            RefreshKind::Startup,
            Ok(board(vec![
                ("2024-03-13", vec![game("old", GameStatus::Finished)]),
                ("2024-03-14", Vec::new()),
            ])),
        );
        feed.apply(
            RefreshKind::Active,
            Ok(board(vec![("2024-03-15", vec![game("a", GameStatus::Live)])])),
        );
        assert_eq!(feed.cache().len(), 3);

        feed.apply(
            RefreshKind::Full,
            Ok(board(vec![
                ("2024-03-14", Vec::new()),
                ("2024-03-15", vec![game("a", GameStatus::Live)]),
                ("2024-03-16", Vec::new()),
            ])),
        );
        assert_eq!(
            feed.cache().dates(),
            vec![key("2024-03-14"), key("2024-03-15"), key("2024-03-16")]
        );
    }

    #[test]
    fn toggle_survives_overlapping_merges() {
        let mut feed = ScoreFeed::new();
        let games = vec![game("x", GameStatus::Live), game("y", GameStatus::Finished)];
        feed.apply(RefreshKind::Startup, Ok(board(vec![("2024-03-15", games.clone())])));

        feed.apply(RefreshKind::Active, Ok(board(vec![("2024-03-15", games.clone())])));
        feed.toggle("y");
        feed.apply(
            RefreshKind::Full,
            Ok(board(vec![
                ("2024-03-14", Vec::new()),
                ("2024-03-15", games),
                ("2024-03-16", Vec::new()),
            ])),
        );

        let view = feed.view(today());
        let expanded: Vec<(&str, bool)> = view
            .rows()
            .map(|row| (row.game_id.as_str(), row.expanded))
            .collect();
        assert_eq!(expanded, vec![("x", false), ("y", true)]);
    }

    #[test]
    fn tab_switch_changes_slice_without_touching_cache() {
        let mut feed = ScoreFeed::new();
        feed.apply(
            RefreshKind::Startup,
            Ok(board(vec![
                ("2024-03-15", vec![game("t", GameStatus::Upcoming)]),
                ("2024-03-16", Vec::new()),
            ])),
        );
        feed.select_tab(DateTab::Tomorrow);
        let view = feed.view(today());
        assert_eq!(view.date, key("2024-03-16"));
        match view.body {
            ViewBody::Empty { message } => assert!(message.contains("tomorrow")),
            other => panic!("unexpected body {other:?}"),
        }
        assert_eq!(feed.cache().len(), 2);
    }
}
