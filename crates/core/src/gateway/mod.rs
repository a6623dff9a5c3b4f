//! Score fetching across the process boundary.
//!
//! A [`ScoreSource`] turns a set of [`DateKey`]s into a [`Scoreboard`]. The
//! production source spawns the external scraper; the fixture source replays
//! a JSON file with the same shape.

/// Local JSON file source.
pub mod fixture;
/// Subprocess-backed source.
pub mod script;

use std::{
    collections::BTreeMap, future::Future, io, path::PathBuf, process::ExitStatus, time::Duration,
};

use serde_json::Value;
use tracing::{debug, warn};

use crate::{config::FetchConfig, dates::DateKey, models::Game};

pub use fixture::FixtureSource;
pub use script::ScriptGateway;

/// Games per date, as returned by one fetch.
pub type Scoreboard = BTreeMap<DateKey, Vec<Game>>;

/// Any failure of a single fetch attempt. Callers treat every variant alike.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The scraper could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        /// Executable that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
    /// Reading the scraper's output failed.
    #[error("failed to read scraper output: {0}")]
    Io(#[from] io::Error),
    /// The scraper exited unsuccessfully.
    #[error("scraper exited with {status}: {stderr}")]
    Exit {
        /// Exit status reported by the OS.
        status: ExitStatus,
        /// Captured (bounded) standard error.
        stderr: String,
    },
    /// The scraper wrote more than the configured limit.
    #[error("scraper output exceeded {limit} bytes")]
    OutputTooLarge {
        /// Configured limit.
        limit: usize,
    },
    /// Output was not the expected JSON shape.
    #[error("malformed score payload: {0}")]
    Malformed(String),
    /// The scraper reported its own failure as `{"error": ...}`.
    #[error("scraper reported an error: {0}")]
    Reported(String),
    /// The scraper did not finish in time and was killed.
    #[error("scraper timed out after {0:?}")]
    TimedOut(Duration),
    /// The fixture file could not be read.
    #[error("failed to read fixture {}: {source}", path.display())]
    Fixture {
        /// Fixture location.
        path: PathBuf,
        /// Underlying read error.
        #[source]
        source: io::Error,
    },
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Something that can produce games for a set of dates.
pub trait ScoreSource: Send + Sync + 'static {
    /// Fetch every requested date in one attempt.
    fn fetch(
        &self,
        dates: &[DateKey],
    ) -> impl Future<Output = Result<Scoreboard, FetchError>> + Send;
}

/// Source selected from configuration.
pub enum Source {
    /// External scraper process.
    Script(ScriptGateway),
    /// Local JSON file.
    Fixture(FixtureSource),
}

impl Source {
    /// Fixture when one is configured, otherwise the scraper.
    pub fn from_config(config: &FetchConfig) -> Self {
        match &config.fixture {
            Some(path) => Source::Fixture(FixtureSource::new(path.clone())),
            None => Source::Script(ScriptGateway::from_config(config)),
        }
    }

    /// Short description for status lines and logs.
    pub fn describe(&self) -> String {
        match self {
            Source::Script(gateway) => format!("scraper {}", gateway.program()),
            Source::Fixture(fixture) => format!("fixture {}", fixture.path().display()),
        }
    }
}

impl ScoreSource for Source {
    async fn fetch(&self, dates: &[DateKey]) -> Result<Scoreboard, FetchError> {
        match self {
            Source::Script(gateway) => gateway.fetch(dates).await,
            Source::Fixture(fixture) => fixture.fetch(dates).await,
        }
    }
}

/// Collapse duplicate keys, keeping the first occurrence's position.
pub fn dedup_dates(dates: impl IntoIterator<Item = DateKey>) -> Vec<DateKey> {
    let mut unique = Vec::new();
    for date in dates {
        if !unique.contains(&date) {
            unique.push(date);
        }
    }
    unique
}

/// Decode scraper output for the given request.
///
/// Accepts `{"YYYY-MM-DD": [game, ...], ...}`, an `{"error": "..."}` report,
/// or a bare array of games when exactly one date was requested. Requested
/// dates missing from the payload come back as empty lists; unrequested
/// dates are dropped.
pub fn parse_scoreboard(raw: &[u8], requested: &[DateKey]) -> Result<Scoreboard, FetchError> {
    let value: Value = serde_json::from_slice(raw)?;
    let mut board = Scoreboard::new();

    match value {
        Value::Object(map) => {
            if let Some(message) = map.get("error") {
                let message = match message {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                return Err(FetchError::Reported(message));
            }
            for (key, games) in map {
                let date = match key.parse::<DateKey>() {
                    Ok(date) => date,
                    Err(err) => {
                        warn!(%err, "skipping unexpected key in score payload");
                        continue;
                    }
                };
                if !requested.contains(&date) {
                    debug!(%date, "ignoring unrequested date in score payload");
                    continue;
                }
                let games: Vec<Game> = serde_json::from_value(games)
                    .map_err(|err| FetchError::Malformed(format!("{date}: {err}")))?;
                board.insert(date, dedup_games(date, games));
            }
        }
        Value::Array(_) => match requested {
            [date] => {
                let games: Vec<Game> = serde_json::from_value(value)?;
                board.insert(*date, dedup_games(*date, games));
            }
            _ => {
                return Err(FetchError::Malformed(format!(
                    "undated game list for a request of {} dates",
                    requested.len()
                )))
            }
        },
        other => {
            return Err(FetchError::Malformed(format!(
                "expected an object keyed by date, got {}",
                json_kind(&other)
            )))
        }
    }

    for date in requested {
        board.entry(*date).or_default();
    }
    Ok(board)
}

fn dedup_games(date: DateKey, games: Vec<Game>) -> Vec<Game> {
    let mut unique: Vec<Game> = Vec::with_capacity(games.len());
    for game in games {
        if unique.iter().any(|seen| seen.game_id == game.game_id) {
            warn!(%date, game_id = %game.game_id, "dropping duplicate game id");
            continue;
        }
        unique.push(game);
    }
    unique
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> DateKey {
        value.parse().unwrap()
    }

    const GAME: &str = r#"{"gameId":"g1","status":3,"statusText":"Final","homeTeam":{"teamTricode":"BOS","score":110},"awayTeam":{"teamTricode":"MIA","score":99}}"#;

    #[test]
    fn parses_date_keyed_payload_and_fills_missing_dates() {
        let raw = format!(r#"{{"2024-03-15":[{GAME}]}}"#);
        let requested = [key("2024-03-15"), key("2024-03-16")];
        let board = parse_scoreboard(raw.as_bytes(), &requested).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[&key("2024-03-15")][0].game_id, "g1");
        assert!(board[&key("2024-03-16")].is_empty());
    }

    #[test]
    fn drops_dates_that_were_not_requested() {
        let raw = format!(r#"{{"1999-01-01":[{GAME}],"2024-03-15":[]}}"#);
        let board = parse_scoreboard(raw.as_bytes(), &[key("2024-03-15")]).unwrap();
        assert_eq!(board.keys().copied().collect::<Vec<_>>(), vec![key("2024-03-15")]);
    }

    #[test]
    fn reported_error_is_a_fetch_error() {
        let err = parse_scoreboard(br#"{"error":"rate limited"}"#, &[key("2024-03-15")])
            .unwrap_err();
        assert!(matches!(err, FetchError::Reported(ref msg) if msg == "rate limited"));
    }

    #[test]
    fn bare_array_needs_a_single_requested_date() {
        let raw = format!("[{GAME}]");
        let board = parse_scoreboard(raw.as_bytes(), &[key("2024-03-15")]).unwrap();
        assert_eq!(board[&key("2024-03-15")].len(), 1);

        let err = parse_scoreboard(raw.as_bytes(), &[key("2024-03-15"), key("2024-03-16")])
            .unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn rejects_non_json_and_bad_games() {
        assert!(matches!(
            parse_scoreboard(b"Traceback (most recent call last)", &[key("2024-03-15")]),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(
            parse_scoreboard(br#"{"2024-03-15":[{"status":2}]}"#, &[key("2024-03-15")]),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(
            parse_scoreboard(b"42", &[key("2024-03-15")]),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn skips_invalid_keys_and_duplicate_ids() {
        let raw = format!(r#"{{"meta":[],"2024-03-15":[{GAME},{GAME}]}}"#);
        let board = parse_scoreboard(raw.as_bytes(), &[key("2024-03-15")]).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[&key("2024-03-15")].len(), 1);
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let dates = dedup_dates([key("2024-03-16"), key("2024-03-15"), key("2024-03-16")]);
        assert_eq!(dates, vec![key("2024-03-16"), key("2024-03-15")]);
    }
}
