use std::path::{Path, PathBuf};

use tracing::debug;

use super::{dedup_dates, parse_scoreboard, FetchError, ScoreSource, Scoreboard};
use crate::dates::DateKey;

/// Serves scores from a JSON file in the scraper's output format.
///
/// The file is re-read on every fetch so it can be edited while the app runs.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    /// Source backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Fixture location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreSource for FixtureSource {
    async fn fetch(&self, dates: &[DateKey]) -> Result<Scoreboard, FetchError> {
        let dates = dedup_dates(dates.iter().copied());
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FetchError::Fixture {
                path: self.path.clone(),
                source,
            })?;
        let board = parse_scoreboard(&raw, &dates)?;
        debug!(path = %self.path.display(), dates = board.len(), "served fixture scores");
        Ok(board)
    }
}
