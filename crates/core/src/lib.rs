#![warn(clippy::all, missing_docs)]

//! Core logic for the Courtside scoreboard.
//!
//! This crate hosts the game models, the date tabs, the score fetch
//! gateway, the date-keyed cache, and the pure view-model engine used by
//! the terminal UI and any future frontends.

pub mod cache;
pub mod config;
pub mod dates;
pub mod feed;
pub mod gateway;
pub mod models;
pub mod selection;
pub mod view;

pub use cache::GameCache;
pub use config::AppConfig;
pub use dates::{DateKey, DateTab};
pub use feed::{FeedEvent, RefreshKind, Schedule, ScoreFeed};
pub use gateway::{FetchError, ScoreSource, Scoreboard, Source};
pub use models::{Game, GameStatus, Player, TeamLine};
pub use selection::Selection;
pub use view::{ViewBody, ViewModel};
