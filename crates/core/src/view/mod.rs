//! Render/reconcile engine: turns cached games plus selection into a view model.
//!
//! Everything here is pure. The TUI draws a [`ViewModel`] and routes user
//! input back through the [`Target`]s it exposes.

pub mod display;

use chrono::Local;

use crate::{
    dates::{DateKey, DateTab},
    models::{Game, GameStatus, Player, TeamLine},
    selection::Selection,
};

pub use display::{normalize_broadcaster, team_logo_url};

/// Status buckets in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Games in progress.
    Live,
    /// Games not started.
    Upcoming,
    /// Completed games.
    Finished,
}

impl Bucket {
    /// Buckets in the order they are shown.
    pub const ORDER: [Bucket; 3] = [Bucket::Live, Bucket::Upcoming, Bucket::Finished];

    /// Section heading.
    pub fn title(self) -> &'static str {
        match self {
            Bucket::Live => "Live Games",
            Bucket::Upcoming => "Upcoming",
            Bucket::Finished => "Finished",
        }
    }

    fn status(self) -> GameStatus {
        match self {
            Bucket::Live => GameStatus::Live,
            Bucket::Upcoming => GameStatus::Upcoming,
            Bucket::Finished => GameStatus::Finished,
        }
    }
}

/// Load state owned by the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// No fetch has completed yet.
    InitialLoading,
    /// At least one fetch has completed, successfully or not.
    Loaded,
}

/// Inputs to [`render`] besides the games themselves.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Date the games belong to.
    pub date: DateKey,
    /// Current load phase.
    pub phase: LoadPhase,
    /// Set only when the cache is entirely empty and the last fetch failed.
    pub failure: Option<&'a str>,
}

/// Everything needed to draw one frame of the scoreboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    /// Active tab.
    pub tab: DateTab,
    /// Date shown by the active tab.
    pub date: DateKey,
    /// Main content.
    pub body: ViewBody,
}

/// Main content area.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    /// First fetch still running and nothing cached for this date.
    Loading,
    /// Nothing cached anywhere and the last fetch failed.
    Failed {
        /// User-facing message.
        message: String,
    },
    /// Loaded, but the date has no games.
    Empty {
        /// User-facing message naming the tab.
        message: String,
    },
    /// Non-empty buckets in display order.
    Sections(Vec<Section>),
}

/// One status bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Which bucket this is.
    pub bucket: Bucket,
    /// Rows in feed order.
    pub rows: Vec<GameRow>,
}

/// A single game row.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub game_id: String,
    pub status: GameStatus,
    pub status_text: String,
    /// Local tip-off time for upcoming games, when known.
    pub tip_off: Option<String>,
    /// Normalized network name.
    pub broadcaster: String,
    pub away: TeamRow,
    pub home: TeamRow,
    /// Only live and finished rows can be expanded.
    pub expandable: bool,
    pub expanded: bool,
}

/// One side of a game row.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRow {
    pub tricode: String,
    pub score: String,
    pub logo_url: String,
    /// Populated only when the row is expanded.
    pub leaders: Vec<LeaderRow>,
}

/// Expanded per-player stats.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderRow {
    pub name: String,
    pub position: String,
    pub stats: String,
}

/// What a row-level input refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Row that toggles its detail panel.
    Expandable,
    /// Row without detail.
    Static,
}

/// Entry of the input dispatch table, in display order.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub role: Role,
    pub game_id: String,
}

impl ViewModel {
    /// All game rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &GameRow> {
        let sections: &[Section] = match &self.body {
            ViewBody::Sections(sections) => sections,
            _ => &[],
        };
        sections.iter().flat_map(|section| section.rows.iter())
    }

    /// Dispatch table keyed by (role, game id), one entry per row.
    pub fn targets(&self) -> Vec<Target> {
        self.rows()
            .map(|row| Target {
                role: if row.expandable {
                    Role::Expandable
                } else {
                    Role::Static
                },
                game_id: row.game_id.clone(),
            })
            .collect()
    }
}

/// Stable partition into (live, upcoming, finished) by exact status.
pub fn partition(games: &[Game]) -> [Vec<&Game>; 3] {
    Bucket::ORDER.map(|bucket| {
        games
            .iter()
            .filter(|game| game.status == bucket.status())
            .collect()
    })
}

/// Build the view model for one date's games.
pub fn render(
    tab: DateTab,
    games: &[Game],
    selection: &Selection,
    context: RenderContext<'_>,
) -> ViewModel {
    let body = if games.is_empty() {
        empty_body(tab, context)
    } else {
        let sections = Bucket::ORDER
            .into_iter()
            .zip(partition(games))
            .filter(|(_, games)| !games.is_empty())
            .map(|(bucket, games)| Section {
                bucket,
                rows: games
                    .into_iter()
                    .map(|game| game_row(game, selection))
                    .collect(),
            })
            .collect();
        ViewBody::Sections(sections)
    };

    ViewModel {
        tab,
        date: context.date,
        body,
    }
}

fn empty_body(tab: DateTab, context: RenderContext<'_>) -> ViewBody {
    match (context.phase, context.failure) {
        (LoadPhase::InitialLoading, _) => ViewBody::Loading,
        (LoadPhase::Loaded, Some(reason)) => ViewBody::Failed {
            message: format!("Unable to load scores: {reason}"),
        },
        (LoadPhase::Loaded, None) => ViewBody::Empty {
            message: format!("No games scheduled {} ({})", tab.phrase(), context.date),
        },
    }
}

fn game_row(game: &Game, selection: &Selection) -> GameRow {
    let expandable = game.status.has_box_score();
    let expanded = expandable && selection.is_expanded(&game.game_id);
    let tip_off = match game.status {
        GameStatus::Upcoming => game
            .game_time_utc
            .map(|at| at.with_timezone(&Local).format("%H:%M").to_string()),
        _ => None,
    };

    GameRow {
        game_id: game.game_id.clone(),
        status: game.status,
        status_text: game.status_text.clone(),
        tip_off,
        broadcaster: normalize_broadcaster(game.broadcaster.as_deref()),
        away: team_row(&game.away_team, game.status, expanded),
        home: team_row(&game.home_team, game.status, expanded),
        expandable,
        expanded,
    }
}

fn team_row(team: &TeamLine, status: GameStatus, expanded: bool) -> TeamRow {
    let leaders = if expanded {
        team.leaders.iter().map(leader_row).collect()
    } else {
        Vec::new()
    };
    TeamRow {
        tricode: display::team_label(team),
        score: display::score_label(team, status),
        logo_url: team_logo_url(team.team_tricode.as_deref()),
        leaders,
    }
}

fn leader_row(player: &Player) -> LeaderRow {
    LeaderRow {
        name: player.display_name().to_string(),
        position: player.position.clone().unwrap_or_default(),
        stats: display::stat_line(player),
    }
}
