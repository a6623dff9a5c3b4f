//! Shared domain models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle of a game as reported by the score collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameStatus {
    /// Scheduled, not yet tipped off.
    Upcoming,
    /// In progress.
    Live,
    /// Final.
    Finished,
}

impl GameStatus {
    /// Whether games in this state carry player stats worth expanding.
    pub fn has_box_score(self) -> bool {
        matches!(self, GameStatus::Live | GameStatus::Finished)
    }
}

impl TryFrom<u8> for GameStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GameStatus::Upcoming),
            2 => Ok(GameStatus::Live),
            3 => Ok(GameStatus::Finished),
            other => Err(format!("unknown game status {other}")),
        }
    }
}

impl From<GameStatus> for u8 {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Upcoming => 1,
            GameStatus::Live => 2,
            GameStatus::Finished => 3,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameStatus::Upcoming => "upcoming",
            GameStatus::Live => "live",
            GameStatus::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// A single game as returned by the score collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Opaque identifier, stable across fetches of the same date.
    pub game_id: String,
    /// Coarse game state.
    pub status: GameStatus,
    /// Clock/period, scheduled time or "Final".
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_text: String,
    /// Raw network name; normalized for display only.
    #[serde(default)]
    pub broadcaster: Option<String>,
    /// Home side.
    pub home_team: TeamLine,
    /// Away side.
    pub away_team: TeamLine,
    /// Current period, when the feed provides it.
    #[serde(default)]
    pub period: Option<u8>,
    /// Scheduled tip-off.
    #[serde(default, rename = "gameTimeUTC")]
    pub game_time_utc: Option<DateTime<Utc>>,
}

/// One team's line in a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLine {
    /// Three-letter team code, e.g. `BOS`.
    #[serde(default)]
    pub team_tricode: Option<String>,
    /// Points scored; absent before tip-off.
    #[serde(default)]
    pub score: Option<u32>,
    /// Top performers for this side.
    #[serde(default, deserialize_with = "null_as_default")]
    pub leaders: Vec<Player>,
}

/// Top performer stat line.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub name: Option<String>,
    /// Abbreviated form, e.g. `L. James`.
    #[serde(default, rename = "nameI")]
    pub name_i: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub rebounds: Option<u32>,
    #[serde(default)]
    pub assists: Option<u32>,
}

impl Player {
    /// Short display name, falling back to the full name.
    pub fn display_name(&self) -> &str {
        self.name_i
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .or(self.name.as_deref())
            .unwrap_or("Unknown")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_scraper_payload_with_nulls() {
        let raw = json!({
            "gameId": "0022300061",
            "status": 2,
            "statusText": "Q3 5:12",
            "broadcaster": null,
            "homeTeam": { "teamTricode": "LAL", "score": 77, "leaders": null },
            "awayTeam": {
                "teamTricode": null,
                "leaders": [{ "nameI": "S. Curry", "points": 31 }]
            },
            "period": 3,
            "gameTimeUTC": "2024-03-15T23:30:00Z"
        });

        let game: Game = serde_json::from_value(raw).expect("payload should decode");
        assert_eq!(game.status, GameStatus::Live);
        assert_eq!(game.status_text, "Q3 5:12");
        assert!(game.broadcaster.is_none());
        assert!(game.home_team.leaders.is_empty());
        assert_eq!(game.away_team.team_tricode, None);
        assert_eq!(game.away_team.score, None);
        assert_eq!(game.away_team.leaders[0].display_name(), "S. Curry");
        assert_eq!(game.away_team.leaders[0].rebounds, None);
        assert_eq!(game.period, Some(3));
        assert!(game.game_time_utc.is_some());
    }

    #[test]
    fn rejects_unknown_status() {
        let raw = json!({
            "gameId": "1",
            "status": 7,
            "homeTeam": {},
            "awayTeam": {}
        });
        assert!(serde_json::from_value::<Game>(raw).is_err());
    }

    #[test]
    fn player_name_falls_back_to_full_name() {
        let player = Player {
            name: Some("Nikola Jokic".to_string()),
            name_i: Some(" ".to_string()),
            ..Player::default()
        };
        assert_eq!(player.display_name(), "Nikola Jokic");
        assert_eq!(Player::default().display_name(), "Unknown");
    }
}
