//! Pure display transforms applied while building the view model.

use crate::models::{GameStatus, Player, TeamLine};

/// Networks recognised in raw broadcaster strings, matched in this order.
const NETWORKS: [&str; 6] = ["ESPN", "ABC", "TNT", "Prime Video", "NBC", "Peacock"];
const LEAGUE_PASS: &str = "League Pass";

const LOGO_BASE_URL: &str = "https://a.espncdn.com/i/teamlogos/nba/500";
/// Shown when a team has no tricode yet (e.g. unresolved playoff slots).
pub const PLACEHOLDER_LOGO_URL: &str =
    "https://a.espncdn.com/i/teamlogos/default-team-logo-500.png";

/// Display name for a raw broadcaster value.
pub fn normalize_broadcaster(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return LEAGUE_PASS.to_string(),
    };
    let upper = raw.to_uppercase();
    if upper.contains("LEAGUE PASS") {
        return LEAGUE_PASS.to_string();
    }
    NETWORKS
        .iter()
        .find(|network| upper.contains(&network.to_uppercase()))
        .map(|network| network.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Logo image URL for a team tricode.
pub fn team_logo_url(tricode: Option<&str>) -> String {
    let Some(tricode) = tricode.map(str::trim).filter(|code| !code.is_empty()) else {
        return PLACEHOLDER_LOGO_URL.to_string();
    };
    let slug = match tricode.to_uppercase().as_str() {
        "UTA" => "utah".to_string(),
        "NOP" => "no".to_string(),
        _ => tricode.to_lowercase(),
    };
    format!("{LOGO_BASE_URL}/{slug}.png")
}

/// Tricode to show, or `TBD` when absent.
pub fn team_label(team: &TeamLine) -> String {
    team.team_tricode
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .unwrap_or("TBD")
        .to_string()
}

/// Score column text. Upcoming games without a score show a dash.
pub fn score_label(team: &TeamLine, status: GameStatus) -> String {
    match (team.score, status) {
        (Some(score), _) => score.to_string(),
        (None, GameStatus::Upcoming) => "-".to_string(),
        (None, _) => "0".to_string(),
    }
}

/// `PTS/REB/AST` line for a leader, missing numbers shown as zero.
pub fn stat_line(player: &Player) -> String {
    format!(
        "{} PTS  {} REB  {} AST",
        player.points.unwrap_or(0),
        player.rebounds.unwrap_or(0),
        player.assists.unwrap_or(0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcaster_matches_known_networks() {
        assert_eq!(normalize_broadcaster(Some("ESPN2")), "ESPN");
        assert_eq!(normalize_broadcaster(Some("espn deportes")), "ESPN");
        assert_eq!(normalize_broadcaster(Some("TNT/truTV")), "TNT");
        assert_eq!(normalize_broadcaster(Some("Amazon PRIME VIDEO")), "Prime Video");
        assert_eq!(normalize_broadcaster(Some("NBCSN")), "NBC");
    }

    #[test]
    fn broadcaster_first_match_wins() {
        assert_eq!(normalize_broadcaster(Some("ABC/ESPN")), "ESPN");
    }

    #[test]
    fn broadcaster_league_pass_and_fallbacks() {
        assert_eq!(normalize_broadcaster(Some("League Pass")), "League Pass");
        assert_eq!(normalize_broadcaster(Some("NBA LEAGUE PASS")), "League Pass");
        assert_eq!(normalize_broadcaster(None), "League Pass");
        assert_eq!(normalize_broadcaster(Some("  ")), "League Pass");
        assert_eq!(normalize_broadcaster(Some("FOX")), "FOX");
    }

    #[test]
    fn logo_urls_use_lowercase_tricodes_with_overrides() {
        assert_eq!(
            team_logo_url(Some("BOS")),
            "https://a.espncdn.com/i/teamlogos/nba/500/bos.png"
        );
        assert_eq!(
            team_logo_url(Some("UTA")),
            "https://a.espncdn.com/i/teamlogos/nba/500/utah.png"
        );
        assert_eq!(
            team_logo_url(Some("NOP")),
            "https://a.espncdn.com/i/teamlogos/nba/500/no.png"
        );
        assert_eq!(team_logo_url(None), PLACEHOLDER_LOGO_URL);
        assert_eq!(team_logo_url(Some("")), PLACEHOLDER_LOGO_URL);
    }

    #[test]
    fn scores_and_stats_default_to_zero() {
        let team = TeamLine::default();
        assert_eq!(score_label(&team, GameStatus::Upcoming), "-");
        assert_eq!(score_label(&team, GameStatus::Live), "0");
        assert_eq!(team_label(&team), "TBD");
        let player = Player {
            points: Some(30),
            ..Player::default()
        };
        assert_eq!(stat_line(&player), "30 PTS  0 REB  0 AST");
    }
}
