//! Roster-level statistics for the dashboard: headline numbers, role and
//! team distributions, per-role averages, and leaderboards.

use std::collections::HashMap;

use crate::roster::Player;

/// Players with fewer games than this stay off the leaderboards.
pub const MIN_GAMES_FOR_RANKING: u32 = 5;
pub const LEADERBOARD_SIZE: usize = 10;

const ROLE_ORDER: [&str; 5] = ["Top", "Jungle", "Mid", "Bot", "Support"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterSummary {
    pub total_players: usize,
    pub total_games: u64,
    pub avg_win_rate: f64,
    pub avg_kda: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleAverages {
    pub role: String,
    pub players: usize,
    pub avg_win_rate: f64,
    pub avg_kda: f64,
    pub avg_cs_per_min: f64,
}

/// Headline numbers. Averages are per player, unweighted by games, so a
/// ten-game rookie counts as much as a veteran.
pub fn summarize(players: &[Player]) -> RosterSummary {
    RosterSummary {
        total_players: players.len(),
        total_games: players.iter().map(|p| u64::from(p.games_played)).sum(),
        avg_win_rate: mean(players.iter().map(Player::win_rate)),
        avg_kda: mean(players.iter().map(Player::kda)),
    }
}

/// Player counts per role, largest bucket first. Blank roles land in
/// "Unknown".
pub fn role_distribution(players: &[Player]) -> Vec<(String, usize)> {
    distribution(players, |p| &p.role)
}

pub fn team_distribution(players: &[Player]) -> Vec<(String, usize)> {
    distribution(players, |p| &p.team)
}

/// Per-role averages, in lane order (Top through Support, then anything
/// else alphabetically).
pub fn role_averages(players: &[Player]) -> Vec<RoleAverages> {
    let mut by_role: HashMap<&str, Vec<&Player>> = HashMap::new();
    for player in players {
        by_role.entry(bucket(&player.role)).or_default().push(player);
    }

    let mut rows: Vec<RoleAverages> = by_role
        .into_iter()
        .map(|(role, members)| RoleAverages {
            role: role.to_string(),
            players: members.len(),
            avg_win_rate: mean(members.iter().map(|p| p.win_rate())),
            avg_kda: mean(members.iter().map(|p| p.kda())),
            avg_cs_per_min: mean(members.iter().map(|p| p.cs_per_min())),
        })
        .collect();
    rows.sort_by(|a, b| {
        role_rank(&a.role)
            .cmp(&role_rank(&b.role))
            .then_with(|| a.role.cmp(&b.role))
    });
    rows
}

pub fn top_by_win_rate(players: &[Player], limit: usize, min_games: u32) -> Vec<&Player> {
    top_by(players, limit, min_games, Player::win_rate)
}

pub fn top_by_kda(players: &[Player], limit: usize, min_games: u32) -> Vec<&Player> {
    top_by(players, limit, min_games, Player::kda)
}

fn top_by(
    players: &[Player],
    limit: usize,
    min_games: u32,
    metric: impl Fn(&Player) -> f64,
) -> Vec<&Player> {
    let mut ranked: Vec<&Player> = players
        .iter()
        .filter(|p| p.games_played >= min_games)
        .collect();
    ranked.sort_by(|a, b| {
        metric(b)
            .partial_cmp(&metric(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.ign.cmp(&b.ign))
    });
    ranked.truncate(limit);
    ranked
}

fn distribution<'a>(
    players: &'a [Player],
    key: impl Fn(&'a Player) -> &'a str,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for player in players {
        *counts.entry(bucket(key(player))).or_insert(0) += 1;
    }
    let mut rows: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

fn bucket(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() { "Unknown" } else { value }
}

fn role_rank(role: &str) -> usize {
    ROLE_ORDER
        .iter()
        .position(|r| r.eq_ignore_ascii_case(role))
        .unwrap_or(ROLE_ORDER.len())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(ign: &str, role: &str, team: &str, games: u32, wins: u32, kda_pair: (u32, u32)) -> Player {
        Player {
            ign: ign.to_string(),
            role: role.to_string(),
            team: team.to_string(),
            games_played: games,
            wins,
            kills: kda_pair.0,
            deaths: kda_pair.1,
            assists: 0,
            total_minutes: f64::from(games) * 30.0,
            ..Player::default()
        }
    }

    #[test]
    fn empty_roster_summarizes_to_zeros() {
        let summary = summarize(&[]);
        assert_eq!(summary, RosterSummary::default());
        assert!(role_distribution(&[]).is_empty());
        assert!(role_averages(&[]).is_empty());
    }

    #[test]
    fn summary_averages_are_per_player() {
        let players = vec![
            player("A", "Mid", "T1", 10, 10, (20, 10)),
            player("B", "Top", "GEN", 10, 0, (40, 10)),
        ];
        let summary = summarize(&players);
        assert_eq!(summary.total_players, 2);
        assert_eq!(summary.total_games, 20);
        assert_eq!(summary.avg_win_rate, 50.0);
        assert_eq!(summary.avg_kda, 3.0);
    }

    #[test]
    fn distributions_bucket_blanks_as_unknown() {
        let players = vec![
            player("A", "Mid", "", 1, 0, (0, 0)),
            player("B", "Mid", "T1", 1, 0, (0, 0)),
            player("C", " ", "T1", 1, 0, (0, 0)),
        ];
        assert_eq!(
            role_distribution(&players),
            vec![("Mid".to_string(), 2), ("Unknown".to_string(), 1)]
        );
        assert_eq!(
            team_distribution(&players),
            vec![("T1".to_string(), 2), ("Unknown".to_string(), 1)]
        );
    }

    #[test]
    fn leaderboards_respect_floor_and_limit() {
        let players = vec![
            player("Starter", "Mid", "T1", 20, 15, (50, 10)),
            player("Sub", "Mid", "T1", 2, 2, (20, 1)),
            player("Grinder", "Top", "GEN", 30, 12, (30, 30)),
        ];
        let top = top_by_win_rate(&players, 10, MIN_GAMES_FOR_RANKING);
        let names: Vec<&str> = top.iter().map(|p| p.ign.as_str()).collect();
        // The two-game sub is filtered despite a perfect record.
        assert_eq!(names, vec!["Starter", "Grinder"]);

        let only_one = top_by_kda(&players, 1, MIN_GAMES_FOR_RANKING);
        assert_eq!(only_one.len(), 1);
        assert_eq!(only_one[0].ign, "Starter");
    }

    #[test]
    fn role_averages_follow_lane_order() {
        let players = vec![
            player("S", "Support", "T1", 4, 2, (4, 4)),
            player("T", "Top", "T1", 4, 2, (8, 4)),
            player("Coach", "", "T1", 0, 0, (0, 0)),
        ];
        let rows = role_averages(&players);
        let roles: Vec<&str> = rows.iter().map(|r| r.role.as_str()).collect();
        assert_eq!(roles, vec!["Top", "Support", "Unknown"]);
        assert_eq!(rows[0].avg_kda, 2.0);
        assert_eq!(rows[0].players, 1);
    }
}
