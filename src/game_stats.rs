//! Scoreboard rows: fetch, normalize into typed game records, aggregate
//! into per-player totals.

use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::Value;

use crate::query_filter::scope_filter;
use crate::wiki_client::{CargoQuery, WikiClient};

const SCOREBOARD_TABLES: &str = "ScoreboardPlayers=SP,ScoreboardGames=SG";
const SCOREBOARD_FIELDS: &str = "SP.Link,SP.Role,SP.Team,SP.Champion,SP.Kills,SP.Deaths,\
     SP.Assists,SP.Gold,SP.CS,SP.DamageToChampions,SP.PlayerWin,SP.GameId,SG.Gamelength_Number";
const SCOREBOARD_JOIN: &str = "SP.GameId=SG.GameId";
const SCOREBOARD_ORDER: &str = "SP.DateTime_UTC DESC";

/// Assumed length for games whose duration the wiki left blank.
const DEFAULT_GAME_MINUTES: f64 = 30.0;

/// One player's line from one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub player: String,
    pub role: String,
    pub team: String,
    pub champion: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub gold: u64,
    pub cs: u32,
    pub damage: u64,
    pub won: bool,
    pub game_id: String,
    pub game_length_minutes: f64,
}

/// Accumulated career line for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTotals {
    pub ign: String,
    pub role: String,
    pub team: String,
    pub games_played: u32,
    pub wins: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub total_gold: u64,
    pub total_cs: u64,
    pub total_damage: u64,
    pub total_minutes: f64,
}

impl PlayerTotals {
    pub fn new(ign: impl Into<String>) -> Self {
        Self {
            ign: ign.into(),
            role: String::new(),
            team: String::new(),
            games_played: 0,
            wins: 0,
            kills: 0,
            deaths: 0,
            assists: 0,
            total_gold: 0,
            total_cs: 0,
            total_damage: 0,
            total_minutes: 0.0,
        }
    }
}

/// Fetch every scoreboard row for a tournament scope and normalize it.
/// `on_progress` receives the running raw row count per fetched page.
pub fn fetch_player_game_stats(
    client: &mut WikiClient,
    tournament: &str,
    year: &str,
    on_progress: impl FnMut(usize),
) -> Result<Vec<GameRecord>> {
    let mut query = CargoQuery::new(SCOREBOARD_TABLES, SCOREBOARD_FIELDS);
    query.where_expr = Some(scope_filter(tournament, year));
    query.join_on = Some(SCOREBOARD_JOIN.to_string());
    query.order_by = Some(SCOREBOARD_ORDER.to_string());
    let rows = client.cargo_query_all(&query, on_progress)?;
    Ok(records_from_rows(&rows))
}

/// Normalize raw Cargo rows, dropping the ones with no player identity.
pub fn records_from_rows(rows: &[Value]) -> Vec<GameRecord> {
    rows.iter().filter_map(record_from_row).collect()
}

/// Normalize one Cargo row. `None` only when the `Link` cell is missing or
/// blank; malformed stat cells degrade to zero instead of rejecting the row.
pub fn record_from_row(row: &Value) -> Option<GameRecord> {
    let player = text_field(row, "Link").trim();
    if player.is_empty() {
        return None;
    }
    Some(GameRecord {
        player: player.to_string(),
        role: text_field(row, "Role").to_string(),
        team: text_field(row, "Team").to_string(),
        champion: text_field(row, "Champion").to_string(),
        kills: count_field(row, "Kills"),
        deaths: count_field(row, "Deaths"),
        assists: count_field(row, "Assists"),
        gold: sum_field(row, "Gold"),
        cs: count_field(row, "CS"),
        damage: sum_field(row, "DamageToChampions"),
        won: parse_player_win(text_field(row, "PlayerWin")),
        game_id: text_field(row, "GameId").to_string(),
        // Cargo rewrites the underscore in Gamelength_Number to a space in
        // response keys.
        game_length_minutes: number_field(row, "Gamelength Number")
            .unwrap_or(DEFAULT_GAME_MINUTES),
    })
}

/// The wiki stores wins as free-ish text ("Yes", "1", "true").
pub fn parse_player_win(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "yes" | "1" | "true")
}

/// Fold game records into per-player totals, keyed and ordered by IGN.
/// Role and team track the most recently seen non-empty value in row order.
pub fn aggregate_player_stats(records: &[GameRecord]) -> Vec<PlayerTotals> {
    let mut by_player: BTreeMap<&str, PlayerTotals> = BTreeMap::new();
    for record in records {
        let totals = by_player
            .entry(record.player.as_str())
            .or_insert_with(|| PlayerTotals::new(record.player.clone()));
        totals.games_played += 1;
        if record.won {
            totals.wins += 1;
        }
        totals.kills += record.kills;
        totals.deaths += record.deaths;
        totals.assists += record.assists;
        totals.total_gold += record.gold;
        totals.total_cs += u64::from(record.cs);
        totals.total_damage += record.damage;
        totals.total_minutes += record.game_length_minutes;
        if !record.role.is_empty() {
            totals.role = record.role.clone();
        }
        if !record.team.is_empty() {
            totals.team = record.team.clone();
        }
    }
    by_player.into_values().collect()
}

fn text_field<'a>(row: &'a Value, key: &str) -> &'a str {
    row.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

// Cargo serializes every cell as a string; numbers arrive as "7" or "7.0",
// and a few dumps carry real JSON numbers. Accept both.
fn number_field(row: &Value, key: &str) -> Option<f64> {
    let value = row.get(key)?;
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    value.as_str()?.trim().parse().ok()
}

fn count_field(row: &Value, key: &str) -> u32 {
    number_field(row, key)
        .map(|n| n.max(0.0) as u32)
        .unwrap_or(0)
}

fn sum_field(row: &Value, key: &str) -> u64 {
    number_field(row, key)
        .map(|n| n.max(0.0) as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_row() -> Value {
        json!({
            "Link": "Faker",
            "Role": "Mid",
            "Team": "T1",
            "Champion": "Azir",
            "Kills": "4",
            "Deaths": "1",
            "Assists": "7",
            "Gold": "13250",
            "CS": "312",
            "DamageToChampions": "24180",
            "PlayerWin": "Yes",
            "GameId": "LCK/2025/G1",
            "Gamelength Number": "32.5"
        })
    }

    #[test]
    fn normalizes_a_full_row() {
        let record = record_from_row(&sample_row()).unwrap();
        assert_eq!(record.player, "Faker");
        assert_eq!(record.kills, 4);
        assert_eq!(record.gold, 13250);
        assert!(record.won);
        assert_eq!(record.game_length_minutes, 32.5);
    }

    #[test]
    fn drops_rows_without_identity() {
        let mut row = sample_row();
        row["Link"] = json!("   ");
        assert!(record_from_row(&row).is_none());
        row.as_object_mut().unwrap().remove("Link");
        assert!(record_from_row(&row).is_none());
    }

    #[test]
    fn malformed_cells_degrade_to_defaults() {
        let row = json!({
            "Link": "Chovy",
            "Kills": "n/a",
            "Gold": null,
            "PlayerWin": "No",
            "Gamelength Number": ""
        });
        let record = record_from_row(&row).unwrap();
        assert_eq!(record.kills, 0);
        assert_eq!(record.gold, 0);
        assert!(!record.won);
        assert_eq!(record.game_length_minutes, DEFAULT_GAME_MINUTES);
    }

    #[test]
    fn player_win_spellings() {
        assert!(parse_player_win("Yes"));
        assert!(parse_player_win(" 1 "));
        assert!(parse_player_win("TRUE"));
        assert!(!parse_player_win("No"));
        assert!(!parse_player_win(""));
    }

    #[test]
    fn aggregates_across_games() {
        let mut win = record_from_row(&sample_row()).unwrap();
        win.kills = 5;
        win.deaths = 2;
        win.assists = 8;
        win.game_length_minutes = 30.0;
        let mut loss = win.clone();
        loss.won = false;
        loss.kills = 2;
        loss.deaths = 4;
        loss.assists = 7;
        loss.game_length_minutes = 28.0;
        loss.team = String::new();

        let totals = aggregate_player_stats(&[win, loss]);
        assert_eq!(totals.len(), 1);
        let faker = &totals[0];
        assert_eq!(faker.games_played, 2);
        assert_eq!(faker.wins, 1);
        assert_eq!(faker.kills, 7);
        assert_eq!(faker.deaths, 6);
        assert_eq!(faker.assists, 15);
        assert_eq!(faker.total_minutes, 58.0);
        // The blank team cell on the second row must not clear the value.
        assert_eq!(faker.team, "T1");
    }

    #[test]
    fn aggregation_orders_players_by_ign() {
        let rows = vec![
            json!({"Link": "Zeus", "PlayerWin": "Yes"}),
            json!({"Link": "Ambessa", "PlayerWin": "No"}),
        ];
        let totals = aggregate_player_stats(&records_from_rows(&rows));
        let names: Vec<&str> = totals.iter().map(|t| t.ign.as_str()).collect();
        assert_eq!(names, vec!["Ambessa", "Zeus"]);
    }
}
