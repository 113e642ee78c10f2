//! Roster export to an Excel workbook.

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::roster::Player;
use crate::summary;

/// Write the roster to `path` as a two-sheet workbook: one row per player
/// with derived rates, plus a summary sheet with roster-wide numbers.
pub fn write_roster_workbook(players: &[Player], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Roster")?;
        write_rows(sheet, &roster_rows(players))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows(players))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn roster_rows(players: &[Player]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Player".to_string(),
        "Role".to_string(),
        "Team".to_string(),
        "Games".to_string(),
        "Wins".to_string(),
        "Win Rate %".to_string(),
        "KDA".to_string(),
        "Avg Kills".to_string(),
        "Avg Deaths".to_string(),
        "Avg Assists".to_string(),
        "CS/Min".to_string(),
        "Gold/Min".to_string(),
        "DMG/Min".to_string(),
        "Minutes".to_string(),
        "Last Updated".to_string(),
    ]];
    rows.extend(players.iter().map(player_row));
    rows
}

fn player_row(player: &Player) -> Vec<String> {
    vec![
        player.ign.clone(),
        player.role.clone(),
        player.team.clone(),
        player.games_played.to_string(),
        player.wins.to_string(),
        format!("{:.1}", player.win_rate()),
        format!("{:.2}", player.kda()),
        format!("{:.1}", player.avg_kills()),
        format!("{:.1}", player.avg_deaths()),
        format!("{:.1}", player.avg_assists()),
        format!("{:.1}", player.cs_per_min()),
        format!("{:.0}", player.gold_per_min()),
        format!("{:.0}", player.damage_per_min()),
        format!("{:.0}", player.total_minutes),
        player.last_updated.clone(),
    ]
}

fn summary_rows(players: &[Player]) -> Vec<Vec<String>> {
    let overview = summary::summarize(players);
    let mut rows = vec![
        vec!["Players".to_string(), overview.total_players.to_string()],
        vec!["Total games".to_string(), overview.total_games.to_string()],
        vec![
            "Avg win rate %".to_string(),
            format!("{:.1}", overview.avg_win_rate),
        ],
        vec!["Avg KDA".to_string(), format!("{:.2}", overview.avg_kda)],
        Vec::new(),
        vec![
            "Role".to_string(),
            "Players".to_string(),
            "Win Rate %".to_string(),
            "KDA".to_string(),
            "CS/Min".to_string(),
        ],
    ];
    for role in summary::role_averages(players) {
        rows.push(vec![
            role.role.clone(),
            role.players.to_string(),
            format!("{:.1}", role.avg_win_rate),
            format!("{:.2}", role.avg_kda),
            format!("{:.1}", role.avg_cs_per_min),
        ]);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
