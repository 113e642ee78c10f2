use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;

use prostats_terminal::config::Config;
use prostats_terminal::demo;
use prostats_terminal::export;
use prostats_terminal::roster::ManualEntry;
use prostats_terminal::roster_store;
use prostats_terminal::summary;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut config = Config::from_env();
    if let Some(db) = parse_db_path_arg() {
        config.db_path = db;
    }

    let mut conn = roster_store::open_db(&config.db_path)?;

    if has_flag("--demo") {
        let count = demo::seed_demo_roster(&mut conn)?;
        println!("Seeded {count} demo players into {}", config.db_path.display());
        return Ok(());
    }

    if has_flag("--add") {
        let entry = manual_entry_from_args()?;
        let totals = entry.to_totals()?;
        roster_store::upsert_totals(&conn, &totals)?;
        println!("Saved {}", totals.ign);
        return Ok(());
    }

    if let Some(ign) = parse_value_arg("--show") {
        return print_player(&conn, &ign);
    }

    if let Some(ign) = parse_value_arg("--remove") {
        if roster_store::delete_player(&conn, &ign)? {
            println!("Removed {ign}");
        } else {
            println!("No player named {ign}");
        }
        return Ok(());
    }

    if has_flag("--clear") {
        let removed = roster_store::clear_players(&conn)?;
        println!("Removed {removed} players");
        return Ok(());
    }

    if let Some(path) = parse_value_arg("--export") {
        let players = roster_store::load_players(&conn)?;
        export::write_roster_workbook(&players, Path::new(&path))?;
        println!("Exported {} players to {path}", players.len());
        return Ok(());
    }

    if has_flag("--summary") {
        return print_summary(&conn);
    }

    print_roster(&conn)
}

fn print_roster(conn: &Connection) -> Result<()> {
    let players = roster_store::load_players(conn)?;
    if players.is_empty() {
        println!("Roster is empty. Run wiki_import or pass --demo to seed sample data.");
        return Ok(());
    }
    println!(
        "{:<16} {:<8} {:<18} {:>5} {:>6} {:>6} {:>6}",
        "Player", "Role", "Team", "Games", "Win%", "KDA", "CS/m"
    );
    for p in &players {
        println!(
            "{:<16} {:<8} {:<18} {:>5} {:>6.1} {:>6.2} {:>6.1}",
            p.ign,
            p.role,
            p.team,
            p.games_played,
            p.win_rate(),
            p.kda(),
            p.cs_per_min()
        );
    }
    println!("{} players", players.len());
    Ok(())
}

fn print_player(conn: &Connection, ign: &str) -> Result<()> {
    let Some(p) = roster_store::get_player(conn, ign)? else {
        println!("No player named {ign}");
        return Ok(());
    };
    let losses = p.games_played.saturating_sub(p.wins);
    println!("{}", p.ign);
    println!(
        "  {} | {}",
        if p.team.is_empty() { "-" } else { &p.team },
        if p.role.is_empty() { "-" } else { &p.role }
    );
    println!(
        "  Games: {} ({} W / {} L) | Win rate: {:.1}%",
        p.games_played,
        p.wins,
        losses,
        p.win_rate()
    );
    println!(
        "  K/D/A: {} / {} / {} | KDA: {:.2}",
        p.kills, p.deaths, p.assists,
        p.kda()
    );
    println!(
        "  Per game: {:.1} kills, {:.1} deaths, {:.1} assists",
        p.avg_kills(),
        p.avg_deaths(),
        p.avg_assists()
    );
    println!(
        "  CS/min: {:.2} | Gold/min: {:.0} | DMG/min: {:.0}",
        p.cs_per_min(),
        p.gold_per_min(),
        p.damage_per_min()
    );
    println!("  Last updated: {}", p.last_updated);
    Ok(())
}

fn print_summary(conn: &Connection) -> Result<()> {
    let players = roster_store::load_players(conn)?;
    let overview = summary::summarize(&players);
    println!(
        "Players: {} | Games: {} | Avg win rate: {:.1}% | Avg KDA: {:.2}",
        overview.total_players, overview.total_games, overview.avg_win_rate, overview.avg_kda
    );

    println!("\nBy role:");
    for row in summary::role_averages(&players) {
        println!(
            "  {:<9} {:>3} players | {:>5.1}% | KDA {:>5.2} | CS/m {:>4.1}",
            row.role, row.players, row.avg_win_rate, row.avg_kda, row.avg_cs_per_min
        );
    }

    println!("\nTop win rate (min {} games):", summary::MIN_GAMES_FOR_RANKING);
    for (i, p) in summary::top_by_win_rate(
        &players,
        summary::LEADERBOARD_SIZE,
        summary::MIN_GAMES_FOR_RANKING,
    )
    .iter()
    .enumerate()
    {
        println!(
            "  {:>2}. {:<16} {:>5.1}% ({} games)",
            i + 1,
            p.ign,
            p.win_rate(),
            p.games_played
        );
    }

    println!("\nTop KDA (min {} games):", summary::MIN_GAMES_FOR_RANKING);
    for (i, p) in summary::top_by_kda(
        &players,
        summary::LEADERBOARD_SIZE,
        summary::MIN_GAMES_FOR_RANKING,
    )
    .iter()
    .enumerate()
    {
        println!(
            "  {:>2}. {:<16} {:>5.2} ({} games)",
            i + 1,
            p.ign,
            p.kda(),
            p.games_played
        );
    }

    Ok(())
}

fn manual_entry_from_args() -> Result<ManualEntry> {
    let ign = parse_value_arg("--ign").context("--add requires --ign")?;
    Ok(ManualEntry {
        ign,
        role: parse_value_arg("--role").unwrap_or_default(),
        team: parse_value_arg("--team").unwrap_or_default(),
        games_played: parse_num_arg("--games").unwrap_or(0),
        wins: parse_num_arg("--wins").unwrap_or(0),
        kda: parse_float_arg("--kda").unwrap_or(0.0),
        cs_per_min: parse_float_arg("--cs").unwrap_or(0.0),
        gold_per_min: parse_float_arg("--gold").unwrap_or(0.0),
        dmg_per_min: parse_float_arg("--dmg").unwrap_or(0.0),
    })
}

fn parse_db_path_arg() -> Option<PathBuf> {
    parse_value_arg("--db").map(PathBuf::from)
}

fn parse_num_arg(name: &str) -> Option<u32> {
    parse_value_arg(name).and_then(|raw| raw.parse().ok())
}

fn parse_float_arg(name: &str) -> Option<f64> {
    parse_value_arg(name).and_then(|raw| raw.parse().ok())
}

fn parse_value_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}
