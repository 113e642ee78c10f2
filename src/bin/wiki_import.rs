use std::path::PathBuf;

use anyhow::{Result, anyhow};

use prostats_terminal::config::Config;
use prostats_terminal::import_service;
use prostats_terminal::roster_store;
use prostats_terminal::wiki_client::WikiClient;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut config = Config::from_env();
    if let Some(db) = parse_db_path_arg() {
        config.db_path = db;
    }

    let year = parse_value_arg("--year").unwrap_or_else(|| config.default_year.clone());
    let tournament = if has_flag("--all") {
        String::new()
    } else {
        parse_value_arg("--tournament").unwrap_or_else(|| config.default_tournament.clone())
    };

    let mut client = WikiClient::new(&config);

    if has_flag("--test") {
        println!("Testing connection to {}", config.api_url);
        if client.test_connection() {
            println!("Connection OK (logged in: {})", client.is_logged_in());
            return Ok(());
        }
        return Err(anyhow!("wiki connection failed"));
    }

    if has_flag("--tournaments") {
        let tournaments = client.get_tournaments(&year)?;
        println!("{} tournaments in {year}:", tournaments.len());
        for name in tournaments {
            println!(" - {name}");
        }
        return Ok(());
    }

    let mut conn = roster_store::open_db(&config.db_path)?;
    println!(
        "Importing {} into {}",
        import_service::scope_label(&tournament, &year),
        config.db_path.display()
    );

    let outcome = import_service::run_import(&mut client, &mut conn, &tournament, &year, |p| {
        if p.total > 0 {
            println!("[{}/{}] {}", p.current, p.total, p.message);
        } else {
            println!("{}", p.message);
        }
    })?;

    println!("{}", outcome.describe());
    println!("Rows fetched: {}", outcome.rows_fetched);
    println!("Game records: {}", outcome.records_processed);
    println!("Players upserted: {}", outcome.players_imported);
    println!("Roster size: {}", roster_store::player_count(&conn)?);

    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    parse_value_arg("--db").map(PathBuf::from)
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
