//! SQLite persistence for the roster. One row per player, keyed by IGN;
//! imports overwrite counters rather than merging them.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::game_stats::PlayerTotals;
use crate::roster::Player;

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ign TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT '',
            team TEXT NOT NULL DEFAULT '',
            games_played INTEGER NOT NULL DEFAULT 0,
            wins INTEGER NOT NULL DEFAULT 0,
            kills INTEGER NOT NULL DEFAULT 0,
            deaths INTEGER NOT NULL DEFAULT 0,
            assists INTEGER NOT NULL DEFAULT 0,
            total_gold INTEGER NOT NULL DEFAULT 0,
            total_cs INTEGER NOT NULL DEFAULT 0,
            total_damage INTEGER NOT NULL DEFAULT 0,
            total_minutes REAL NOT NULL DEFAULT 0,
            last_updated TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_players_ign ON players(ign);
        CREATE INDEX IF NOT EXISTS idx_players_role ON players(role);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Insert or overwrite one player's stored line. A re-import replaces every
/// counter with the fresh aggregate; it never adds on top of stale data.
pub fn upsert_totals(conn: &Connection, totals: &PlayerTotals) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
        INSERT INTO players (
            ign, role, team, games_played, wins, kills, deaths, assists,
            total_gold, total_cs, total_damage, total_minutes, last_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        ON CONFLICT(ign) DO UPDATE SET
            role = excluded.role,
            team = excluded.team,
            games_played = excluded.games_played,
            wins = excluded.wins,
            kills = excluded.kills,
            deaths = excluded.deaths,
            assists = excluded.assists,
            total_gold = excluded.total_gold,
            total_cs = excluded.total_cs,
            total_damage = excluded.total_damage,
            total_minutes = excluded.total_minutes,
            last_updated = excluded.last_updated
        "#,
        params![
            totals.ign,
            totals.role,
            totals.team,
            totals.games_played,
            totals.wins,
            totals.kills,
            totals.deaths,
            totals.assists,
            totals.total_gold as i64,
            totals.total_cs as i64,
            totals.total_damage as i64,
            totals.total_minutes,
            now,
        ],
    )
    .with_context(|| format!("upsert player {}", totals.ign))?;
    Ok(())
}

/// Upsert a batch inside one transaction. `on_progress` sees (saved, total)
/// after each row.
pub fn upsert_all(
    conn: &mut Connection,
    totals: &[PlayerTotals],
    mut on_progress: impl FnMut(usize, usize),
) -> Result<usize> {
    let tx = conn.transaction().context("begin save transaction")?;
    for (i, player) in totals.iter().enumerate() {
        upsert_totals(&tx, player)?;
        on_progress(i + 1, totals.len());
    }
    tx.commit().context("commit save transaction")?;
    Ok(totals.len())
}

pub fn load_players(conn: &Connection) -> Result<Vec<Player>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, ign, role, team, games_played, wins, kills, deaths,
                   assists, total_gold, total_cs, total_damage, total_minutes,
                   last_updated
            FROM players
            ORDER BY ign COLLATE NOCASE ASC
            "#,
        )
        .context("prepare load players query")?;

    let rows = stmt
        .query_map([], map_player)
        .context("query load players")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player row")?);
    }
    Ok(out)
}

pub fn get_player(conn: &Connection, ign: &str) -> Result<Option<Player>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, ign, role, team, games_played, wins, kills, deaths,
                   assists, total_gold, total_cs, total_damage, total_minutes,
                   last_updated
            FROM players
            WHERE ign = ?1
            "#,
        )
        .context("prepare get player query")?;

    let mut rows = stmt
        .query_map(params![ign], map_player)
        .context("query get player")?;
    match rows.next() {
        Some(row) => Ok(Some(row.context("decode player row")?)),
        None => Ok(None),
    }
}

pub fn delete_player(conn: &Connection, ign: &str) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM players WHERE ign = ?1", params![ign])
        .with_context(|| format!("delete player {ign}"))?;
    Ok(affected > 0)
}

pub fn clear_players(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM players", [])
        .context("clear players")
}

pub fn player_count(conn: &Connection) -> Result<usize> {
    let count = conn
        .query_row("SELECT COUNT(*) FROM players", [], |row| {
            row.get::<_, i64>(0)
        })
        .context("count players")?;
    Ok(count as usize)
}

fn map_player(row: &rusqlite::Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        ign: row.get(1)?,
        role: row.get(2)?,
        team: row.get(3)?,
        games_played: row.get::<_, u32>(4)?,
        wins: row.get::<_, u32>(5)?,
        kills: row.get::<_, u32>(6)?,
        deaths: row.get::<_, u32>(7)?,
        assists: row.get::<_, u32>(8)?,
        total_gold: row.get::<_, i64>(9)?.max(0) as u64,
        total_cs: row.get::<_, i64>(10)?.max(0) as u64,
        total_damage: row.get::<_, i64>(11)?.max(0) as u64,
        total_minutes: row.get(12)?,
        last_updated: row.get(13)?,
    })
}
