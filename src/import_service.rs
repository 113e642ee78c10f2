//! End-to-end import: fetch a tournament scope from the wiki, aggregate the
//! rows, and reconcile the totals into the local roster.

use anyhow::Result;
use rusqlite::Connection;

use crate::game_stats::{aggregate_player_stats, fetch_player_game_stats};
use crate::roster_store::upsert_all;
use crate::wiki_client::WikiClient;

/// Progress checkpoint for a long import. `total` is zero while the row
/// count is still unknown (the fetch phase).
#[derive(Debug, Clone)]
pub struct ImportProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

impl ImportProgress {
    fn note(message: impl Into<String>) -> Self {
        Self {
            current: 0,
            total: 0,
            message: message.into(),
        }
    }

    fn step(current: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            message: message.into(),
        }
    }
}

/// What an import actually did. A scope that matched nothing is a normal
/// outcome, not an error; callers distinguish it via `is_empty`.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub tournament: String,
    pub year: String,
    pub rows_fetched: usize,
    pub records_processed: usize,
    pub players_imported: usize,
}

impl ImportOutcome {
    pub fn is_empty(&self) -> bool {
        self.records_processed == 0
    }

    pub fn describe(&self) -> String {
        let scope = scope_label(&self.tournament, &self.year);
        if self.is_empty() {
            format!("No games found for {scope}")
        } else {
            format!(
                "Imported {} players from {} game records ({scope})",
                self.players_imported, self.records_processed
            )
        }
    }
}

pub fn scope_label(tournament: &str, year: &str) -> String {
    let tournament = tournament.trim();
    if tournament.is_empty() {
        format!("all {year} tournaments")
    } else {
        format!("{tournament} {year}")
    }
}

/// Run one import. Failures surface as errors; an empty scope returns a
/// zero outcome. Progress checkpoints cover login, each fetched page,
/// aggregation, and every tenth saved player.
pub fn run_import(
    client: &mut WikiClient,
    conn: &mut Connection,
    tournament: &str,
    year: &str,
    mut on_progress: impl FnMut(ImportProgress),
) -> Result<ImportOutcome> {
    let scope = scope_label(tournament, year);
    on_progress(if client.login() {
        ImportProgress::note("Authenticated wiki session")
    } else {
        ImportProgress::note("Anonymous wiki session (lower rate limits)")
    });

    on_progress(ImportProgress::note(format!(
        "Fetching scoreboard rows for {scope}..."
    )));
    let mut rows_fetched = 0usize;
    let records = fetch_player_game_stats(client, tournament, year, |count| {
        rows_fetched = count;
        on_progress(ImportProgress::step(
            count,
            0,
            format!("Fetched {count} rows..."),
        ));
    })?;

    let mut outcome = ImportOutcome {
        tournament: tournament.trim().to_string(),
        year: year.trim().to_string(),
        rows_fetched,
        records_processed: records.len(),
        players_imported: 0,
    };
    if records.is_empty() {
        return Ok(outcome);
    }

    on_progress(ImportProgress::note(format!(
        "Aggregating {} game records...",
        records.len()
    )));
    let totals = aggregate_player_stats(&records);

    on_progress(ImportProgress::note(format!(
        "Saving {} players...",
        totals.len()
    )));
    outcome.players_imported = upsert_all(conn, &totals, |saved, total| {
        if saved % 10 == 0 || saved == total {
            on_progress(ImportProgress::step(
                saved,
                total,
                format!("Saved {saved}/{total} players"),
            ));
        }
    })?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_is_not_an_error() {
        let outcome = ImportOutcome {
            tournament: "LCK".to_string(),
            year: "2025".to_string(),
            rows_fetched: 0,
            records_processed: 0,
            players_imported: 0,
        };
        assert!(outcome.is_empty());
        assert_eq!(outcome.describe(), "No games found for LCK 2025");
    }

    #[test]
    fn describe_names_the_scope() {
        let outcome = ImportOutcome {
            tournament: "".to_string(),
            year: "2024".to_string(),
            rows_fetched: 950,
            records_processed: 940,
            players_imported: 87,
        };
        assert_eq!(
            outcome.describe(),
            "Imported 87 players from 940 game records (all 2024 tournaments)"
        );
    }
}
