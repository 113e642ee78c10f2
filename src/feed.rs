//! Worker thread behind the TUI. Owns the wiki session and the database
//! connection and runs one command at a time; the UI thread never blocks on
//! the network or on SQLite.

use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config::Config;
use crate::demo;
use crate::export;
use crate::import_service::{self, ImportProgress};
use crate::player_profile;
use crate::roster_store;
use crate::state::{Delta, ProviderCommand};
use crate::wiki_client::WikiClient;

pub fn spawn_provider(config: Config, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut client = WikiClient::new(&config);
        let mut conn = match roster_store::open_db(&config.db_path) {
            Ok(conn) => conn,
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] failed to open database: {err}")));
                return;
            }
        };

        send_roster(&conn, &tx);

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::RefreshRoster => send_roster(&conn, &tx),
                ProviderCommand::RunImport { tournament, year } => {
                    run_import(&mut client, &mut conn, &tournament, &year, &tx);
                }
                ProviderCommand::FetchProfile { ign } => {
                    fetch_profile(&mut client, &ign, &tx);
                }
                ProviderCommand::TestConnection => {
                    let ok = client.test_connection();
                    let _ = tx.send(Delta::ConnectionTested(ok));
                }
                ProviderCommand::SeedDemo => {
                    seed_demo(&mut conn, &tx);
                }
                ProviderCommand::ExportRoster { path } => {
                    export_roster(&conn, &path, &tx);
                }
            }
        }
    });
}

fn send_roster(conn: &Connection, tx: &Sender<Delta>) {
    match roster_store::load_players(conn) {
        Ok(players) => {
            let _ = tx.send(Delta::SetPlayers(players));
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] failed to load roster: {err}")));
        }
    }
}

fn run_import(
    client: &mut WikiClient,
    conn: &mut Connection,
    tournament: &str,
    year: &str,
    tx: &Sender<Delta>,
) {
    let scope = import_service::scope_label(tournament, year);
    let _ = tx.send(Delta::ImportStarted {
        scope: scope.clone(),
    });

    let progress_tx = tx.clone();
    let result = import_service::run_import(
        client,
        conn,
        tournament,
        year,
        |progress: ImportProgress| {
            let _ = progress_tx.send(Delta::ImportProgress {
                current: progress.current,
                total: progress.total,
                message: progress.message,
            });
        },
    );

    match result {
        Ok(outcome) => {
            let _ = tx.send(Delta::ImportFinished {
                message: outcome.describe(),
                players_imported: outcome.players_imported,
            });
            send_roster(conn, tx);
        }
        Err(err) => {
            let _ = tx.send(Delta::ImportFailed {
                error: format!("{err:#}"),
            });
        }
    }
}

fn fetch_profile(client: &mut WikiClient, ign: &str, tx: &Sender<Delta>) {
    match player_profile::get_player_info(client, ign) {
        Ok(profile) => {
            let _ = tx.send(Delta::SetProfile {
                ign: ign.to_string(),
                profile,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!(
                "[WARN] profile lookup for {ign} failed: {err}"
            )));
            let _ = tx.send(Delta::SetProfile {
                ign: ign.to_string(),
                profile: None,
            });
        }
    }
}

fn seed_demo(conn: &mut Connection, tx: &Sender<Delta>) {
    match demo::seed_demo_roster(conn) {
        Ok(count) => {
            let _ = tx.send(Delta::Log(format!("[INFO] Seeded {count} demo players")));
            send_roster(conn, tx);
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] demo seed failed: {err}")));
        }
    }
}

fn export_roster(conn: &Connection, path: &str, tx: &Sender<Delta>) {
    let _ = tx.send(Delta::ExportStarted {
        path: path.to_string(),
    });
    match try_export(conn, path) {
        Ok(players) => {
            let _ = tx.send(Delta::ExportFinished {
                path: path.to_string(),
                players,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::ExportFailed {
                error: format!("{err:#}"),
            });
        }
    }
}

fn try_export(conn: &Connection, path: &str) -> Result<usize> {
    let players = roster_store::load_players(conn).context("load roster for export")?;
    export::write_roster_workbook(&players, Path::new(path))?;
    Ok(players.len())
}
