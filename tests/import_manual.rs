use prostats_terminal::roster::ManualEntry;
use prostats_terminal::roster_store::{get_player, init_schema, upsert_totals};
use rusqlite::Connection;

fn memory_db() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory sqlite should open");
    init_schema(&conn).expect("schema should apply");
    conn
}

fn sample_entry() -> ManualEntry {
    ManualEntry {
        ign: "Ruler".to_string(),
        role: "Bot".to_string(),
        team: "JDG".to_string(),
        games_played: 10,
        wins: 7,
        kda: 3.0,
        cs_per_min: 8.5,
        gold_per_min: 420.0,
        dmg_per_min: 650.0,
    }
}

#[test]
fn manual_entry_round_trips_through_the_store() {
    let conn = memory_db();
    let totals = sample_entry().to_totals().expect("entry should convert");
    upsert_totals(&conn, &totals).expect("upsert should succeed");

    let ruler = get_player(&conn, "Ruler")
        .expect("get should succeed")
        .expect("player should exist");
    assert_eq!(ruler.games_played, 10);
    assert_eq!(ruler.wins, 7);
    assert_eq!(ruler.role, "Bot");

    // The stored counters reproduce the rates the user typed in.
    assert_eq!(ruler.win_rate(), 70.0);
    assert!((ruler.kda() - 3.0).abs() < 1e-9);
    assert!((ruler.cs_per_min() - 8.5).abs() < 1e-9);
    assert!((ruler.gold_per_min() - 420.0).abs() < 1e-9);
    assert!((ruler.damage_per_min() - 650.0).abs() < 1e-9);
}

#[test]
fn repeated_reconcile_is_idempotent() {
    let conn = memory_db();
    let totals = sample_entry().to_totals().expect("entry should convert");

    upsert_totals(&conn, &totals).expect("first upsert");
    let first = get_player(&conn, "Ruler").expect("get").expect("exists");

    upsert_totals(&conn, &totals).expect("second upsert");
    let second = get_player(&conn, "Ruler").expect("get").expect("exists");

    assert_eq!(first.id, second.id);
    assert_eq!(first.games_played, second.games_played);
    assert_eq!(first.wins, second.wins);
    assert_eq!(first.kills, second.kills);
    assert_eq!(first.deaths, second.deaths);
    assert_eq!(first.assists, second.assists);
    assert_eq!(first.total_cs, second.total_cs);
    assert_eq!(first.total_minutes, second.total_minutes);
}

#[test]
fn editing_an_entry_rewrites_the_row() {
    let conn = memory_db();
    upsert_totals(&conn, &sample_entry().to_totals().expect("convert")).expect("insert");

    let mut revised = sample_entry();
    revised.games_played = 14;
    revised.wins = 9;
    revised.team = "Gen.G".to_string();
    upsert_totals(&conn, &revised.to_totals().expect("convert")).expect("update");

    let ruler = get_player(&conn, "Ruler").expect("get").expect("exists");
    assert_eq!(ruler.games_played, 14);
    assert_eq!(ruler.wins, 9);
    assert_eq!(ruler.team, "Gen.G");
}

#[test]
fn blank_name_never_reaches_the_store() {
    let entry = ManualEntry {
        ign: "  ".to_string(),
        ..sample_entry()
    };
    assert!(entry.to_totals().is_err());
}
