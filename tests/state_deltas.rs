use std::path::PathBuf;
use std::time::{Duration, Instant};

use prostats_terminal::config::Config;
use prostats_terminal::player_profile::PlayerProfile;
use prostats_terminal::roster::Player;
use prostats_terminal::state::{AppState, Delta, SortMode, apply_delta};

fn test_config() -> Config {
    Config {
        api_url: "https://example.test/api.php".to_string(),
        user_agent: "test-agent".to_string(),
        bot_username: String::new(),
        bot_password: String::new(),
        request_delay: Duration::from_millis(100),
        page_limit: 500,
        max_retries: 3,
        db_path: PathBuf::from("test.sqlite"),
        default_tournament: "LCK".to_string(),
        default_year: "2025".to_string(),
    }
}

fn player(ign: &str, team: &str, games: u32, wins: u32) -> Player {
    Player {
        ign: ign.to_string(),
        role: "Mid".to_string(),
        team: team.to_string(),
        games_played: games,
        wins,
        kills: games * 4,
        deaths: games * 2,
        assists: games * 6,
        total_minutes: f64::from(games) * 30.0,
        ..Player::default()
    }
}

#[test]
fn set_players_keeps_selection_on_the_same_player() {
    let config = test_config();
    let mut state = AppState::new(&config);
    apply_delta(
        &mut state,
        Delta::SetPlayers(vec![
            player("Chovy", "Gen.G", 20, 14),
            player("Faker", "T1", 18, 12),
            player("Zeus", "T1", 18, 12),
        ]),
    );

    state.select_next();
    assert_eq!(state.selected_player().map(|p| p.ign.as_str()), Some("Faker"));

    apply_delta(
        &mut state,
        Delta::SetPlayers(vec![
            player("Caps", "G2 Esports", 16, 9),
            player("Faker", "T1", 19, 13),
            player("Chovy", "Gen.G", 21, 15),
        ]),
    );

    assert_eq!(state.selected_player().map(|p| p.ign.as_str()), Some("Faker"));
}

#[test]
fn set_players_resets_selection_when_the_player_disappears() {
    let config = test_config();
    let mut state = AppState::new(&config);
    apply_delta(
        &mut state,
        Delta::SetPlayers(vec![
            player("Chovy", "Gen.G", 20, 14),
            player("Faker", "T1", 18, 12),
        ]),
    );
    state.select_next();

    apply_delta(
        &mut state,
        Delta::SetPlayers(vec![player("Zeus", "T1", 18, 12)]),
    );

    assert_eq!(state.selected, 0);
    assert_eq!(state.selected_player().map(|p| p.ign.as_str()), Some("Zeus"));
}

#[test]
fn import_lifecycle_updates_progress_then_clears() {
    let config = test_config();
    let mut state = AppState::new(&config);

    apply_delta(
        &mut state,
        Delta::ImportStarted {
            scope: "LCK 2025".to_string(),
        },
    );
    assert!(state.import.active);
    assert!(!state.import.done);

    apply_delta(
        &mut state,
        Delta::ImportProgress {
            current: 40,
            total: 120,
            message: "Saved 40/120 players".to_string(),
        },
    );
    assert_eq!(state.import.current, 40);
    assert_eq!(state.import.total, 120);

    apply_delta(
        &mut state,
        Delta::ImportFinished {
            message: "Imported 120 players from 900 game records (LCK 2025)".to_string(),
            players_imported: 120,
        },
    );
    assert!(state.import.done);
    assert_eq!(state.import.current, 120);
    assert!(
        state
            .logs
            .back()
            .is_some_and(|line| line.starts_with("[INFO]"))
    );

    // Still visible right away, cleared once the hold window passes.
    state.import.clear_if_done_for(Instant::now(), 8);
    assert!(state.import.active);
    state
        .import
        .clear_if_done_for(Instant::now() + Duration::from_secs(9), 8);
    assert!(!state.import.active);
}

#[test]
fn import_failure_logs_a_warning() {
    let config = test_config();
    let mut state = AppState::new(&config);

    apply_delta(
        &mut state,
        Delta::ImportStarted {
            scope: "LEC 2025".to_string(),
        },
    );
    apply_delta(
        &mut state,
        Delta::ImportFailed {
            error: "cargo query failed after 5 attempts".to_string(),
        },
    );

    assert!(state.import.done);
    assert!(
        state
            .logs
            .back()
            .is_some_and(|line| line.starts_with("[WARN]"))
    );
}

#[test]
fn stale_profile_responses_are_dropped() {
    let config = test_config();
    let mut state = AppState::new(&config);
    state.profile_for = Some("Faker".to_string());
    state.profile_loading = true;

    let stale = PlayerProfile {
        player: "Chovy".to_string(),
        ..PlayerProfile::default()
    };
    apply_delta(
        &mut state,
        Delta::SetProfile {
            ign: "Chovy".to_string(),
            profile: Some(stale),
        },
    );
    assert!(state.profile.is_none());
    assert!(state.profile_loading);

    let fresh = PlayerProfile {
        player: "Faker".to_string(),
        real_name: "Lee Sang-hyeok".to_string(),
        ..PlayerProfile::default()
    };
    apply_delta(
        &mut state,
        Delta::SetProfile {
            ign: "Faker".to_string(),
            profile: Some(fresh),
        },
    );
    assert!(!state.profile_loading);
    assert_eq!(
        state.profile.as_ref().map(|p| p.real_name.as_str()),
        Some("Lee Sang-hyeok")
    );
}

#[test]
fn log_buffer_is_capped() {
    let config = test_config();
    let mut state = AppState::new(&config);
    for i in 0..230 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 30"));
}

#[test]
fn search_matches_ign_team_and_role() {
    let config = test_config();
    let mut state = AppState::new(&config);
    apply_delta(
        &mut state,
        Delta::SetPlayers(vec![
            player("Faker", "T1", 18, 12),
            player("Chovy", "Gen.G", 20, 14),
            player("Caps", "G2 Esports", 16, 9),
        ]),
    );

    state.search = "t1".to_string();
    let hits = state.filtered_players();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].ign, "Faker");

    state.search = "mid".to_string();
    assert_eq!(state.filtered_players().len(), 3);

    state.search = "nobody".to_string();
    assert!(state.filtered_players().is_empty());
}

#[test]
fn sort_modes_reorder_the_roster() {
    let config = test_config();
    let mut state = AppState::new(&config);
    apply_delta(
        &mut state,
        Delta::SetPlayers(vec![
            player("Faker", "T1", 18, 14),
            player("Chovy", "Gen.G", 25, 15),
            player("Caps", "G2 Esports", 16, 6),
        ]),
    );

    // Default sort is by name.
    assert_eq!(state.players[0].ign, "Caps");

    state.sort = SortMode::Games;
    state.sort_players();
    assert_eq!(state.players[0].ign, "Chovy");

    state.sort = SortMode::WinRate;
    state.sort_players();
    assert_eq!(state.players[0].ign, "Faker");
}

#[test]
fn export_and_connection_deltas_update_flags() {
    let config = test_config();
    let mut state = AppState::new(&config);

    apply_delta(
        &mut state,
        Delta::ExportStarted {
            path: "roster.xlsx".to_string(),
        },
    );
    assert!(state.export_running);

    apply_delta(
        &mut state,
        Delta::ExportFinished {
            path: "roster.xlsx".to_string(),
            players: 25,
        },
    );
    assert!(!state.export_running);

    apply_delta(&mut state, Delta::ConnectionTested(true));
    assert_eq!(state.connection_ok, Some(true));
}
