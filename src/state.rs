//! TUI state: what is on screen, how it is sorted and filtered, and the
//! delta/command types exchanged with the worker thread.

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::Config;
use crate::player_profile::PlayerProfile;
use crate::roster::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Roster,
    Detail,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Name,
    Games,
    WinRate,
    Kda,
}

/// Keyboard focus. In `Search` and `Import` modes, printable keys feed the
/// active text field instead of triggering bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Import,
}

/// The import overlay's two text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportForm {
    pub tournament: String,
    pub year: String,
    pub editing_year: bool,
}

impl ImportForm {
    fn new(config: &Config) -> Self {
        Self {
            tournament: config.default_tournament.clone(),
            year: config.default_year.clone(),
            editing_year: false,
        }
    }

    pub fn active_field_mut(&mut self) -> &mut String {
        if self.editing_year {
            &mut self.year
        } else {
            &mut self.tournament
        }
    }
}

/// Progress of the running (or just-finished) import, drawn as a gauge.
#[derive(Debug, Clone, Default)]
pub struct ImportState {
    pub active: bool,
    pub done: bool,
    pub current: usize,
    pub total: usize,
    pub message: String,
    pub last_updated: Option<Instant>,
}

impl ImportState {
    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::default();
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub sort: SortMode,
    pub input_mode: InputMode,
    pub players: Vec<Player>,
    pub selected: usize,
    pub search: String,
    pub import_form: ImportForm,
    pub import: ImportState,
    pub export_running: bool,
    pub profile: Option<PlayerProfile>,
    pub profile_loading: bool,
    pub profile_for: Option<String>,
    pub connection_ok: Option<bool>,
    pub db_path: String,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            screen: Screen::Roster,
            sort: SortMode::Name,
            input_mode: InputMode::Normal,
            players: Vec::new(),
            selected: 0,
            search: String::new(),
            import_form: ImportForm::new(config),
            import: ImportState::default(),
            export_running: false,
            profile: None,
            profile_loading: false,
            profile_for: None,
            connection_ok: None,
            db_path: config.db_path.display().to_string(),
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn maybe_clear_import(&mut self, now: Instant) {
        self.import.clear_if_done_for(now, 8);
    }

    /// Roster indices matching the search box, in current sort order.
    pub fn filtered_indices(&self) -> Vec<usize> {
        let query = self.search.trim().to_lowercase();
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                if query.is_empty() {
                    return true;
                }
                p.ign.to_lowercase().contains(&query)
                    || p.team.to_lowercase().contains(&query)
                    || p.role.to_lowercase().contains(&query)
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn filtered_players(&self) -> Vec<&Player> {
        self.filtered_indices()
            .into_iter()
            .filter_map(|idx| self.players.get(idx))
            .collect()
    }

    pub fn selected_player(&self) -> Option<&Player> {
        let filtered = self.filtered_indices();
        filtered
            .get(self.selected)
            .and_then(|idx| self.players.get(*idx))
    }

    pub fn select_next(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn cycle_sort(&mut self) {
        self.sort = match self.sort {
            SortMode::Name => SortMode::Games,
            SortMode::Games => SortMode::WinRate,
            SortMode::WinRate => SortMode::Kda,
            SortMode::Kda => SortMode::Name,
        };
        self.sort_players();
    }

    pub fn sort_players(&mut self) {
        self.sort_players_with_selected_ign(None);
    }

    pub fn sort_players_with_selected_ign(&mut self, selected_ign: Option<String>) {
        let selected_ign =
            selected_ign.or_else(|| self.selected_player().map(|p| p.ign.clone()));
        match self.sort {
            SortMode::Name => self
                .players
                .sort_by(|a, b| a.ign.to_lowercase().cmp(&b.ign.to_lowercase())),
            SortMode::Games => self.players.sort_by(|a, b| {
                b.games_played
                    .cmp(&a.games_played)
                    .then_with(|| a.ign.cmp(&b.ign))
            }),
            SortMode::WinRate => self.players.sort_by(|a, b| {
                b.win_rate()
                    .partial_cmp(&a.win_rate())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.ign.cmp(&b.ign))
            }),
            SortMode::Kda => self.players.sort_by(|a, b| {
                b.kda()
                    .partial_cmp(&a.kda())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.ign.cmp(&b.ign))
            }),
        }

        if let Some(ign) = selected_ign {
            let filtered = self.filtered_indices();
            if let Some(pos) = filtered.iter().position(|idx| self.players[*idx].ign == ign) {
                self.selected = pos;
                return;
            }
        }
        self.selected = 0;
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetPlayers(Vec<Player>),
    ImportStarted {
        scope: String,
    },
    ImportProgress {
        current: usize,
        total: usize,
        message: String,
    },
    ImportFinished {
        message: String,
        players_imported: usize,
    },
    ImportFailed {
        error: String,
    },
    SetProfile {
        ign: String,
        profile: Option<PlayerProfile>,
    },
    ConnectionTested(bool),
    ExportStarted {
        path: String,
    },
    ExportFinished {
        path: String,
        players: usize,
    },
    ExportFailed {
        error: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    RefreshRoster,
    RunImport { tournament: String, year: String },
    FetchProfile { ign: String },
    TestConnection,
    SeedDemo,
    ExportRoster { path: String },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetPlayers(players) => {
            let selected_ign = state.selected_player().map(|p| p.ign.clone());
            state.players = players;
            state.sort_players_with_selected_ign(selected_ign);
            state.clamp_selection();
        }
        Delta::ImportStarted { scope } => {
            state.import = ImportState {
                active: true,
                done: false,
                current: 0,
                total: 0,
                message: format!("Importing {scope}..."),
                last_updated: Some(Instant::now()),
            };
            state.push_log(format!("[INFO] Import started: {scope}"));
        }
        Delta::ImportProgress {
            current,
            total,
            message,
        } => {
            if state.import.active {
                state.import.current = current;
                state.import.total = total;
                state.import.message = message;
                state.import.last_updated = Some(Instant::now());
            }
        }
        Delta::ImportFinished {
            message,
            players_imported,
        } => {
            state.import.done = true;
            state.import.current = players_imported;
            state.import.total = players_imported;
            state.import.message = message.clone();
            state.import.last_updated = Some(Instant::now());
            state.push_log(format!("[INFO] {message}"));
        }
        Delta::ImportFailed { error } => {
            state.import.done = true;
            state.import.message = error.clone();
            state.import.last_updated = Some(Instant::now());
            state.push_log(format!("[WARN] Import failed: {error}"));
        }
        Delta::SetProfile { ign, profile } => {
            if state.profile_for.as_deref() == Some(ign.as_str()) {
                state.profile_loading = false;
                if profile.is_none() {
                    state.push_log(format!("[INFO] No wiki profile found for {ign}"));
                }
                state.profile = profile;
            }
        }
        Delta::ConnectionTested(ok) => {
            state.connection_ok = Some(ok);
            if ok {
                state.push_log("[INFO] Wiki connection OK");
            } else {
                state.push_log("[WARN] Wiki connection failed (login or probe query)");
            }
        }
        Delta::ExportStarted { path } => {
            state.export_running = true;
            state.push_log(format!("[INFO] Exporting roster to {path}"));
        }
        Delta::ExportFinished { path, players } => {
            state.export_running = false;
            state.push_log(format!("[INFO] Exported {players} players to {path}"));
        }
        Delta::ExportFailed { error } => {
            state.export_running = false;
            state.push_log(format!("[WARN] Export failed: {error}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
