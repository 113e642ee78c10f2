use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use prostats_terminal::config::Config;
use prostats_terminal::feed;
use prostats_terminal::roster::Player;
use prostats_terminal::state::{self, apply_delta, AppState, InputMode, Screen, SortMode};
use prostats_terminal::summary;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<state::ProviderCommand>>,
}

impl App {
    fn new(config: &Config, cmd_tx: Option<mpsc::Sender<state::ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match self.state.input_mode {
            InputMode::Search => self.on_search_key(key),
            InputMode::Import => self.on_import_key(key),
            InputMode::Normal => self.on_normal_key(key),
        }
    }

    fn on_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Roster,
            KeyCode::Char('2') => self.state.screen = Screen::Dashboard,
            KeyCode::Char('d') | KeyCode::Enter => self.open_detail(),
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Roster,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('s') => self.state.cycle_sort(),
            KeyCode::Char('/') => {
                self.state.screen = Screen::Roster;
                self.state.input_mode = InputMode::Search;
            }
            KeyCode::Char('i') => {
                self.state.screen = Screen::Roster;
                self.state.input_mode = InputMode::Import;
            }
            KeyCode::Char('r') => {
                self.send_command(state::ProviderCommand::RefreshRoster, "Roster reload");
            }
            KeyCode::Char('e') => self.request_export(),
            KeyCode::Char('c') => {
                self.state.push_log("[INFO] Testing wiki connection");
                self.send_command(state::ProviderCommand::TestConnection, "Connection test");
            }
            KeyCode::Char('D') => {
                self.state.push_log("[INFO] Seeding demo roster");
                self.send_command(state::ProviderCommand::SeedDemo, "Demo seed");
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.search.clear();
                self.state.input_mode = InputMode::Normal;
                self.state.clamp_selection();
            }
            KeyCode::Enter => self.state.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.state.search.pop();
                self.state.clamp_selection();
            }
            KeyCode::Char(c) => {
                self.state.search.push(c);
                self.state.clamp_selection();
            }
            _ => {}
        }
    }

    fn on_import_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.input_mode = InputMode::Normal,
            KeyCode::Tab => {
                let form = &mut self.state.import_form;
                form.editing_year = !form.editing_year;
            }
            KeyCode::Backspace => {
                self.state.import_form.active_field_mut().pop();
            }
            KeyCode::Enter => self.submit_import(),
            KeyCode::Char(c) => self.state.import_form.active_field_mut().push(c),
            _ => {}
        }
    }

    fn open_detail(&mut self) {
        let Some(player) = self.state.selected_player() else {
            self.state.push_log("[INFO] No player selected");
            return;
        };
        let ign = player.ign.clone();
        self.state.screen = Screen::Detail;
        self.state.profile = None;
        self.state.profile_loading = true;
        self.state.profile_for = Some(ign.clone());
        if !self.send_command(state::ProviderCommand::FetchProfile { ign }, "Profile fetch") {
            self.state.profile_loading = false;
        }
    }

    fn submit_import(&mut self) {
        if self.state.import.active && !self.state.import.done {
            self.state.push_log("[INFO] An import is already running");
            return;
        }
        let tournament = self.state.import_form.tournament.trim().to_string();
        let year = self.state.import_form.year.trim().to_string();
        if year.is_empty() {
            self.state.push_log("[WARN] Import needs a year");
            return;
        }
        self.state.input_mode = InputMode::Normal;
        self.send_command(
            state::ProviderCommand::RunImport { tournament, year },
            "Import",
        );
    }

    fn request_export(&mut self) {
        if self.state.export_running {
            self.state.push_log("[INFO] Export already running");
            return;
        }
        let path = format!("roster_export_{}.xlsx", Utc::now().format("%Y%m%d_%H%M%S"));
        self.send_command(state::ProviderCommand::ExportRoster { path }, "Export");
    }

    fn send_command(&mut self, cmd: state::ProviderCommand, label: &str) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {label} unavailable"));
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {label} request failed"));
            return false;
        }
        true
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(config.clone(), tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.state.maybe_clear_import(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Roster => render_roster(frame, chunks[1], &app.state),
        Screen::Detail => render_detail(frame, chunks[1], &app.state),
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.input_mode == InputMode::Import {
        render_import_overlay(frame, frame.size(), &app.state);
    }

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Roster => format!(
            "PRO STATS | ROSTER | Sort: {} | {} players",
            sort_label(state.sort),
            state.players.len()
        ),
        Screen::Detail => {
            let ign = state
                .selected_player()
                .map(|p| p.ign.clone())
                .unwrap_or_else(|| "-".to_string());
            format!("PRO STATS | PLAYER | {ign}")
        }
        Screen::Dashboard => "PRO STATS | DASHBOARD".to_string(),
    };
    let line1 = format!("  .-.  {}", title);
    let line2 = " /___\\".to_string();
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.input_mode {
        InputMode::Search => {
            return "Type to filter | Backspace Delete | Enter Keep | Esc Clear".to_string();
        }
        InputMode::Import => {
            return "Type in field | Tab Switch field | Enter Run import | Esc Cancel".to_string();
        }
        InputMode::Normal => {}
    }
    match state.screen {
        Screen::Roster => {
            "Enter/d Player | 2 Dashboard | j/k/↑/↓ Move | s Sort | / Search | i Import | r Reload | e Export | c Test | D Demo | ? Help | q Quit".to_string()
        }
        Screen::Detail => "b/Esc Roster | 2 Dashboard | Enter Reload profile | ? Help | q Quit".to_string(),
        Screen::Dashboard => "1/b/Esc Roster | ? Help | q Quit".to_string(),
    }
}

fn render_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(area);

    render_roster_status(frame, sections[0], state);

    let widths = roster_columns();
    render_roster_header(frame, sections[1], &widths);

    let list_area = sections[2];
    let filtered = state.filtered_players();
    if filtered.is_empty() {
        let message = if state.players.is_empty() {
            "Roster is empty. Press i to import from Leaguepedia or D to seed demo data."
        } else {
            "No players match the search."
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
    } else if list_area.height > 0 {
        let visible = list_area.height as usize;
        let (start, end) = visible_range(state.selected, filtered.len(), visible);

        for (i, idx) in (start..end).enumerate() {
            let row_area = Rect {
                x: list_area.x,
                y: list_area.y + i as u16,
                width: list_area.width,
                height: 1,
            };

            let selected = idx == state.selected;
            let row_style = if selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };

            if selected {
                frame.render_widget(Block::default().style(row_style), row_area);
            }

            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(widths)
                .split(row_area);

            let p = filtered[idx];
            render_cell_text(frame, cols[0], &p.ign, row_style);
            render_cell_text(frame, cols[1], &p.role, row_style);
            render_cell_text(frame, cols[2], &p.team, row_style);
            render_cell_text(frame, cols[3], &p.games_played.to_string(), row_style);
            render_cell_text(
                frame,
                cols[4],
                &format!("{:.1}", p.win_rate()),
                win_rate_style(p, row_style, selected),
            );
            render_cell_text(frame, cols[5], &format!("{:.2}", p.kda()), row_style);
            render_cell_text(frame, cols[6], &format!("{:.1}", p.cs_per_min()), row_style);
            render_cell_text(frame, cols[7], &format!("{:.0}", p.gold_per_min()), row_style);
            render_cell_text(
                frame,
                cols[8],
                &format!("{:.0}", p.damage_per_min()),
                row_style,
            );
        }
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, sections[3]);
}

fn render_roster_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let (text, style) = if state.import.active {
        let progress = if state.import.total > 0 {
            format!(" ({}/{})", state.import.current, state.import.total)
        } else {
            String::new()
        };
        (
            format!("Import: {}{}", state.import.message, progress),
            Style::default().fg(Color::Yellow),
        )
    } else if state.input_mode == InputMode::Search {
        (
            format!("Search: {}_", state.search),
            Style::default().fg(Color::Cyan),
        )
    } else if !state.search.trim().is_empty() {
        (
            format!("Search: {} (/ to edit)", state.search),
            Style::default().fg(Color::Cyan),
        )
    } else {
        let total_games: u64 = state
            .players
            .iter()
            .map(|p| u64::from(p.games_played))
            .sum();
        let api = match state.connection_ok {
            Some(true) => " | API: OK",
            Some(false) => " | API: FAIL",
            None => "",
        };
        (
            format!(
                "{} players | {} games | DB: {}{}",
                state.players.len(),
                total_games,
                state.db_path,
                api
            ),
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn roster_columns() -> [Constraint; 9] {
    [
        Constraint::Min(14),
        Constraint::Length(9),
        Constraint::Length(18),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(8),
    ]
}

fn render_roster_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Player", style);
    render_cell_text(frame, cols[1], "Role", style);
    render_cell_text(frame, cols[2], "Team", style);
    render_cell_text(frame, cols[3], "Games", style);
    render_cell_text(frame, cols[4], "Win%", style);
    render_cell_text(frame, cols[5], "KDA", style);
    render_cell_text(frame, cols[6], "CS/m", style);
    render_cell_text(frame, cols[7], "G/m", style);
    render_cell_text(frame, cols[8], "DMG/m", style);
}

fn win_rate_style(player: &Player, row_style: Style, selected: bool) -> Style {
    if selected || player.games_played == 0 {
        return row_style;
    }
    let rate = player.win_rate();
    if rate >= 55.0 {
        Style::default().fg(Color::Green)
    } else if rate < 45.0 {
        Style::default().fg(Color::Red)
    } else {
        row_style
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(4)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(30)])
        .split(rows[0]);

    let profile = Paragraph::new(profile_text(state))
        .block(Block::default().title("Wiki Profile").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(profile, columns[0]);

    let stats_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(1)])
        .split(columns[1]);

    let totals = Paragraph::new(totals_text(state))
        .block(Block::default().title("Career Totals").borders(Borders::ALL));
    frame.render_widget(totals, stats_chunks[0]);

    let per_game = Paragraph::new(per_game_text(state))
        .block(Block::default().title("Per Game").borders(Borders::ALL));
    frame.render_widget(per_game, stats_chunks[1]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[1]);
}

fn profile_text(state: &AppState) -> String {
    let Some(player) = state.selected_player() else {
        return "No player selected".to_string();
    };
    let mut lines = vec![format!("IGN: {}", player.ign)];

    if state.profile_for.as_deref() != Some(player.ign.as_str()) {
        lines.push(String::new());
        lines.push("Press Enter to load the wiki profile".to_string());
        return lines.join("\n");
    }
    if state.profile_loading {
        lines.push(String::new());
        lines.push("Loading wiki profile...".to_string());
        return lines.join("\n");
    }

    match &state.profile {
        Some(profile) => {
            if !profile.real_name.is_empty() {
                lines.push(format!("Name: {}", profile.real_name));
            }
            if !profile.country.is_empty() {
                lines.push(format!("Country: {}", profile.country));
            }
            if !profile.team.is_empty() {
                lines.push(format!("Team: {}", profile.team));
            }
            if !profile.role.is_empty() {
                lines.push(format!("Role: {}", profile.role));
            }
            if !profile.overview_page.is_empty() {
                lines.push(format!("Page: {}", profile.overview_page));
            }
            lines.push(String::new());
            match &profile.image_url {
                Some(url) => {
                    lines.push("Image:".to_string());
                    lines.push(url.clone());
                }
                None => lines.push("No image found".to_string()),
            }
        }
        None => {
            lines.push(String::new());
            lines.push("No wiki profile found.".to_string());
            lines.push("Showing local stats only.".to_string());
        }
    }
    lines.join("\n")
}

fn totals_text(state: &AppState) -> String {
    let Some(p) = state.selected_player() else {
        return "No player selected".to_string();
    };
    let losses = p.games_played.saturating_sub(p.wins);
    let team = if p.team.is_empty() { "-" } else { p.team.as_str() };
    let role = if p.role.is_empty() { "-" } else { p.role.as_str() };
    [
        format!("{team} | {role}"),
        format!("Games: {} ({} W / {} L)", p.games_played, p.wins, losses),
        format!("Win rate: {:.1}%", p.win_rate()),
        format!("K/D/A: {} / {} / {}", p.kills, p.deaths, p.assists),
        format!("KDA: {:.2}", p.kda()),
        format!(
            "CS: {} | Gold: {} | Damage: {}",
            p.total_cs, p.total_gold, p.total_damage
        ),
        format!("Minutes played: {:.0}", p.total_minutes),
    ]
    .join("\n")
}

fn per_game_text(state: &AppState) -> String {
    let Some(p) = state.selected_player() else {
        return "No player selected".to_string();
    };
    let avg_len = if p.games_played == 0 {
        0.0
    } else {
        p.total_minutes / f64::from(p.games_played)
    };
    [
        format!(
            "Kills: {:.1}  Deaths: {:.1}  Assists: {:.1}",
            p.avg_kills(),
            p.avg_deaths(),
            p.avg_assists()
        ),
        format!("CS/min: {:.2}", p.cs_per_min()),
        format!("Gold/min: {:.0}", p.gold_per_min()),
        format!("Damage/min: {:.0}", p.damage_per_min()),
        format!("Avg game length: {:.1} min", avg_len),
        format!("Last updated: {}", p.last_updated),
    ]
    .join("\n")
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let players = &state.players;
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let overview = summary::summarize(players);
    let overview_text = format!(
        "Players: {} | Games: {}\nAvg win rate: {:.1}% | Avg KDA: {:.2}",
        overview.total_players, overview.total_games, overview.avg_win_rate, overview.avg_kda
    );
    let overview_widget = Paragraph::new(overview_text)
        .block(Block::default().title("Overview").borders(Borders::ALL));
    frame.render_widget(overview_widget, sections[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(sections[1]);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(9)])
        .split(columns[0]);

    let roles = Paragraph::new(role_averages_text(players))
        .block(Block::default().title("By Role").borders(Borders::ALL));
    frame.render_widget(roles, left_chunks[0]);

    render_role_chart(frame, left_chunks[1], players);

    let title = format!("Top Win Rate (min {} games)", summary::MIN_GAMES_FOR_RANKING);
    let win_board = Paragraph::new(win_rate_board_text(players))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(win_board, columns[1]);

    let kda_title = format!("Top KDA (min {} games)", summary::MIN_GAMES_FOR_RANKING);
    let kda_board = Paragraph::new(kda_board_text(players))
        .block(Block::default().title(kda_title).borders(Borders::ALL));
    frame.render_widget(kda_board, columns[2]);
}

fn role_averages_text(players: &[Player]) -> String {
    let rows = summary::role_averages(players);
    if rows.is_empty() {
        return "No players yet".to_string();
    }
    let mut lines = vec![format!(
        "{:<9} {:>3} {:>6} {:>5} {:>5}",
        "Role", "N", "Win%", "KDA", "CS/m"
    )];
    for row in rows {
        lines.push(format!(
            "{:<9} {:>3} {:>6.1} {:>5.2} {:>5.1}",
            row.role, row.players, row.avg_win_rate, row.avg_kda, row.avg_cs_per_min
        ));
    }
    lines.join("\n")
}

fn win_rate_board_text(players: &[Player]) -> String {
    let top = summary::top_by_win_rate(
        players,
        summary::LEADERBOARD_SIZE,
        summary::MIN_GAMES_FOR_RANKING,
    );
    if top.is_empty() {
        return format!(
            "No players with {}+ games",
            summary::MIN_GAMES_FOR_RANKING
        );
    }
    top.iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{:>2}. {:<14} {:>5.1}%  {:>3}g",
                i + 1,
                p.ign,
                p.win_rate(),
                p.games_played
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn kda_board_text(players: &[Player]) -> String {
    let top = summary::top_by_kda(
        players,
        summary::LEADERBOARD_SIZE,
        summary::MIN_GAMES_FOR_RANKING,
    );
    if top.is_empty() {
        return format!(
            "No players with {}+ games",
            summary::MIN_GAMES_FOR_RANKING
        );
    }
    top.iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{:>2}. {:<14} {:>5.2}  {:>3}g",
                i + 1,
                p.ign,
                p.kda(),
                p.games_played
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_role_chart(frame: &mut Frame, area: Rect, players: &[Player]) {
    let block = Block::default().title("Players per Role").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let counts = summary::role_distribution(players);
    if counts.is_empty() {
        let empty = Paragraph::new("No players yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .map(|(role, count)| {
            Bar::default()
                .value(*count as u64)
                .label(role_tag(role).into())
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(1);
    frame.render_widget(chart, inner);
}

fn role_tag(role: &str) -> String {
    role.chars().take(3).collect()
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn sort_label(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Name => "NAME",
        SortMode::Games => "GAMES",
        SortMode::WinRate => "WIN%",
        SortMode::Kda => "KDA",
    }
}

fn render_import_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let form = &state.import_form;
    let (t_marker, y_marker) = if form.editing_year {
        ("  ", "> ")
    } else {
        ("> ", "  ")
    };
    let t_cursor = if form.editing_year { "" } else { "_" };
    let y_cursor = if form.editing_year { "_" } else { "" };
    let text = [
        "Import scoreboard stats from Leaguepedia".to_string(),
        String::new(),
        format!("{t_marker}Tournament: {}{t_cursor}", form.tournament),
        format!("{y_marker}Year:       {}{y_cursor}", form.year),
        String::new(),
        "Leave tournament blank to import a whole year.".to_string(),
    ]
    .join("\n");

    let import = Paragraph::new(text)
        .block(Block::default().title("Import").borders(Borders::ALL));
    frame.render_widget(import, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Pro Stats Terminal - Help",
        "",
        "Global:",
        "  1            Roster",
        "  2            Dashboard",
        "  Enter / d    Player detail",
        "  b / Esc      Back to roster",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Roster:",
        "  j/k or ↑/↓   Move",
        "  s            Cycle sort mode",
        "  /            Search (Enter keeps, Esc clears)",
        "  i            Import from Leaguepedia",
        "  r            Reload from database",
        "  e            Export roster to .xlsx",
        "  c            Test wiki connection",
        "  D            Seed demo roster",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
