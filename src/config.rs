use std::env;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "prostats_terminal";

pub const DEFAULT_API_URL: &str = "https://lol.fandom.com/api.php";
pub const DEFAULT_USER_AGENT: &str = "ProStatsTerminal/0.1 (pro player stats aggregator)";

/// Hard cap the Cargo API enforces on a single query page.
pub const MAX_PAGE_LIMIT: usize = 500;
/// Safety cap on rows accumulated across pages for one scope.
pub const MAX_TOTAL_ROWS: usize = 2500;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub user_agent: String,
    pub bot_username: String,
    pub bot_password: String,
    pub request_delay: Duration,
    pub page_limit: usize,
    pub max_retries: usize,
    pub db_path: PathBuf,
    pub default_tournament: String,
    pub default_year: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Config {
    /// Entry points call `dotenvy::from_filename` first so `.env.local` /
    /// `.env` values are visible here.
    pub fn from_env() -> Self {
        let api_url = env::var("LEAGUEPEDIA_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let user_agent = env::var("LEAGUEPEDIA_USER_AGENT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let bot_username = env::var("LEAGUEPEDIA_BOT_USER").unwrap_or_default();
        let bot_password = env::var("LEAGUEPEDIA_BOT_PASSWORD").unwrap_or_default();
        let request_delay_ms = env::var("API_REQUEST_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(500)
            .clamp(100, 5_000);
        let page_limit = env::var("API_PAGE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_PAGE_LIMIT)
            .clamp(50, MAX_PAGE_LIMIT);
        let max_retries = env::var("API_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(5)
            .clamp(1, 10);
        let default_tournament = env::var("DEFAULT_TOURNAMENT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "LCK".to_string());
        let default_year = env::var("DEFAULT_YEAR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "2025".to_string());

        Self {
            api_url,
            user_agent,
            bot_username,
            bot_password,
            request_delay: Duration::from_millis(request_delay_ms),
            page_limit,
            max_retries,
            db_path: resolve_db_path(),
            default_tournament,
            default_year,
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.bot_username.trim().is_empty() && !self.bot_password.trim().is_empty()
    }
}

fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = env::var("ROSTER_DB_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    app_cache_dir()
        .map(|dir| dir.join("roster.sqlite"))
        .unwrap_or_else(|| PathBuf::from("roster.sqlite"))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}
