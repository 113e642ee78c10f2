//! Leaguepedia MediaWiki client: bot login, request pacing, Cargo queries
//! with retry and pagination.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::config::{Config, MAX_PAGE_LIMIT, MAX_TOTAL_ROWS};
use crate::http_client::http_client;
use crate::query_filter::{Field, FilterExpr};

// Base backoffs; both scale linearly with the retry streak.
const RATE_LIMIT_BACKOFF_SECS: u64 = 5;
const TRANSIENT_BACKOFF_SECS: u64 = 3;

/// Minimum spacing between outbound requests. Every call path on a client
/// goes through the same limiter, so bursts cannot form across login,
/// query, and image lookups.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Sleep out the remainder of the interval since the previous call,
    /// then stamp the clock.
    pub fn wait(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_call = Some(Instant::now());
    }
}

/// One Cargo query, page sized. The filter tree is rendered to `where` text
/// only at send time.
#[derive(Debug, Clone)]
pub struct CargoQuery {
    pub tables: String,
    pub fields: String,
    pub where_expr: Option<FilterExpr>,
    pub join_on: Option<String>,
    pub order_by: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl CargoQuery {
    pub fn new(tables: &str, fields: &str) -> Self {
        Self {
            tables: tables.to_string(),
            fields: fields.to_string(),
            where_expr: None,
            join_on: None,
            order_by: None,
            limit: MAX_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Stateful wiki client. Session state (login flag, pacing clock) lives on
/// the value, never in process globals, so independent clients can point at
/// different endpoints.
pub struct WikiClient {
    base_url: String,
    user_agent: String,
    username: String,
    password: String,
    max_retries: usize,
    page_limit: usize,
    limiter: RateLimiter,
    logged_in: bool,
}

impl WikiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.api_url.clone(),
            user_agent: config.user_agent.clone(),
            username: config.bot_username.clone(),
            password: config.bot_password.clone(),
            max_retries: config.max_retries,
            page_limit: config.page_limit.min(MAX_PAGE_LIMIT),
            limiter: RateLimiter::new(config.request_delay),
            logged_in: false,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Two-step bot login (fetch login token, post credentials). Fandom
    /// grants authenticated sessions higher Cargo limits. Returns `true`
    /// when already logged in or on a fresh `Success`; every failure shape
    /// (no credentials, missing token, rejection, transport error) leaves
    /// the session anonymous and returns `false`.
    pub fn login(&mut self) -> bool {
        if self.logged_in {
            return true;
        }
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            return false;
        }
        match self.try_login() {
            Ok(succeeded) => {
                self.logged_in = succeeded;
                succeeded
            }
            Err(_) => false,
        }
    }

    fn try_login(&mut self) -> Result<bool> {
        let token_body = self.api_get(&[
            ("action", "query"),
            ("meta", "tokens"),
            ("type", "login"),
            ("format", "json"),
        ])?;
        let Some(token) = login_token(&token_body) else {
            return Ok(false);
        };

        let client = http_client()?;
        self.limiter.wait();
        let form = [
            ("action", "login"),
            ("lgname", self.username.as_str()),
            ("lgpassword", self.password.as_str()),
            ("lgtoken", token.as_str()),
            ("format", "json"),
        ];
        let resp = client
            .post(&self.base_url)
            .header(USER_AGENT, &self.user_agent)
            .form(&form)
            .send()
            .context("login request failed")?
            .error_for_status()
            .context("login request rejected")?;
        let body = resp.json::<Value>().context("login response not json")?;
        Ok(login_succeeded(&body))
    }

    /// One rate-limited GET against the action API. No retry loop; Cargo
    /// calls that want retry semantics go through `cargo_query`.
    pub fn api_get(&mut self, params: &[(&str, &str)]) -> Result<Value> {
        let client = http_client()?;
        self.limiter.wait();
        let resp = client
            .get(&self.base_url)
            .header(USER_AGENT, &self.user_agent)
            .query(params)
            .send()
            .context("api request failed")?
            .error_for_status()
            .context("api request rejected")?;
        resp.json::<Value>().context("api response not json")
    }

    /// Execute one Cargo query page.
    ///
    /// Two failure classes retry differently: a server `ratelimited` error
    /// backs off 5s, 10s, 15s... indefinitely (a stall beats a dropped
    /// import), while transport/HTTP/parse failures back off 3s, 6s, ...
    /// and surface after `max_retries`. Any other server-reported error
    /// aborts immediately. Rows are the `title` objects of the response.
    pub fn cargo_query(&mut self, query: &CargoQuery) -> Result<Vec<Value>> {
        // Queries work anonymously at lower limits; a failed login is not
        // fatal here.
        if !self.logged_in {
            self.login();
        }

        let params = cargo_params(query);
        let client = http_client()?;

        let mut transient_failures = 0usize;
        let mut rate_limit_waits = 0u64;
        loop {
            self.limiter.wait();
            let outcome = client
                .get(&self.base_url)
                .header(USER_AGENT, &self.user_agent)
                .query(&params)
                .send()
                .context("cargo request failed")
                .and_then(|resp| resp.error_for_status().context("cargo request rejected"))
                .and_then(|resp| resp.json::<Value>().context("cargo response not json"));

            let body = match outcome {
                Ok(body) => body,
                Err(err) => {
                    transient_failures += 1;
                    if transient_failures >= self.max_retries {
                        return Err(err).with_context(|| {
                            format!("cargo query failed after {} attempts", self.max_retries)
                        });
                    }
                    thread::sleep(Duration::from_secs(
                        TRANSIENT_BACKOFF_SECS * transient_failures as u64,
                    ));
                    continue;
                }
            };

            if let Some(error) = body.get("error") {
                let code = error
                    .get("code")
                    .and_then(|c| c.as_str())
                    .unwrap_or_default();
                if code == "ratelimited" {
                    rate_limit_waits += 1;
                    thread::sleep(Duration::from_secs(RATE_LIMIT_BACKOFF_SECS * rate_limit_waits));
                    continue;
                }
                let info = error
                    .get("info")
                    .and_then(|i| i.as_str())
                    .unwrap_or("unknown error");
                return Err(anyhow!("cargo api error ({code}): {info}"));
            }

            return Ok(cargo_rows(&body));
        }
    }

    /// Run a Cargo query across pages until a short page or the global row
    /// cap, reporting the running row count after each page.
    pub fn cargo_query_all(
        &mut self,
        query: &CargoQuery,
        on_progress: impl FnMut(usize),
    ) -> Result<Vec<Value>> {
        let page_size = self.page_limit;
        paginate(
            page_size,
            MAX_TOTAL_ROWS,
            |offset, limit| {
                let mut page = query.clone();
                page.limit = limit;
                page.offset = offset;
                self.cargo_query(&page)
            },
            on_progress,
        )
    }

    /// Tournament overview pages for a year, name-ordered.
    pub fn get_tournaments(&mut self, year: &str) -> Result<Vec<String>> {
        let mut query = CargoQuery::new("Tournaments", "OverviewPage,Name,Region");
        query.where_expr = Some(FilterExpr::eq(Field::TournamentYear, year));
        query.order_by = Some("Name".to_string());
        query.limit = 100;
        let rows = self.cargo_query(&query)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("OverviewPage").and_then(|v| v.as_str()))
            .filter(|page| !page.is_empty())
            .map(|page| page.to_string())
            .collect())
    }

    /// One-row probe query; a login is attempted on the way, but anonymous
    /// access still counts as connected.
    pub fn test_connection(&mut self) -> bool {
        let mut query = CargoQuery::new("ScoreboardPlayers", "Link");
        query.limit = 1;
        self.cargo_query(&query).is_ok()
    }
}

/// Offset-cursor pagination over `fetch_page(offset, limit)`. Stops on the
/// first short page or once `cap` rows have accumulated; the result is
/// truncated to `cap`.
pub fn paginate<T>(
    page_size: usize,
    cap: usize,
    mut fetch_page: impl FnMut(usize, usize) -> Result<Vec<T>>,
    mut on_progress: impl FnMut(usize),
) -> Result<Vec<T>> {
    let mut all = Vec::new();
    let mut offset = 0usize;
    loop {
        let page = fetch_page(offset, page_size)?;
        let page_len = page.len();
        all.extend(page);
        on_progress(all.len());
        if page_len < page_size || all.len() >= cap {
            break;
        }
        offset += page_size;
    }
    all.truncate(cap);
    Ok(all)
}

fn cargo_params(query: &CargoQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("action".to_string(), "cargoquery".to_string()),
        ("format".to_string(), "json".to_string()),
        ("tables".to_string(), query.tables.clone()),
        ("fields".to_string(), query.fields.clone()),
        (
            "limit".to_string(),
            query.limit.min(MAX_PAGE_LIMIT).to_string(),
        ),
        ("offset".to_string(), query.offset.to_string()),
    ];
    if let Some(expr) = &query.where_expr {
        params.push(("where".to_string(), expr.to_where_clause()));
    }
    if let Some(join) = &query.join_on {
        params.push(("join_on".to_string(), join.clone()));
    }
    if let Some(order) = &query.order_by {
        params.push(("order_by".to_string(), order.clone()));
    }
    params
}

/// Row payloads (`title` objects) of a Cargo response body.
pub fn cargo_rows(body: &Value) -> Vec<Value> {
    body.get("cargoquery")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("title").cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a raw Cargo response into row payloads.
pub fn parse_cargo_rows(raw: &str) -> Result<Vec<Value>> {
    let body = serde_json::from_str::<Value>(raw.trim()).context("invalid cargo response json")?;
    Ok(cargo_rows(&body))
}

pub fn login_token(body: &Value) -> Option<String> {
    body.get("query")?
        .get("tokens")?
        .get("logintoken")?
        .as_str()
        .map(|s| s.to_string())
}

pub fn login_succeeded(body: &Value) -> bool {
    body.get("login")
        .and_then(|login| login.get("result"))
        .and_then(|result| result.as_str())
        == Some("Success")
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn rate_limiter_spaces_calls() {
        let interval = Duration::from_millis(40);
        let mut limiter = RateLimiter::new(interval);
        let start = Instant::now();
        limiter.wait();
        limiter.wait();
        assert!(start.elapsed() >= interval);
    }

    #[test]
    fn paginate_stops_on_short_page() {
        let pages = [3usize, 3, 1];
        let mut call = 0usize;
        let mut progress = Vec::new();
        let rows = paginate(
            3,
            100,
            |offset, limit| {
                assert_eq!(limit, 3);
                assert_eq!(offset, call * 3);
                let n = pages[call];
                call += 1;
                Ok(vec![0u8; n])
            },
            |count| progress.push(count),
        )
        .unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(progress, vec![3, 6, 7]);
        assert_eq!(call, 3);
    }

    #[test]
    fn paginate_truncates_at_cap() {
        let mut calls = 0usize;
        let rows = paginate(
            10,
            25,
            |_, _| {
                calls += 1;
                Ok(vec![0u8; 10])
            },
            |_| {},
        )
        .unwrap();
        assert_eq!(calls, 3);
        assert_eq!(rows.len(), 25);
    }

    #[test]
    fn paginate_handles_empty_first_page() {
        let rows: Vec<u8> = paginate(10, 25, |_, _| Ok(Vec::new()), |_| {}).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn login_parsers() {
        let token_body: Value = serde_json::from_str(
            r#"{"query":{"tokens":{"logintoken":"abc+\\"}}}"#,
        )
        .unwrap();
        assert_eq!(login_token(&token_body).as_deref(), Some("abc+\\"));
        assert_eq!(login_token(&Value::Null), None);

        let ok: Value = serde_json::from_str(r#"{"login":{"result":"Success"}}"#).unwrap();
        assert!(login_succeeded(&ok));
        let rejected: Value =
            serde_json::from_str(r#"{"login":{"result":"WrongToken"}}"#).unwrap();
        assert!(!login_succeeded(&rejected));
    }

    #[test]
    fn cargo_rows_unwraps_titles() {
        let rows = parse_cargo_rows(
            r#"{"cargoquery":[{"title":{"Link":"Faker"}},{"title":{"Link":"Chovy"}}]}"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Link"], "Chovy");
        assert!(parse_cargo_rows("{}").unwrap().is_empty());
    }
}
