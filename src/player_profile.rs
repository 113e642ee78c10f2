//! Player profiles: the wiki's Players row for an IGN plus a best-effort
//! portrait URL dug out of the file namespace.

use anyhow::Result;
use chrono::{Datelike, Utc};
use serde_json::Value;

use crate::query_filter::{Field, FilterExpr};
use crate::wiki_client::{CargoQuery, WikiClient};

/// Width requested from the wiki CDN for portraits.
pub const IMAGE_WIDTH: u32 = 300;

const PLAYER_FIELDS: &str = "Player,Image,Team,Role,Country,Name,OverviewPage";
const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

// Filename fragments that mark team furniture rather than a portrait.
const EXCLUDED_IMAGE_TOKENS: [&str; 21] = [
    "logo",
    "icon",
    "banner",
    "emote",
    "allstar",
    "signature",
    "sticker",
    "split",
    "trophy",
    "mvp",
    "championship",
    "team",
    "roster",
    "group",
    "celebration",
    "stage",
    "interview",
    "square",
    "infobox",
    "tab",
    "header",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerProfile {
    pub player: String,
    pub real_name: String,
    pub team: String,
    pub role: String,
    pub country: String,
    pub overview_page: String,
    pub image_url: Option<String>,
}

/// Look up one player's wiki profile. `Ok(None)` means the wiki has no
/// Players row for this IGN. Portrait lookups are best-effort; their
/// failures never sink the profile.
pub fn get_player_info(client: &mut WikiClient, ign: &str) -> Result<Option<PlayerProfile>> {
    let mut query = CargoQuery::new("Players", PLAYER_FIELDS);
    query.where_expr = Some(FilterExpr::eq(Field::PlayerName, ign));
    query.limit = 1;
    let rows = client.cargo_query(&query)?;
    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let mut profile = profile_from_row(ign, row);
    let image_file = text(row, "Image").trim();
    profile.image_url = if image_file.is_empty() {
        search_player_image(client, &profile.player, &profile.team)
            .ok()
            .flatten()
    } else {
        image_url_for_file(client, image_file).ok().flatten()
    };
    Ok(Some(profile))
}

fn profile_from_row(ign: &str, row: &Value) -> PlayerProfile {
    let player = text(row, "Player");
    PlayerProfile {
        player: if player.is_empty() {
            ign.to_string()
        } else {
            player.to_string()
        },
        real_name: text(row, "Name").to_string(),
        team: text(row, "Team").to_string(),
        role: text(row, "Role").to_string(),
        country: text(row, "Country").to_string(),
        overview_page: text(row, "OverviewPage").to_string(),
        image_url: None,
    }
}

/// Scan the file namespace for a portrait. Tries a team-qualified prefix
/// first, then the bare IGN; keeps the best-scoring candidate across both.
/// Falls back to a fulltext file search when no prefix candidate scores.
pub fn search_player_image(
    client: &mut WikiClient,
    player: &str,
    team: &str,
) -> Result<Option<String>> {
    let team = team.trim();
    let mut prefixes = Vec::new();
    if !team.is_empty() {
        let clean_team = team.replace(' ', "_").replace('.', "");
        prefixes.push(format!("{clean_team}_{player}"));
    }
    prefixes.push(player.to_string());

    let player_token = player.to_lowercase().replace(' ', "_");
    let team_token = if team.is_empty() {
        None
    } else {
        Some(team.to_lowercase().replace(' ', "_"))
    };
    let current_year = Utc::now().year();

    let mut best: Option<(i64, String)> = None;
    for prefix in &prefixes {
        let ai_prefix = prefix.replace(' ', "_");
        let body = client.api_get(&[
            ("action", "query"),
            ("format", "json"),
            ("list", "allimages"),
            ("aiprefix", ai_prefix.as_str()),
            ("ailimit", "50"),
            ("aiprop", "url|timestamp"),
        ])?;
        let Some(images) = body
            .get("query")
            .and_then(|q| q.get("allimages"))
            .and_then(|a| a.as_array())
        else {
            continue;
        };
        for item in images {
            let name = item.get("name").and_then(|v| v.as_str()).unwrap_or_default();
            let url = item.get("url").and_then(|v| v.as_str()).unwrap_or_default();
            if url.is_empty() {
                continue;
            }
            let timestamp = item
                .get("timestamp")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let Some(score) = score_image_name(
                name,
                &player_token,
                team_token.as_deref(),
                timestamp,
                current_year,
            ) else {
                continue;
            };
            keep_best(&mut best, score, url);
        }
    }

    if let Some((_, url)) = best {
        return Ok(Some(scaled_url(&url, IMAGE_WIDTH)));
    }
    search_image_by_title(client, player, team)
}

fn search_image_by_title(
    client: &mut WikiClient,
    player: &str,
    team: &str,
) -> Result<Option<String>> {
    let term = format!("File:{team} {player}");
    let body = client.api_get(&[
        ("action", "query"),
        ("format", "json"),
        ("list", "search"),
        ("srsearch", term.trim()),
        ("srnamespace", "6"),
        ("srlimit", "10"),
    ])?;
    let Some(title) = body
        .get("query")
        .and_then(|q| q.get("search"))
        .and_then(|s| s.as_array())
        .and_then(|hits| hits.first())
        .and_then(|hit| hit.get("title"))
        .and_then(|t| t.as_str())
    else {
        return Ok(None);
    };
    let filename = title.strip_prefix("File:").unwrap_or(title);
    image_url_for_file(client, filename)
}

/// Resolve a known wiki filename to its CDN URL.
pub fn image_url_for_file(client: &mut WikiClient, filename: &str) -> Result<Option<String>> {
    let title = format!("File:{filename}");
    let body = client.api_get(&[
        ("action", "query"),
        ("format", "json"),
        ("titles", title.as_str()),
        ("prop", "imageinfo"),
        ("iiprop", "url"),
    ])?;
    Ok(first_image_url(&body).map(|url| scaled_url(&url, IMAGE_WIDTH)))
}

fn first_image_url(body: &Value) -> Option<String> {
    let pages = body.get("query")?.get("pages")?.as_object()?;
    for (page_id, page) in pages {
        // "-1" is MediaWiki's missing-page marker.
        if page_id == "-1" {
            continue;
        }
        if let Some(url) = page
            .get("imageinfo")
            .and_then(|info| info.as_array())
            .and_then(|info| info.first())
            .and_then(|first| first.get("url"))
            .and_then(|url| url.as_str())
        {
            return Some(url.to_string());
        }
    }
    None
}

/// Score a candidate portrait filename against a player and team. `None`
/// filters the file out entirely: wrong extension, furniture token, or not
/// this player's file. Positive signals favor team-tagged, recent, portrait
/// style names; the upload timestamp breaks ties toward newer files.
fn score_image_name(
    name: &str,
    player_token: &str,
    team_token: Option<&str>,
    timestamp: &str,
    current_year: i32,
) -> Option<i64> {
    let lower = name.to_lowercase();
    if !IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return None;
    }
    if EXCLUDED_IMAGE_TOKENS
        .iter()
        .any(|token| lower.contains(token))
    {
        return None;
    }
    if !lower.contains(player_token) {
        return None;
    }

    let mut score = 0i64;
    if let Some(team) = team_token
        && lower.contains(team)
    {
        score += 100;
    }
    for offset in 0..3i32 {
        let year = current_year - offset;
        if lower.contains(&year.to_string()) {
            score += i64::from(50 - offset * 10);
            break;
        }
    }
    if lower.contains("player") || lower.contains("headshot") {
        score += 20;
    }
    if name.len() > 50 {
        score -= 10;
    }
    if let Some(ts_year) = timestamp.get(..4).and_then(|y| y.parse::<i64>().ok()) {
        score += (ts_year - 2020) * 2;
    }
    Some(score)
}

/// Keep the strictly higher-scoring candidate; the first of equals wins.
/// The empty slate sits at -1, so a plain zero-score portrait still counts
/// while negative-scoring names (long gallery shots) fall through to the
/// fulltext search instead.
fn keep_best(best: &mut Option<(i64, String)>, score: i64, url: &str) {
    let best_score = best.as_ref().map_or(-1, |(s, _)| *s);
    if score > best_score {
        *best = Some((score, url.to_string()));
    }
}

/// Rewrite a Fandom original-size URL to the width-capped CDN variant.
pub fn scaled_url(url: &str, width: u32) -> String {
    if !url.contains("/revision/latest") || url.contains("/scale-to-width") {
        return url.to_string();
    }
    match url.split_once('?') {
        Some((base, query)) => format!("{base}/scale-to-width-down/{width}?{query}"),
        None => format!("{url}/scale-to-width-down/{width}"),
    }
}

fn text<'a>(row: &'a Value, key: &str) -> &'a str {
    row.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scaled_url_rewrites_fandom_originals() {
        let plain = "https://static.wikia.net/T1_Faker_2025.png/revision/latest";
        assert_eq!(
            scaled_url(plain, 300),
            "https://static.wikia.net/T1_Faker_2025.png/revision/latest/scale-to-width-down/300"
        );

        let with_query = "https://static.wikia.net/T1_Faker_2025.png/revision/latest?cb=20250110";
        assert_eq!(
            scaled_url(with_query, 300),
            "https://static.wikia.net/T1_Faker_2025.png/revision/latest/scale-to-width-down/300?cb=20250110"
        );
    }

    #[test]
    fn scaled_url_leaves_other_urls_alone() {
        let already = "https://static.wikia.net/x.png/revision/latest/scale-to-width-down/300";
        assert_eq!(scaled_url(already, 300), already);
        assert_eq!(scaled_url("https://example.com/a.png", 300), "https://example.com/a.png");
    }

    #[test]
    fn scoring_filters_non_candidates() {
        let player = "faker";
        assert!(score_image_name("T1_Faker_2025.txt", player, None, "", 2025).is_none());
        assert!(score_image_name("T1_logo_faker.png", player, None, "", 2025).is_none());
        assert!(score_image_name("T1_Zeus_2025.png", player, None, "", 2025).is_none());
    }

    #[test]
    fn scoring_prefers_team_and_recent_year() {
        let player = "faker";
        let team = Some("t1");
        let ts = "2024-06-01T00:00:00Z";
        let fresh = score_image_name("T1_Faker_2025_Summer.png", player, team, ts, 2025).unwrap();
        let stale = score_image_name("T1_Faker_2023_Summer.png", player, team, ts, 2025).unwrap();
        let teamless = score_image_name("Faker_2025_Summer.png", player, team, ts, 2025).unwrap();
        assert!(fresh > stale);
        assert!(fresh > teamless);
        // 100 team + 50 year + (2024 - 2020) * 2 timestamp.
        assert_eq!(fresh, 158);
    }

    #[test]
    fn scoring_penalizes_long_names_and_rewards_portraits() {
        let player = "faker";
        let short = score_image_name("Faker_headshot.png", player, None, "", 2025).unwrap();
        assert_eq!(short, 20);
        let long = score_image_name(
            "Faker_some_extremely_long_gallery_filename_variant_one.png",
            player,
            None,
            "",
            2025,
        )
        .unwrap();
        assert_eq!(long, -10);
    }

    #[test]
    fn zero_score_candidate_still_wins_an_empty_slate() {
        // A bare portrait with no team, year, or timestamp bonus scores 0
        // and must still be picked over nothing.
        let score = score_image_name("Faker.png", "faker", None, "", 2025).unwrap();
        assert_eq!(score, 0);

        let mut best = None;
        keep_best(&mut best, score, "https://cdn/faker.png");
        assert_eq!(
            best.as_ref().map(|(s, url)| (*s, url.as_str())),
            Some((0, "https://cdn/faker.png"))
        );

        // Negative scorers lose to the empty slate, and ties keep the
        // first candidate seen.
        let mut none: Option<(i64, String)> = None;
        keep_best(&mut none, -10, "https://cdn/group_shot.png");
        assert!(none.is_none());

        keep_best(&mut best, 0, "https://cdn/faker_alt.png");
        assert_eq!(best.map(|(_, url)| url).as_deref(), Some("https://cdn/faker.png"));
    }

    #[test]
    fn first_image_url_skips_missing_pages() {
        let body = json!({
            "query": {
                "pages": {
                    "-1": {"title": "File:Nope.png"},
                    "4711": {"imageinfo": [{"url": "https://cdn/x.png/revision/latest"}]}
                }
            }
        });
        assert_eq!(
            first_image_url(&body).as_deref(),
            Some("https://cdn/x.png/revision/latest")
        );
        assert_eq!(first_image_url(&json!({})), None);
    }

    #[test]
    fn profile_row_falls_back_to_requested_ign() {
        let row = json!({"Name": "Lee Sang-hyeok", "Team": "T1"});
        let profile = profile_from_row("Faker", &row);
        assert_eq!(profile.player, "Faker");
        assert_eq!(profile.real_name, "Lee Sang-hyeok");
        assert_eq!(profile.team, "T1");
    }
}
