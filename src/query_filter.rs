//! Structured predicates for Cargo `where` clauses.
//!
//! Filters are built as an expression tree over a closed set of columns and
//! rendered to wire text in exactly one place, with values escaped. Callers
//! never splice user input into clause strings themselves.

/// Columns the crate is allowed to filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Tournament overview page of a scoreboard row (`SP` alias).
    OverviewPage,
    /// `Tournaments.Year`.
    TournamentYear,
    /// `Players.Player` (the IGN key of the player profile table).
    PlayerName,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Field::OverviewPage => "SP.OverviewPage",
            Field::TournamentYear => "Year",
            Field::PlayerName => "Player",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Like { field: Field, pattern: String },
    NotLike { field: Field, pattern: String },
    Eq { field: Field, value: String },
    All(Vec<FilterExpr>),
    Any(Vec<FilterExpr>),
}

impl FilterExpr {
    pub fn like(field: Field, pattern: impl Into<String>) -> Self {
        FilterExpr::Like {
            field,
            pattern: pattern.into(),
        }
    }

    pub fn not_like(field: Field, pattern: impl Into<String>) -> Self {
        FilterExpr::NotLike {
            field,
            pattern: pattern.into(),
        }
    }

    pub fn eq(field: Field, value: impl Into<String>) -> Self {
        FilterExpr::Eq {
            field,
            value: value.into(),
        }
    }

    /// Render to Cargo `where` text. Values have single quotes doubled, and
    /// column names only ever come from [`Field`].
    pub fn to_where_clause(&self) -> String {
        match self {
            FilterExpr::Like { field, pattern } => {
                format!("{} LIKE '{}'", field.column(), escape_value(pattern))
            }
            FilterExpr::NotLike { field, pattern } => {
                format!("{} NOT LIKE '{}'", field.column(), escape_value(pattern))
            }
            FilterExpr::Eq { field, value } => {
                format!("{} = '{}'", field.column(), escape_value(value))
            }
            FilterExpr::All(parts) => join_rendered(parts, " AND "),
            FilterExpr::Any(parts) => join_rendered(parts, " OR "),
        }
    }

    /// Evaluate the predicate against one column value, with SQL LIKE
    /// semantics (`%` any run, `_` one char, case-insensitive). The scope
    /// filters below only ever reference the overview page column, so a
    /// single value is enough for testing what a filter admits.
    pub fn matches_page(&self, page: &str) -> bool {
        match self {
            FilterExpr::Like { pattern, .. } => like_match(pattern, page),
            FilterExpr::NotLike { pattern, .. } => !like_match(pattern, page),
            FilterExpr::Eq { value, .. } => value == page,
            FilterExpr::All(parts) => parts.iter().all(|p| p.matches_page(page)),
            FilterExpr::Any(parts) => parts.iter().any(|p| p.matches_page(page)),
        }
    }

    /// Leaf LIKE patterns in tree order, for introspection.
    pub fn like_patterns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_patterns(&mut out, false);
        out
    }

    /// Leaf NOT LIKE patterns in tree order.
    pub fn not_like_patterns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_patterns(&mut out, true);
        out
    }

    fn collect_patterns<'a>(&'a self, out: &mut Vec<&'a str>, negated: bool) {
        match self {
            FilterExpr::Like { pattern, .. } if !negated => out.push(pattern),
            FilterExpr::NotLike { pattern, .. } if negated => out.push(pattern),
            FilterExpr::All(parts) | FilterExpr::Any(parts) => {
                for part in parts {
                    part.collect_patterns(out, negated);
                }
            }
            _ => {}
        }
    }
}

fn join_rendered(parts: &[FilterExpr], sep: &str) -> String {
    let mut out = String::new();
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            out.push_str(sep);
        }
        match part {
            FilterExpr::All(_) | FilterExpr::Any(_) => {
                out.push('(');
                out.push_str(&part.to_where_clause());
                out.push(')');
            }
            _ => out.push_str(&part.to_where_clause()),
        }
    }
    out
}

fn escape_value(value: &str) -> String {
    value.replace('\'', "''")
}

/// Substring patterns marking tier-2-and-below competitions, excluded from
/// regional scopes so academy/development rosters don't pollute main-league
/// totals.
pub const TIER2_EXCLUSIONS: [&str; 20] = [
    "%Academy%",
    "%Challengers%",
    "%Amateur%",
    "%CL%",   // LCK Challengers League
    "%LDL%",  // LPL development league
    "%LTAN%", // LTA North tier 2
    "%LTAS%", // LTA South tier 2
    "%NLC%",
    "%Prime%League%",
    "%Ultraliga%",
    "%SuperLiga%",
    "%LFL%",
    "%LVP%",
    "%PCS%",
    "%VCS%",
    "%LJL%",
    "%LLA%",
    "%CBLOL%",
    "%LCO%",
    "%TCL%",
];

/// Build the overview-page predicate for one tournament/year scope.
///
/// Wiki page names for the same competition vary (`LCK/2025 Season/...`,
/// `LCK 2025 ...`, cup events, renamed leagues), so each known label expands
/// to a tolerant OR-set of patterns. International events (Worlds, MSI) are
/// exempt from the tier-2 exclusions; an empty label widens to everything
/// from that year with no exclusions at all.
pub fn scope_filter(tournament: &str, year: &str) -> FilterExpr {
    let label = tournament.trim();
    let canon = label.to_uppercase();

    let name_patterns: Vec<String> = if label.is_empty() {
        vec![format!("%{year}%")]
    } else if canon == "LCS" && year_at_least(year, 2025) {
        // LCS was folded into the LTA (Americas) league in 2025.
        vec![
            format!("%LTA%{year}%"),
            format!("%LCS%{year}%"),
            format!("%Americas%{year}%"),
        ]
    } else if canon == "LCK" {
        vec![
            format!("LCK/{year}%"),
            format!("LCK {year}%"),
            format!("%LCK%Cup%{year}%"),
        ]
    } else if canon == "LPL" {
        vec![format!("LPL/{year}%"), format!("LPL {year}%")]
    } else if canon == "LEC" {
        vec![format!("LEC/{year}%"), format!("LEC {year}%")]
    } else if canon == "WORLDS" {
        vec![
            format!("%{year}%Season%World%Championship%"),
            format!("%World%Championship%{year}%"),
            format!("%Worlds%{year}%"),
            format!("%{year}%Worlds%"),
        ]
    } else if canon == "MSI" {
        vec![
            format!("%{year}%Mid%Season%Invitational%"),
            format!("%MSI%{year}%"),
            format!("%{year}%MSI%"),
        ]
    } else {
        vec![format!("%{label}%{year}%"), format!("%{label}/{year}%")]
    };

    let mut likes: Vec<FilterExpr> = name_patterns
        .into_iter()
        .map(|p| FilterExpr::like(Field::OverviewPage, p))
        .collect();

    let mut parts = Vec::new();
    parts.push(if likes.len() == 1 {
        likes.remove(0)
    } else {
        FilterExpr::Any(likes)
    });

    if !label.is_empty() && !is_international(&canon) {
        for pattern in TIER2_EXCLUSIONS {
            parts.push(FilterExpr::not_like(Field::OverviewPage, pattern));
        }
    }

    if parts.len() == 1 {
        parts.remove(0)
    } else {
        FilterExpr::All(parts)
    }
}

pub fn is_international(canonical_label: &str) -> bool {
    matches!(canonical_label, "WORLDS" | "MSI")
}

fn year_at_least(year: &str, threshold: i32) -> bool {
    year.trim()
        .parse::<i32>()
        .map(|y| y >= threshold)
        .unwrap_or(false)
}

/// SQL LIKE with `%`/`_` wildcards, case-insensitive.
fn like_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let t: Vec<char> = text.to_lowercase().chars().collect();

    let mut pi = 0usize;
    let mut ti = 0usize;
    let mut star: Option<usize> = None;
    let mut star_ti = 0usize;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '_' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '%' {
            star = Some(pi);
            star_ti = ti;
            pi += 1;
        } else if let Some(star_pi) = star {
            // Backtrack: let the last % absorb one more character.
            pi = star_pi + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '%' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_match_wildcards() {
        assert!(like_match("LCK/2025%", "LCK/2025 Season/Spring"));
        assert!(like_match("%LCK%Cup%2025%", "LCK Cup/2025 Season/Play-ins"));
        assert!(like_match("LCK _025%", "LCK 2025"));
        assert!(!like_match("LCK/2025%", "LCK CL/2025 Season"));
        assert!(like_match("%worlds%", "2025 WORLDS Finals"));
    }

    #[test]
    fn where_clause_escapes_quotes() {
        let expr = FilterExpr::eq(Field::PlayerName, "O'Neil");
        assert_eq!(expr.to_where_clause(), "Player = 'O''Neil'");
    }

    #[test]
    fn where_clause_groups_or_sets() {
        let expr = scope_filter("LPL", "2024");
        let clause = expr.to_where_clause();
        assert!(clause.starts_with("(SP.OverviewPage LIKE 'LPL/2024%'"));
        assert!(clause.contains(" OR SP.OverviewPage LIKE 'LPL 2024%')"));
        assert!(clause.contains("SP.OverviewPage NOT LIKE '%LDL%'"));
    }

    #[test]
    fn empty_label_is_year_wide_without_exclusions() {
        let expr = scope_filter("", "2025");
        assert_eq!(expr, FilterExpr::like(Field::OverviewPage, "%2025%"));
        assert!(expr.matches_page("LFL 2025 Summer"));
    }

    #[test]
    fn lcs_rebrand_cutover() {
        let rebranded = scope_filter("lcs", "2025");
        assert!(rebranded.matches_page("LTA North/2025 Season/Split 1"));
        let legacy = scope_filter("lcs", "2024");
        assert!(!legacy.matches_page("LTA North/2024 Season"));
        assert!(legacy.matches_page("LCS/2024 Season/Summer"));
    }
}
