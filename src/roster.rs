//! Roster model: stored players, their derived rates, and hand-entered
//! lines.

use anyhow::{Result, bail};

use crate::game_stats::PlayerTotals;

/// A player row as stored, with lifetime counters. Rates are derived on
/// demand so the store never persists a value it would have to keep
/// consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub id: i64,
    pub ign: String,
    pub role: String,
    pub team: String,
    pub games_played: u32,
    pub wins: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub total_gold: u64,
    pub total_cs: u64,
    pub total_damage: u64,
    pub total_minutes: f64,
    pub last_updated: String,
}

impl Player {
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.games_played) * 100.0
    }

    /// Deaths floor at one so a deathless run still yields a finite ratio.
    pub fn kda(&self) -> f64 {
        f64::from(self.kills + self.assists) / f64::from(self.deaths.max(1))
    }

    pub fn avg_kills(&self) -> f64 {
        self.per_game(f64::from(self.kills))
    }

    pub fn avg_deaths(&self) -> f64 {
        self.per_game(f64::from(self.deaths))
    }

    pub fn avg_assists(&self) -> f64 {
        self.per_game(f64::from(self.assists))
    }

    pub fn cs_per_min(&self) -> f64 {
        self.per_minute(self.total_cs as f64)
    }

    pub fn gold_per_min(&self) -> f64 {
        self.per_minute(self.total_gold as f64)
    }

    pub fn damage_per_min(&self) -> f64 {
        self.per_minute(self.total_damage as f64)
    }

    fn per_game(&self, total: f64) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            total / f64::from(self.games_played)
        }
    }

    fn per_minute(&self, total: f64) -> f64 {
        if self.total_minutes <= 0.0 {
            0.0
        } else {
            total / self.total_minutes
        }
    }
}

/// A hand-entered roster line. Rates are what people actually know about a
/// player, so totals are reconstructed from them with rough league
/// constants: 30 minute games, five deaths a game, kills as 40% of the KDA
/// numerator.
#[derive(Debug, Clone, Default)]
pub struct ManualEntry {
    pub ign: String,
    pub role: String,
    pub team: String,
    pub games_played: u32,
    pub wins: u32,
    pub kda: f64,
    pub cs_per_min: f64,
    pub gold_per_min: f64,
    pub dmg_per_min: f64,
}

impl ManualEntry {
    pub fn to_totals(&self) -> Result<PlayerTotals> {
        let ign = self.ign.trim();
        if ign.is_empty() {
            bail!("player name is required");
        }
        let games = self.games_played;
        let total_minutes = f64::from(games) * 30.0;
        let deaths = games * 5;
        let total_ka = self.kda.max(0.0) * f64::from(deaths);

        let mut totals = PlayerTotals::new(ign);
        totals.role = self.role.trim().to_string();
        totals.team = self.team.trim().to_string();
        totals.games_played = games;
        totals.wins = self.wins.min(games);
        totals.kills = (total_ka * 0.4) as u32;
        totals.deaths = deaths;
        totals.assists = (total_ka * 0.6) as u32;
        totals.total_cs = (self.cs_per_min.max(0.0) * total_minutes) as u64;
        totals.total_gold = (self.gold_per_min.max(0.0) * total_minutes) as u64;
        totals.total_damage = (self.dmg_per_min.max(0.0) * total_minutes) as u64;
        totals.total_minutes = total_minutes;
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_game_player() -> Player {
        Player {
            ign: "Faker".to_string(),
            games_played: 2,
            wins: 1,
            kills: 7,
            deaths: 6,
            assists: 15,
            total_minutes: 58.0,
            ..Player::default()
        }
    }

    #[test]
    fn rates_from_totals() {
        let player = two_game_player();
        assert_eq!(player.win_rate(), 50.0);
        assert!((player.kda() - 22.0 / 6.0).abs() < 1e-9);
        assert_eq!(player.avg_kills(), 3.5);
        assert_eq!(player.avg_deaths(), 3.0);
        assert_eq!(player.avg_assists(), 7.5);
    }

    #[test]
    fn empty_player_has_zero_rates() {
        let player = Player::default();
        assert_eq!(player.win_rate(), 0.0);
        assert_eq!(player.kda(), 0.0);
        assert_eq!(player.avg_kills(), 0.0);
        assert_eq!(player.cs_per_min(), 0.0);
    }

    #[test]
    fn deathless_run_keeps_kda_finite() {
        let mut player = two_game_player();
        player.deaths = 0;
        assert_eq!(player.kda(), 22.0);
    }

    #[test]
    fn manual_entry_reconstructs_totals() {
        let entry = ManualEntry {
            ign: "Ruler".to_string(),
            role: "Bot".to_string(),
            team: "JDG".to_string(),
            games_played: 10,
            wins: 7,
            kda: 3.0,
            cs_per_min: 8.5,
            gold_per_min: 420.0,
            dmg_per_min: 650.0,
        };
        let totals = entry.to_totals().unwrap();
        assert_eq!(totals.total_minutes, 300.0);
        assert_eq!(totals.deaths, 50);
        assert_eq!(totals.kills, 60);
        assert_eq!(totals.assists, 90);
        assert_eq!(totals.total_cs, 2550);
        assert_eq!(totals.total_gold, 126_000);
        assert_eq!(totals.total_damage, 195_000);
        assert_eq!(totals.wins, 7);
    }

    #[test]
    fn manual_entry_with_zero_games_is_empty() {
        let entry = ManualEntry {
            ign: "Rookie".to_string(),
            kda: 4.0,
            cs_per_min: 9.0,
            gold_per_min: 400.0,
            ..ManualEntry::default()
        };
        let totals = entry.to_totals().unwrap();
        assert_eq!(totals.games_played, 0);
        assert_eq!(totals.kills, 0);
        assert_eq!(totals.total_cs, 0);
        assert_eq!(totals.total_gold, 0);
        assert_eq!(totals.total_minutes, 0.0);
    }

    #[test]
    fn manual_entry_requires_a_name() {
        let entry = ManualEntry {
            ign: "   ".to_string(),
            ..ManualEntry::default()
        };
        assert!(entry.to_totals().is_err());
    }
}
