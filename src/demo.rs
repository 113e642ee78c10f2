//! Synthetic roster data for running the TUI without wiki access.

use anyhow::Result;
use rand::Rng;
use rusqlite::Connection;

use crate::game_stats::{self, GameRecord};
use crate::roster_store;

const DEMO_TEAMS: [(&str, [&str; 5]); 5] = [
    ("T1", ["Zeus", "Oner", "Faker", "Gumayusi", "Keria"]),
    ("Gen.G", ["Kiin", "Canyon", "Chovy", "Peyz", "Lehends"]),
    ("G2 Esports", ["BrokenBlade", "Yike", "Caps", "Hans Sama", "Mikyx"]),
    ("Fnatic", ["Oscarinin", "Razork", "Humanoid", "Noah", "Jun"]),
    ("Cloud9", ["Fudge", "Blaber", "Jojopyun", "Berserker", "Vulcan"]),
];

const ROLES: [&str; 5] = ["Top", "Jungle", "Mid", "Bot", "Support"];

const CHAMPION_POOLS: [&[&str]; 5] = [
    &["Aatrox", "K'Sante", "Jax", "Renekton"],
    &["Lee Sin", "Viego", "Sejuani", "Maokai"],
    &["Azir", "Ahri", "Orianna", "Sylas"],
    &["Jinx", "Zeri", "Varus", "Kai'Sa"],
    &["Thresh", "Rakan", "Nautilus", "Alistar"],
];

/// Seed the roster with a five-team demo league. Stat lines are generated per
/// game and run through the normal aggregation and upsert path, so the
/// derived rates stay consistent with real imports.
pub fn seed_demo_roster(conn: &mut Connection) -> Result<usize> {
    let records = demo_records(&mut rand::thread_rng());
    let totals = game_stats::aggregate_player_stats(&records);
    roster_store::upsert_all(conn, &totals, |_, _| {})
}

fn demo_records(rng: &mut impl Rng) -> Vec<GameRecord> {
    let mut records = Vec::new();
    for (team, players) in DEMO_TEAMS {
        let strength = rng.gen_range(0.35..0.7);
        let games = rng.gen_range(8..=18);
        for game in 0..games {
            let won = rng.gen_bool(strength);
            let minutes = rng.gen_range(24.0..40.0);
            let game_id = format!("DEMO/{team}/{game}");
            for (slot, ign) in players.iter().enumerate() {
                let (kills, deaths, assists) = demo_kda(rng, slot);
                let pool = CHAMPION_POOLS[slot];
                records.push(GameRecord {
                    player: (*ign).to_string(),
                    role: ROLES[slot].to_string(),
                    team: team.to_string(),
                    champion: pool[rng.gen_range(0..pool.len())].to_string(),
                    kills,
                    deaths,
                    assists,
                    cs: (demo_cs_per_min(rng, slot) * minutes) as u32,
                    gold: (demo_gold_per_min(rng, slot) * minutes) as u64,
                    damage: (demo_damage_per_min(rng, slot) * minutes) as u64,
                    won,
                    game_id: game_id.clone(),
                    game_length_minutes: minutes,
                });
            }
        }
    }
    records
}

// Slot indexes ROLES: Top, Jungle, Mid, Bot, Support.
fn demo_kda(rng: &mut impl Rng, slot: usize) -> (u32, u32, u32) {
    let kills = match slot {
        4 => rng.gen_range(0..=3),
        1 => rng.gen_range(1..=8),
        3 => rng.gen_range(1..=10),
        _ => rng.gen_range(0..=7),
    };
    let deaths = rng.gen_range(0..=6);
    let assists = match slot {
        4 => rng.gen_range(5..=18),
        1 => rng.gen_range(4..=14),
        _ => rng.gen_range(2..=10),
    };
    (kills, deaths, assists)
}

fn demo_cs_per_min(rng: &mut impl Rng, slot: usize) -> f64 {
    match slot {
        4 => rng.gen_range(0.8..2.0),
        1 => rng.gen_range(4.5..6.5),
        _ => rng.gen_range(7.5..10.0),
    }
}

fn demo_gold_per_min(rng: &mut impl Rng, slot: usize) -> f64 {
    match slot {
        4 => rng.gen_range(210.0..280.0),
        1 => rng.gen_range(320.0..390.0),
        _ => rng.gen_range(380.0..470.0),
    }
}

fn demo_damage_per_min(rng: &mut impl Rng, slot: usize) -> f64 {
    match slot {
        4 => rng.gen_range(120.0..350.0),
        1 => rng.gen_range(350.0..650.0),
        _ => rng.gen_range(500.0..950.0),
    }
}
