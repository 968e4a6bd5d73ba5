use std::path::PathBuf;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use league_terminal::league::League;

/// Headless season run: seed the default roster, build a schedule, play every
/// round, and print the final table. `--db PATH` persists to sqlite instead of
/// memory, `--seed N` pins the RNG, `--json` dumps the full view.
fn main() -> Result<()> {
    let mut league = match parse_db_path_arg() {
        Some(path) => League::open(&path)?,
        None => League::in_memory()?,
    };
    let seeded = league.seed_default_teams()?;

    let seed = parse_seed_arg().or_else(|| {
        std::env::var("LEAGUE_SEED")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
    });
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let games = league.generate_season(&mut rng)?;
    let rounds = games.iter().map(|g| g.round + 1).max().unwrap_or(0);
    let outcome = league.play_all_rounds(&mut rng)?;
    let view = outcome.view();

    if std::env::args().skip(1).any(|arg| arg == "--json") {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    println!("Season complete");
    if seeded > 0 {
        println!("Seeded {seeded} default team(s)");
    }
    if let Some(seed) = seed {
        println!("Seed: {seed}");
    }
    println!("Schedule: {} games across {rounds} rounds", games.len());
    println!();
    println!(
        "{:<4}{:<20}{:>3}{:>4}{:>4}{:>4}{:>5}{:>5}",
        "#", "Team", "P", "W", "D", "L", "GD", "Pts"
    );
    for (idx, row) in view.standings.iter().enumerate() {
        println!(
            "{:<4}{:<20}{:>3}{:>4}{:>4}{:>4}{:>5}{:>5}",
            idx + 1,
            row.team,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goal_difference,
            row.points
        );
    }
    println!();
    println!("Title predictions:");
    for prediction in &view.predictions {
        println!("{:<20}{:>8.2}%", prediction.team, prediction.percentage);
    }

    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

fn parse_seed_arg() -> Option<u64> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix("--seed=") {
            if let Ok(seed) = value.trim().parse::<u64>() {
                return Some(seed);
            }
        }
        if arg == "--seed" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if let Ok(seed) = next.trim().parse::<u64>() {
                return Some(seed);
            }
        }
    }
    None
}
