use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rand::rngs::StdRng;
use rand::SeedableRng;

use league_terminal::schedule::generate_fixtures;
use league_terminal::simulate::resolve_remaining_rounds;
use league_terminal::store::{Game, GameScore, Team};
use league_terminal::table::compute_simulation_view;

fn roster(n: usize) -> Vec<Team> {
    (1..=n as i64)
        .map(|id| Team {
            id,
            name: format!("Club {id}"),
            strength: 60 + ((id * 7) % 40) as u8,
        })
        .collect()
}

fn season_games(teams: &[Team], seed: u64) -> Vec<Game> {
    let mut rng = StdRng::seed_from_u64(seed);
    let rounds = generate_fixtures(teams, &mut rng).unwrap();
    let mut games = Vec::new();
    for (round_idx, round) in rounds.iter().enumerate() {
        for fixture in round {
            games.push(Game {
                id: games.len() as i64 + 1,
                round: round_idx as u32,
                home_id: fixture.home_id,
                away_id: fixture.away_id,
                score: None,
            });
        }
    }
    games
}

fn bench_schedule_generate(c: &mut Criterion) {
    let teams = roster(20);
    c.bench_function("schedule_generate_20_teams", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(7);
            let rounds = generate_fixtures(black_box(&teams), &mut rng).unwrap();
            black_box(rounds.len());
        })
    });
}

fn bench_full_season_resolution(c: &mut Criterion) {
    let teams = roster(20);
    let games = season_games(&teams, 11);
    c.bench_function("resolve_full_season_20_teams", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(13);
            let results = resolve_remaining_rounds(black_box(&teams), black_box(&games), &mut rng);
            black_box(results.len());
        })
    });
}

fn bench_view_compute(c: &mut Criterion) {
    let teams = roster(20);
    let mut games = season_games(&teams, 17);
    let mut rng = StdRng::seed_from_u64(19);
    let results = resolve_remaining_rounds(&teams, &games, &mut rng);
    for result in results {
        let game = games.iter_mut().find(|g| g.id == result.game_id).unwrap();
        game.score = Some(GameScore {
            home: result.home_score,
            away: result.away_score,
        });
    }

    c.bench_function("simulation_view_20_teams", |b| {
        b.iter(|| {
            let view = compute_simulation_view(black_box(&teams), black_box(&games));
            black_box(view.standings.len());
        })
    });
}

criterion_group!(
    perf,
    bench_schedule_generate,
    bench_full_season_resolution,
    bench_view_compute
);
criterion_main!(perf);
