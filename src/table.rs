//! League table, fixture list, and title predictions derived from the stored
//! season. Everything here is a pure function of teams + games.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::store::{Game, Team};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsRow {
    pub team_id: i64,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goal_difference: i32,
    pub points: u32,
    /// Best finish still reachable: current points plus three per remaining
    /// game. Remaining games are split evenly across the league, so this can
    /// land on a half point.
    pub max_points: f64,
    pub strength: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub team: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureRow {
    pub game_id: i64,
    pub round: u32,
    pub home_id: i64,
    pub away_id: i64,
    pub home: String,
    pub away: String,
    pub home_score: Option<u8>,
    pub away_score: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationView {
    pub standings: Vec<StandingsRow>,
    pub fixtures: Vec<FixtureRow>,
    pub predictions: Vec<Prediction>,
    pub total_games: u32,
    pub played_games: u32,
}

/// Fold the season into standings, the readable fixture list, and the title
/// race. Standings sort by points, then goal difference, then the original
/// team order; predictions sort by percentage with ties kept in team order.
pub fn compute_simulation_view(teams: &[Team], games: &[Game]) -> SimulationView {
    let order: Vec<i64> = teams.iter().map(|team| team.id).collect();
    let mut rows: HashMap<i64, StandingsRow> = teams
        .iter()
        .map(|team| {
            (
                team.id,
                StandingsRow {
                    team_id: team.id,
                    team: team.name.clone(),
                    played: 0,
                    won: 0,
                    drawn: 0,
                    lost: 0,
                    goal_difference: 0,
                    points: 0,
                    max_points: 0.0,
                    strength: team.strength,
                },
            )
        })
        .collect();

    let mut played_games = 0u32;
    for game in games {
        let Some(score) = game.score else { continue };
        played_games += 1;
        // A result only counts when both sides are still in the league.
        if !(rows.contains_key(&game.home_id) && rows.contains_key(&game.away_id)) {
            continue;
        }
        if let Some(row) = rows.get_mut(&game.home_id) {
            apply_result(row, score.home, score.away);
        }
        if let Some(row) = rows.get_mut(&game.away_id) {
            apply_result(row, score.away, score.home);
        }
    }

    let total_games = games.len() as u32;
    let remaining_games = total_games - played_games;
    let per_team_remaining = f64::from(remaining_games) / 2.0;
    for row in rows.values_mut() {
        row.max_points = f64::from(row.points) + per_team_remaining * 3.0;
    }

    let mut standings: Vec<StandingsRow> = order
        .iter()
        .filter_map(|id| rows.get(id).cloned())
        .collect();
    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
    });

    let mut predictions = Vec::new();
    if total_games > 0 {
        let leader_points = standings.iter().map(|row| row.points).max().unwrap_or(0);
        let leader_gd = standings
            .iter()
            .filter(|row| row.points == leader_points)
            .map(|row| row.goal_difference)
            .max()
            .unwrap_or(0);

        for id in &order {
            let Some(row) = rows.get(id) else { continue };
            // Below the leader's banked points even in the best case means out
            // of the race, no matter the strength.
            let percentage = if row.max_points < f64::from(leader_points) {
                0.0
            } else if remaining_games == 0 {
                if row.points == leader_points && row.goal_difference == leader_gd {
                    100.0
                } else {
                    0.0
                }
            } else {
                let points_factor = f64::from(row.points) / f64::from(total_games);
                let max_points_factor = row.max_points / (f64::from(total_games) * 3.0);
                let strength_factor = f64::from(row.strength) / 100.0;
                round2((points_factor + max_points_factor + strength_factor) / 3.0 * 100.0)
            };
            predictions.push(Prediction {
                team: row.team.clone(),
                percentage,
            });
        }
        predictions.sort_by(|a, b| {
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(Ordering::Equal)
        });
    }

    let names: HashMap<i64, &str> = teams
        .iter()
        .map(|team| (team.id, team.name.as_str()))
        .collect();
    let fixtures = games
        .iter()
        .map(|game| FixtureRow {
            game_id: game.id,
            round: game.round,
            home_id: game.home_id,
            away_id: game.away_id,
            home: names.get(&game.home_id).copied().unwrap_or("?").to_string(),
            away: names.get(&game.away_id).copied().unwrap_or("?").to_string(),
            home_score: game.score.map(|s| s.home),
            away_score: game.score.map(|s| s.away),
        })
        .collect();

    SimulationView {
        standings,
        fixtures,
        predictions,
        total_games,
        played_games,
    }
}

fn apply_result(row: &mut StandingsRow, scored: u8, conceded: u8) {
    row.played += 1;
    row.goal_difference += i32::from(scored) - i32::from(conceded);
    match scored.cmp(&conceded) {
        Ordering::Greater => {
            row.won += 1;
            row.points += 3;
        }
        Ordering::Less => {
            row.lost += 1;
        }
        Ordering::Equal => {
            row.drawn += 1;
            row.points += 1;
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
