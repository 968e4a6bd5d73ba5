use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use rusqlite::Connection;

use crate::schedule;
use crate::simulate;
use crate::store::{self, Game, Team};
use crate::table::{compute_simulation_view, SimulationView};
use crate::team_cache::TeamCache;

/// The league service: one sqlite handle, the roster cache in front of it,
/// and the simulation operations the UI calls. Randomness always comes in
/// from the caller so seeded runs stay reproducible.
pub struct League {
    conn: Connection,
    cache: TeamCache,
}

/// What a play call did. `NothingToPlay` is a normal outcome, not an error;
/// both variants carry the view recomputed from what is now stored.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    Played {
        games_played: usize,
        view: SimulationView,
    },
    NothingToPlay {
        view: SimulationView,
    },
}

impl RoundOutcome {
    pub fn view(&self) -> &SimulationView {
        match self {
            RoundOutcome::Played { view, .. } | RoundOutcome::NothingToPlay { view } => view,
        }
    }

    pub fn games_played(&self) -> usize {
        match self {
            RoundOutcome::Played { games_played, .. } => *games_played,
            RoundOutcome::NothingToPlay { .. } => 0,
        }
    }
}

impl League {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            cache: TeamCache::new(),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(store::open_db(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(store::open_in_memory()?))
    }

    /// Insert the default roster when the database is empty.
    pub fn seed_default_teams(&self) -> Result<usize> {
        let inserted = store::seed_default_teams(&self.conn)?;
        if inserted > 0 {
            self.cache.invalidate();
        }
        Ok(inserted)
    }

    pub fn teams(&self) -> Result<Vec<Team>> {
        self.cache
            .get_or_load(|| store::load_teams(&self.conn))
            .context("load teams")
    }

    pub fn games(&self) -> Result<Vec<Game>> {
        store::load_games(&self.conn)
    }

    /// Replace whatever season is stored with a fresh double round-robin
    /// schedule over the current roster. Old games, played or not, are gone.
    /// Returns the stored match list of the new season.
    pub fn generate_season<R: Rng>(&mut self, rng: &mut R) -> Result<Vec<Game>> {
        let teams = self.teams()?;
        let rounds = schedule::generate_fixtures(&teams, rng)?;
        store::replace_season(&mut self.conn, &rounds)?;
        self.games()
    }

    pub fn play_next_round<R: Rng>(&mut self, rng: &mut R) -> Result<RoundOutcome> {
        let teams = self.teams()?;
        let games = self.games()?;
        let results = simulate::resolve_next_round(&teams, &games, rng);
        self.finish_play(&teams, games, results)
    }

    pub fn play_all_rounds<R: Rng>(&mut self, rng: &mut R) -> Result<RoundOutcome> {
        let teams = self.teams()?;
        let games = self.games()?;
        let results = simulate::resolve_remaining_rounds(&teams, &games, rng);
        self.finish_play(&teams, games, results)
    }

    fn finish_play(
        &mut self,
        teams: &[Team],
        games: Vec<Game>,
        results: Vec<simulate::ScoredResult>,
    ) -> Result<RoundOutcome> {
        if results.is_empty() {
            return Ok(RoundOutcome::NothingToPlay {
                view: compute_simulation_view(teams, &games),
            });
        }
        store::save_results(&mut self.conn, &results)?;
        let games = self.games()?;
        Ok(RoundOutcome::Played {
            games_played: results.len(),
            view: compute_simulation_view(teams, &games),
        })
    }

    /// Blank all scores but keep the schedule, then hand back the zeroed view.
    pub fn reset_results(&self) -> Result<SimulationView> {
        store::clear_results(&self.conn)?;
        self.simulation_view()
    }

    pub fn simulation_view(&self) -> Result<SimulationView> {
        let teams = self.teams()?;
        let games = self.games()?;
        Ok(compute_simulation_view(&teams, &games))
    }

    pub fn add_team(&self, name: &str, strength: u8) -> Result<i64> {
        let id = store::insert_team(&self.conn, name, strength)?;
        self.cache.invalidate();
        Ok(id)
    }

    pub fn rename_team(&self, team_id: i64, name: &str) -> Result<()> {
        store::rename_team(&self.conn, team_id, name)?;
        self.cache.invalidate();
        Ok(())
    }

    pub fn set_team_strength(&self, team_id: i64, strength: u8) -> Result<()> {
        store::set_team_strength(&self.conn, team_id, strength)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Drops the team and, through the schema's cascade, all of its games.
    pub fn remove_team(&self, team_id: i64) -> Result<()> {
        store::delete_team(&self.conn, team_id)?;
        self.cache.invalidate();
        Ok(())
    }
}
