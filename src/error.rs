use thiserror::Error;

/// Failures the engine itself can detect. Storage and UI errors stay on the
/// `anyhow` side; this enum exists so callers can match on the conditions
/// that have defined recovery paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot build a schedule for {count} team(s); at least 2 are required")]
    TooFewTeams { count: usize },

    #[error("game {game_id} has exactly one score recorded; results must be written as a pair")]
    HalfScoredGame { game_id: i64 },
}
