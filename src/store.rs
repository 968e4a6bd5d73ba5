use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::EngineError;
use crate::schedule::Fixture;
use crate::simulate::ScoredResult;

const CACHE_DIR: &str = "league_terminal";
const DB_FILE: &str = "league.sqlite";

/// Default strengths for a fresh database, matching the seed roster the
/// simulator ships with.
const DEFAULT_TEAMS: &[(&str, u8)] = &[
    ("Liverpool", 90),
    ("Manchester City", 92),
    ("Chelsea", 88),
    ("Arsenal", 85),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub strength: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameScore {
    pub home: u8,
    pub away: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: i64,
    pub round: u32,
    pub home_id: i64,
    pub away_id: i64,
    /// `None` until the game is played; a row with only one score column set
    /// fails to load at all.
    pub score: Option<GameScore>,
}

impl Game {
    pub fn is_played(&self) -> bool {
        self.score.is_some()
    }
}

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("LEAGUE_DB_PATH") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(DB_FILE));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(DB_FILE))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS teams (
            team_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            strength INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS games (
            game_id INTEGER PRIMARY KEY,
            round INTEGER NOT NULL,
            home_team_id INTEGER NOT NULL REFERENCES teams(team_id) ON DELETE CASCADE,
            away_team_id INTEGER NOT NULL REFERENCES teams(team_id) ON DELETE CASCADE,
            home_score INTEGER NULL,
            away_score INTEGER NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_games_home_away ON games(home_team_id, away_team_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Insert the default roster when the teams table is empty. Returns how many
/// teams were inserted (0 when the table already had rows).
pub fn seed_default_teams(conn: &Connection) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))
        .context("count teams")?;
    if count > 0 {
        return Ok(0);
    }
    for (name, strength) in DEFAULT_TEAMS {
        insert_team(conn, name, *strength)?;
    }
    Ok(DEFAULT_TEAMS.len())
}

pub fn load_teams(conn: &Connection) -> Result<Vec<Team>> {
    let mut stmt = conn
        .prepare("SELECT team_id, name, strength FROM teams ORDER BY team_id ASC")
        .context("prepare load teams query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                strength: row.get(2)?,
            })
        })
        .context("query teams")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode team row")?);
    }
    Ok(out)
}

pub fn insert_team(conn: &Connection, name: &str, strength: u8) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO teams(name, strength, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![name, strength, now],
    )
    .with_context(|| format!("insert team {name}"))?;
    Ok(conn.last_insert_rowid())
}

pub fn rename_team(conn: &Connection, team_id: i64, name: &str) -> Result<()> {
    conn.execute(
        "UPDATE teams SET name = ?1, updated_at = ?2 WHERE team_id = ?3",
        params![name, Utc::now().to_rfc3339(), team_id],
    )
    .with_context(|| format!("rename team {team_id}"))?;
    Ok(())
}

pub fn set_team_strength(conn: &Connection, team_id: i64, strength: u8) -> Result<()> {
    conn.execute(
        "UPDATE teams SET strength = ?1, updated_at = ?2 WHERE team_id = ?3",
        params![strength, Utc::now().to_rfc3339(), team_id],
    )
    .with_context(|| format!("update strength for team {team_id}"))?;
    Ok(())
}

/// Removing a team cascades into its games via the schema's foreign keys.
pub fn delete_team(conn: &Connection, team_id: i64) -> Result<()> {
    conn.execute("DELETE FROM teams WHERE team_id = ?1", params![team_id])
        .with_context(|| format!("delete team {team_id}"))?;
    Ok(())
}

/// Load the full season in id order. Id order is the order fixtures were
/// generated in, and the simulator's candidate scan depends on it.
pub fn load_games(conn: &Connection) -> Result<Vec<Game>> {
    let mut stmt = conn
        .prepare(
            "SELECT game_id, round, home_team_id, away_team_id, home_score, away_score
             FROM games ORDER BY game_id ASC",
        )
        .context("prepare load games query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, Option<u8>>(4)?,
                row.get::<_, Option<u8>>(5)?,
            ))
        })
        .context("query games")?;

    let mut out = Vec::new();
    for row in rows {
        let (id, round, home_id, away_id, home_score, away_score) =
            row.context("decode game row")?;
        let score = match (home_score, away_score) {
            (Some(home), Some(away)) => Some(GameScore { home, away }),
            (None, None) => None,
            // One NULL and one value means some writer bypassed the paired
            // result update; refuse to hand that row to the engine.
            _ => return Err(EngineError::HalfScoredGame { game_id: id }.into()),
        };
        out.push(Game {
            id,
            round,
            home_id,
            away_id,
            score,
        });
    }
    Ok(out)
}

/// Throw away the current season and insert the new one in a single
/// transaction, so readers never observe a half-replaced schedule.
pub fn replace_season(conn: &mut Connection, rounds: &[Vec<Fixture>]) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin season replace")?;
    tx.execute("DELETE FROM games", [])
        .context("clear previous season")?;

    let mut inserted = 0usize;
    for (round_idx, round) in rounds.iter().enumerate() {
        for fixture in round {
            tx.execute(
                "INSERT INTO games(round, home_team_id, away_team_id, home_score, away_score, created_at, updated_at)
                 VALUES (?1, ?2, ?3, NULL, NULL, ?4, ?4)",
                params![round_idx as i64, fixture.home_id, fixture.away_id, now],
            )
            .context("insert fixture")?;
            inserted += 1;
        }
    }

    tx.commit().context("commit season replace")?;
    Ok(inserted)
}

/// Write a batch of resolved results; both scores land together or not at all.
pub fn save_results(conn: &mut Connection, results: &[ScoredResult]) -> Result<()> {
    if results.is_empty() {
        return Ok(());
    }
    let now = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin result save")?;
    for result in results {
        tx.execute(
            "UPDATE games SET home_score = ?1, away_score = ?2, updated_at = ?3 WHERE game_id = ?4",
            params![result.home_score, result.away_score, now, result.game_id],
        )
        .with_context(|| format!("save result for game {}", result.game_id))?;
    }
    tx.commit().context("commit result save")?;
    Ok(())
}

/// Blank every score while keeping the fixture list and round layout intact.
/// Returns the number of games touched.
pub fn clear_results(conn: &Connection) -> Result<usize> {
    let cleared = conn
        .execute(
            "UPDATE games SET home_score = NULL, away_score = NULL, updated_at = ?1",
            params![Utc::now().to_rfc3339()],
        )
        .context("clear results")?;
    Ok(cleared)
}
