pub mod error;
pub mod export;
pub mod league;
pub mod schedule;
pub mod scoring;
pub mod simulate;
pub mod state;
pub mod store;
pub mod table;
pub mod team_cache;
