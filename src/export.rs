use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::table::{FixtureRow, Prediction, SimulationView, StandingsRow};

pub struct ExportReport {
    pub standings: usize,
    pub fixtures: usize,
    pub predictions: usize,
}

pub fn default_export_path() -> PathBuf {
    if let Ok(path) = env::var("LEAGUE_EXPORT_PATH") {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from("league_report.xlsx")
}

/// Write the current view as a three-sheet workbook: the table, the round by
/// round fixture list, and the title race.
pub fn export_simulation(path: &Path, view: &SimulationView) -> Result<ExportReport> {
    let mut standings_rows = vec![vec![
        "Pos".to_string(),
        "Team".to_string(),
        "P".to_string(),
        "W".to_string(),
        "D".to_string(),
        "L".to_string(),
        "GD".to_string(),
        "Pts".to_string(),
        "Max Pts".to_string(),
        "Strength".to_string(),
    ]];
    for (idx, row) in view.standings.iter().enumerate() {
        standings_rows.push(standings_row(idx + 1, row));
    }

    let mut fixtures_rows = vec![vec![
        "Round".to_string(),
        "Home".to_string(),
        "Score".to_string(),
        "Away".to_string(),
    ]];
    for fixture in &view.fixtures {
        fixtures_rows.push(fixture_row(fixture));
    }

    let mut predictions_rows = vec![vec!["Team".to_string(), "Title Chance %".to_string()]];
    for prediction in &view.predictions {
        predictions_rows.push(prediction_row(prediction));
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &standings_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Fixtures")?;
        write_rows(sheet, &fixtures_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions")?;
        write_rows(sheet, &predictions_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        standings: standings_rows.len().saturating_sub(1),
        fixtures: fixtures_rows.len().saturating_sub(1),
        predictions: predictions_rows.len().saturating_sub(1),
    })
}

fn standings_row(position: usize, row: &StandingsRow) -> Vec<String> {
    vec![
        position.to_string(),
        row.team.clone(),
        row.played.to_string(),
        row.won.to_string(),
        row.drawn.to_string(),
        row.lost.to_string(),
        row.goal_difference.to_string(),
        row.points.to_string(),
        row.max_points.to_string(),
        row.strength.to_string(),
    ]
}

fn fixture_row(fixture: &FixtureRow) -> Vec<String> {
    let score = match (fixture.home_score, fixture.away_score) {
        (Some(home), Some(away)) => format!("{home} - {away}"),
        _ => "-".to_string(),
    };
    vec![
        (fixture.round + 1).to_string(),
        fixture.home.clone(),
        score,
        fixture.away.clone(),
    ]
}

fn prediction_row(prediction: &Prediction) -> Vec<String> {
    vec![
        prediction.team.clone(),
        format!("{:.2}", prediction.percentage),
    ]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
