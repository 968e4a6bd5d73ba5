use std::env;
use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use league_terminal::export;
use league_terminal::league::{League, RoundOutcome};
use league_terminal::state::{fixture_lines, screen_label, AppState, Screen};
use league_terminal::store;

/// Names handed out when a new club joins from the Teams screen.
const CLUB_POOL: &[&str] = &[
    "Everton",
    "Tottenham",
    "Newcastle",
    "Aston Villa",
    "West Ham",
    "Brighton",
    "Fulham",
    "Brentford",
];

struct App {
    state: AppState,
    league: League,
    rng: StdRng,
    seed: Option<u64>,
    should_quit: bool,
}

impl App {
    fn new(league: League, db_label: String) -> Self {
        let seed = env::var("LEAGUE_SEED")
            .ok()
            .and_then(|val| val.parse::<u64>().ok());
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: AppState::new(db_label),
            league,
            rng,
            seed,
            should_quit: false,
        }
    }

    fn bootstrap(&mut self) -> Result<()> {
        let seeded = self.league.seed_default_teams()?;
        if seeded > 0 {
            self.state
                .push_log(format!("[INFO] Seeded {seeded} default team(s)"));
        }
        if let Some(seed) = self.seed {
            self.state.push_log(format!("[INFO] RNG seed {seed}"));
        }
        self.refresh_all();
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('1') => self.state.screen = Screen::Table,
            KeyCode::Char('2') => self.state.screen = Screen::Fixtures,
            KeyCode::Char('3') => self.state.screen = Screen::Teams,
            KeyCode::Char('g') => self.generate_season(),
            KeyCode::Char('n') => self.play_next(),
            KeyCode::Char('a') => self.play_all(),
            KeyCode::Char('r') => self.reset_results(),
            KeyCode::Char('e') => self.export_report(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('c') => self.add_team(),
            KeyCode::Char('x') => self.remove_team(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_strength(5),
            KeyCode::Char('-') => self.adjust_strength(-5),
            _ => {}
        }
    }

    fn refresh_all(&mut self) {
        match self.league.teams() {
            Ok(teams) => self.state.set_teams(teams),
            Err(err) => self
                .state
                .push_log(format!("[WARN] Roster load failed: {err:#}")),
        }
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        match self.league.simulation_view() {
            Ok(view) => self.state.set_view(view),
            Err(err) => self
                .state
                .push_log(format!("[WARN] View refresh failed: {err:#}")),
        }
    }

    fn generate_season(&mut self) {
        match self.league.generate_season(&mut self.rng) {
            Ok(games) => {
                let rounds = games.iter().map(|g| g.round + 1).max().unwrap_or(0);
                self.state.push_log(format!(
                    "[INFO] Scheduled {} games across {rounds} rounds",
                    games.len()
                ));
                self.refresh_view();
            }
            Err(err) => self
                .state
                .push_log(format!("[WARN] Schedule failed: {err:#}")),
        }
    }

    fn play_next(&mut self) {
        match self.league.play_next_round(&mut self.rng) {
            Ok(RoundOutcome::Played { games_played, view }) => {
                self.state
                    .push_log(format!("[INFO] Played {games_played} game(s)"));
                self.state.set_view(view);
            }
            Ok(RoundOutcome::NothingToPlay { view }) => {
                self.state.push_log("[INFO] All games have been played");
                self.state.set_view(view);
            }
            Err(err) => self
                .state
                .push_log(format!("[WARN] Play round failed: {err:#}")),
        }
    }

    fn play_all(&mut self) {
        match self.league.play_all_rounds(&mut self.rng) {
            Ok(RoundOutcome::Played { games_played, view }) => {
                self.state.push_log(format!(
                    "[INFO] Played {games_played} game(s) to finish the season"
                ));
                self.state.set_view(view);
            }
            Ok(RoundOutcome::NothingToPlay { view }) => {
                self.state.push_log("[INFO] All games have been played");
                self.state.set_view(view);
            }
            Err(err) => self
                .state
                .push_log(format!("[WARN] Play season failed: {err:#}")),
        }
    }

    fn reset_results(&mut self) {
        match self.league.reset_results() {
            Ok(view) => {
                self.state
                    .push_log(format!("[INFO] Reset {} game(s)", view.total_games));
                self.state.set_view(view);
            }
            Err(err) => self.state.push_log(format!("[WARN] Reset failed: {err:#}")),
        }
    }

    fn export_report(&mut self) {
        let path = export::default_export_path();
        match export::export_simulation(&path, &self.state.view) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} standings / {} fixtures / {} predictions to {}",
                report.standings,
                report.fixtures,
                report.predictions,
                path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }

    fn add_team(&mut self) {
        if self.state.screen != Screen::Teams {
            return;
        }
        let name = self.next_pool_name();
        let strength = self.rng.gen_range(60..=95);
        match self.league.add_team(&name, strength) {
            Ok(_) => {
                self.state
                    .push_log(format!("[INFO] Added {name} (strength {strength})"));
                self.refresh_all();
            }
            Err(err) => self
                .state
                .push_log(format!("[WARN] Add team failed: {err:#}")),
        }
    }

    fn remove_team(&mut self) {
        if self.state.screen != Screen::Teams {
            return;
        }
        let Some(team) = self.state.selected_team().cloned() else {
            self.state.push_log("[INFO] No team selected");
            return;
        };
        match self.league.remove_team(team.id) {
            Ok(()) => {
                self.state
                    .push_log(format!("[INFO] Removed {} and its games", team.name));
                self.refresh_all();
            }
            Err(err) => self
                .state
                .push_log(format!("[WARN] Remove team failed: {err:#}")),
        }
    }

    fn adjust_strength(&mut self, delta: i16) {
        if self.state.screen != Screen::Teams {
            return;
        }
        let Some(team) = self.state.selected_team().cloned() else {
            self.state.push_log("[INFO] No team selected");
            return;
        };
        let strength = (i16::from(team.strength) + delta).clamp(1, 100) as u8;
        if strength == team.strength {
            return;
        }
        match self.league.set_team_strength(team.id, strength) {
            Ok(()) => {
                self.state.push_log(format!(
                    "[INFO] {} strength {} -> {strength}",
                    team.name, team.strength
                ));
                self.refresh_all();
            }
            Err(err) => self
                .state
                .push_log(format!("[WARN] Strength update failed: {err:#}")),
        }
    }

    fn next_pool_name(&self) -> String {
        for name in CLUB_POOL {
            if !self.state.teams.iter().any(|team| team.name == *name) {
                return (*name).to_string();
            }
        }
        format!("Club {}", self.state.teams.len() + 1)
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let db_path = store::default_db_path().context("could not determine a league database path")?;
    let league = League::open(&db_path)?;
    let mut app = App::new(league, db_path.display().to_string());
    app.bootstrap()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Table => render_table(frame, chunks[1], &app.state),
        Screen::Fixtures => render_fixtures(frame, chunks[1], &app.state),
        Screen::Teams => render_teams(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = format!(
        "  LEAGUE TERMINAL | {} | Played {}/{}",
        screen_label(state.screen),
        state.view.played_games,
        state.view.total_games
    );
    let line2 = format!("  db: {}", state.db_label);
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Table => {
            "1 Table | 2 Fixtures | 3 Teams | g Generate | n Next round | a Play all | r Reset | e Export | ? Help | q Quit".to_string()
        }
        Screen::Fixtures => {
            "1 Table | 3 Teams | j/k/↑/↓ Scroll | g Generate | n Next round | a Play all | ? Help | q Quit".to_string()
        }
        Screen::Teams => {
            "1 Table | j/k/↑/↓ Move | c Add | x Remove | +/- Strength | ? Help | q Quit".to_string()
        }
    }
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(46), Constraint::Length(34)])
        .split(area);

    render_standings(frame, columns[0], state);
    render_predictions(frame, columns[1], state);
}

fn standings_columns() -> [Constraint; 10] {
    [
        Constraint::Length(4),
        Constraint::Min(14),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(4),
    ]
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Standings").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let widths = standings_columns();
    let header_area = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: 1,
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(header_area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, cols[0], "#", style);
    render_cell_text(frame, cols[1], "Team", style);
    render_cell_text(frame, cols[2], "P", style);
    render_cell_text(frame, cols[3], "W", style);
    render_cell_text(frame, cols[4], "D", style);
    render_cell_text(frame, cols[5], "L", style);
    render_cell_text(frame, cols[6], "GD", style);
    render_cell_text(frame, cols[7], "Pts", style);
    render_cell_text(frame, cols[8], "Max", style);
    render_cell_text(frame, cols[9], "Str", style);

    for (idx, row) in state.view.standings.iter().enumerate() {
        let y = inner.y + 1 + idx as u16;
        if y >= inner.y + inner.height {
            break;
        }
        let row_area = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        render_cell_text(frame, cols[0], &(idx + 1).to_string(), Style::default());
        render_cell_text(frame, cols[1], &row.team, Style::default());
        render_cell_text(frame, cols[2], &row.played.to_string(), Style::default());
        render_cell_text(frame, cols[3], &row.won.to_string(), Style::default());
        render_cell_text(frame, cols[4], &row.drawn.to_string(), Style::default());
        render_cell_text(frame, cols[5], &row.lost.to_string(), Style::default());
        render_cell_text(
            frame,
            cols[6],
            &row.goal_difference.to_string(),
            Style::default(),
        );
        render_cell_text(frame, cols[7], &row.points.to_string(), Style::default());
        render_cell_text(frame, cols[8], &row.max_points.to_string(), Style::default());
        render_cell_text(frame, cols[9], &row.strength.to_string(), Style::default());
    }
}

fn render_predictions(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Title Race").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if state.view.predictions.is_empty() {
        let empty = Paragraph::new("No predictions yet; press g to schedule a season")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let bars: Vec<Bar> = state
        .view
        .predictions
        .iter()
        .map(|prediction| {
            let style = if prediction.percentage == 0.0 {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            };
            Bar::default()
                .value(prediction.percentage.round().clamp(0.0, 100.0) as u64)
                .label(Line::from(prediction.team.clone()))
                .text_value(format!("{:.2}%", prediction.percentage))
                .style(style)
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(100);
    frame.render_widget(chart, inner);
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Fixtures").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let lines = fixture_lines(&state.view);
    if lines.is_empty() {
        let empty = Paragraph::new("No fixtures yet; press g to schedule a season")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let total = lines.len();
    let max_start = total.saturating_sub(visible);
    let start = (state.fixtures_scroll as usize).min(max_start);
    let end = (start + visible).min(total);

    let text = lines[start..end].join("\n");
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Teams").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let paragraph = Paragraph::new(teams_text(state));
    frame.render_widget(paragraph, inner);
}

fn teams_text(state: &AppState) -> String {
    if state.teams.is_empty() {
        return "No teams; press c to add one".to_string();
    }
    state
        .teams
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            let prefix = if idx == state.team_selected { "> " } else { "  " };
            format!(
                "{prefix}{:>3}  {:<20} strength {:>3}",
                team.id, team.name, team.strength
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "League Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Table / Fixtures / Teams",
        "  g            Generate a fresh schedule",
        "  n            Play the next round",
        "  a            Play all remaining rounds",
        "  r            Reset results (keep schedule)",
        "  e            Export xlsx report",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Fixtures:",
        "  j/k or ↑/↓   Scroll",
        "",
        "Teams:",
        "  j/k or ↑/↓   Move",
        "  c / x        Add / remove a club",
        "  + / -        Adjust strength",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
