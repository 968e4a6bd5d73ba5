use std::collections::VecDeque;

use crate::store::Team;
use crate::table::SimulationView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Table,
    Fixtures,
    Teams,
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Table => "TABLE",
        Screen::Fixtures => "FIXTURES",
        Screen::Teams => "TEAMS",
    }
}

/// Everything the renderer needs: the current screen, the latest simulation
/// view, the roster, and the log ring. All mutation happens on the input
/// thread, so no locks here.
pub struct AppState {
    pub screen: Screen,
    pub view: SimulationView,
    pub teams: Vec<Team>,
    pub team_selected: usize,
    pub fixtures_scroll: u16,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub db_label: String,
}

impl AppState {
    pub fn new(db_label: impl Into<String>) -> Self {
        Self {
            screen: Screen::Table,
            view: SimulationView::default(),
            teams: Vec::new(),
            team_selected: 0,
            fixtures_scroll: 0,
            help_overlay: false,
            logs: VecDeque::with_capacity(200),
            db_label: db_label.into(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn set_view(&mut self, view: SimulationView) {
        self.view = view;
        self.clamp_fixtures_scroll();
    }

    pub fn set_teams(&mut self, teams: Vec<Team>) {
        self.teams = teams;
        if self.team_selected >= self.teams.len() {
            self.team_selected = self.teams.len().saturating_sub(1);
        }
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.teams.get(self.team_selected)
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Fixtures => self.scroll_fixtures_down(),
            Screen::Teams => {
                let total = self.teams.len();
                if total == 0 {
                    self.team_selected = 0;
                    return;
                }
                self.team_selected = (self.team_selected + 1) % total;
            }
            Screen::Table => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Fixtures => self.scroll_fixtures_up(),
            Screen::Teams => {
                let total = self.teams.len();
                if total == 0 {
                    self.team_selected = 0;
                    return;
                }
                self.team_selected = (self.team_selected + total - 1) % total;
            }
            Screen::Table => {}
        }
    }

    pub fn fixture_line_count(&self) -> usize {
        fixture_lines(&self.view).len()
    }

    fn scroll_fixtures_down(&mut self) {
        let max_lines = self.fixture_line_count();
        if max_lines == 0 {
            self.fixtures_scroll = 0;
            return;
        }
        let max_scroll = (max_lines - 1).min(u16::MAX as usize) as u16;
        if self.fixtures_scroll < max_scroll {
            self.fixtures_scroll += 1;
        }
    }

    fn scroll_fixtures_up(&mut self) {
        self.fixtures_scroll = self.fixtures_scroll.saturating_sub(1);
    }

    fn clamp_fixtures_scroll(&mut self) {
        let max_lines = self.fixture_line_count();
        if max_lines == 0 {
            self.fixtures_scroll = 0;
            return;
        }
        let max_scroll = (max_lines - 1).min(u16::MAX as usize) as u16;
        if self.fixtures_scroll > max_scroll {
            self.fixtures_scroll = max_scroll;
        }
    }
}

/// Flatten the fixture list into display lines, one heading per round.
/// Rounds are stored zero-based and shown one-based.
pub fn fixture_lines(view: &SimulationView) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_round: Option<u32> = None;
    for fixture in &view.fixtures {
        if current_round != Some(fixture.round) {
            current_round = Some(fixture.round);
            lines.push(format!("Round {}", fixture.round + 1));
        }
        let line = match (fixture.home_score, fixture.away_score) {
            (Some(home), Some(away)) => {
                format!("  {} {} - {} {}", fixture.home, home, away, fixture.away)
            }
            _ => format!("  {} vs {}", fixture.home, fixture.away),
        };
        lines.push(line);
    }
    lines
}
