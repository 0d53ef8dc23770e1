//! TUI module - Terminal dashboard with ratatui

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Table, Row, Cell},
};
use std::io::{stdout, Stdout};

use crate::app::Planner;
use crate::plan::Weekday;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App {
    planner: Planner,
    day: Weekday,
    status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner,
            day: Weekday::today(),
            status: None,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        let result = (|| -> Result<()> {
            while !self.should_quit {
                terminal.draw(|frame| self.render(frame))?;
                self.handle_events()?;
            }
            Ok(())
        })();

        restore_terminal()?;
        result
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let exercises = self.planner.list_exercises(self.day);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(plan_height(exercises.len(), area.height)),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let title = format!("🏋️ Workout Planner - {}", self.day.label());
        let header = Paragraph::new(title)
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Plan for the selected day
        let plan_rows: Vec<Row> = exercises.iter().enumerate().map(|(i, ex)| {
            Row::new(vec![
                Cell::from(format!("{}.", i + 1)),
                Cell::from(ex.name.clone()),
                Cell::from(ex.sets_reps.clone()),
                Cell::from(ex.video_url.clone()),
            ])
        }).collect();

        let plan_table = Table::new(
            plan_rows,
            [
                Constraint::Length(4),
                Constraint::Length(24),
                Constraint::Length(10),
                Constraint::Min(20),
            ],
        )
        .header(Row::new(vec!["#", "Exercise", "Sets", "Video"])
            .style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Plan"));

        frame.render_widget(plan_table, chunks[1]);

        // Session history, newest at the bottom
        let history_rows: Vec<Row> = self.planner.history().iter().map(|r| {
            Row::new(vec![
                Cell::from(r.date.format("%Y-%m-%d").to_string()),
                Cell::from(r.day_label().to_string()),
                Cell::from(r.exercise_name.clone()),
                Cell::from(r.weight_used.clone()),
                Cell::from(r.notes.clone()),
            ])
        }).collect();

        let history = Table::new(
            history_rows,
            [
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(20),
                Constraint::Length(10),
                Constraint::Min(20),
            ],
        )
        .header(Row::new(vec!["Date", "Day", "Exercise", "Weight", "Notes"])
            .style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("History"));

        frame.render_widget(history, chunks[2]);

        // Footer
        let footer_text = match &self.status {
            Some(status) => status.clone(),
            None => "q: quit | ←/→: day | r: reload".to_string(),
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Right | KeyCode::Char('l') => self.day = self.day.next(),
            KeyCode::Left | KeyCode::Char('h') => self.day = self.day.prev(),
            KeyCode::Char('r') => {
                self.status = match self.planner.reload() {
                    Ok(()) => Some("Reloaded from disk".to_string()),
                    Err(err) => Some(format!("Reload failed: {err}")),
                };
            }
            _ => {}
        }
    }
}

/// Rows for the plan table: one per exercise plus borders and header,
/// leaving room for the other panes
fn plan_height(exercises: usize, area_height: u16) -> u16 {
    let wanted = u16::try_from(exercises.max(1))
        .unwrap_or(u16::MAX)
        .saturating_add(3);
    wanted.min(area_height.saturating_sub(14).max(4))
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
