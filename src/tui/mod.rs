//! Ratatui-based applicant form.
//!
//! The left panel holds the model selector and the applicant fields; the right
//! panel shows the decision card, a probability gauge and the top risk drivers.
//! When no model package can be loaded the UI stays up in a "Model not found"
//! state instead of exiting.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};

use crate::app::pipeline::{self, LoadedModel};
use crate::cli::ModelArgs;
use crate::domain::{Applicant, Outcome, RiskTier, ScoreConfig, ScoredResult};
use crate::error::AppError;
use crate::package::DriverTable;
use crate::report::bundle::REPORT_DIR;

mod form;
mod plotters_chart;

use form::Field;
use plotters_chart::DriversChart;

/// Model selector row plus one row per applicant field.
const ROWS: usize = 1 + Field::ALL.len();

/// Start the TUI.
pub fn run(args: ModelArgs) -> Result<(), AppError> {
    // Resolve the package before taking over the terminal so a missing file
    // becomes a UI state, not an exit.
    let (model, unavailable) = match pipeline::open_package(args.model.as_deref()) {
        Ok(loaded) => (Some(loaded), None),
        Err(err) => (None, Some(err.message().to_string())),
    };

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(model, unavailable, args.score_config());
    app.event_loop(&mut terminal)
}

/// Restores the terminal (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    model: Option<LoadedModel>,
    unavailable: Option<String>,
    config: ScoreConfig,
    applicant: Applicant,
    selected: usize,
    /// Text buffer while a numeric field is being typed.
    edit: Option<String>,
    status: String,
    result: Option<ScoredResult>,
}

impl App {
    fn new(model: Option<LoadedModel>, unavailable: Option<String>, config: ScoreConfig) -> Self {
        let status = match &unavailable {
            Some(_) => "Model not found. Scoring is disabled.".to_string(),
            None => "Fill in the applicant and press p to score.".to_string(),
        };
        Self {
            model,
            unavailable,
            config,
            applicant: Applicant::default(),
            selected: 1,
            edit: None,
            status,
            result: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    fn selected_field(&self) -> Option<Field> {
        self.selected.checked_sub(1).map(|i| Field::ALL[i])
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.edit.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(ROWS - 1),
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Enter => match self.selected_field() {
                Some(field) if field.is_numeric() => {
                    self.edit = Some(field.value(&self.applicant));
                    self.status = format!("Editing {}. Enter to apply, Esc to cancel.", field.label());
                }
                _ => self.predict(),
            },
            KeyCode::Char('p') => self.predict(),
            KeyCode::Char('m') => self.toggle_model(),
            KeyCode::Char('r') => {
                self.applicant = Applicant::default();
                self.result = None;
                self.status = "Form reset to defaults.".to_string();
            }
            KeyCode::Char('d') => self.write_report(),
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buf) = self.edit.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.edit = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buf.clone();
                self.edit = None;
                self.apply_edit(&text);
            }
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => buf.push(c),
            _ => {}
        }
    }

    fn apply_edit(&mut self, text: &str) {
        let Some(field) = self.selected_field() else {
            return;
        };
        match field.apply_text(&self.applicant, text) {
            Ok(next) => {
                self.applicant = next;
                self.form_changed(field);
            }
            Err(msg) => self.status = format!("Rejected: {msg}"),
        }
    }

    fn adjust(&mut self, delta: i32) {
        match self.selected_field() {
            None => self.toggle_model(),
            Some(field) => {
                field.adjust(&mut self.applicant, delta);
                self.form_changed(field);
            }
        }
    }

    fn form_changed(&mut self, field: Field) {
        self.result = None;
        self.status = format!("{}: {}", field.label(), field.value(&self.applicant));
    }

    fn toggle_model(&mut self) {
        self.config.model = self.config.model.toggle();
        if self.result.is_some() {
            self.predict();
        } else {
            self.status = format!("Model: {}", self.config.model.display_name());
        }
    }

    fn predict(&mut self) {
        let Some(loaded) = &self.model else {
            self.status = format!(
                "Model not found: {}",
                self.unavailable.as_deref().unwrap_or("no package loaded")
            );
            return;
        };
        match pipeline::predict(&loaded.package, &self.config, &self.applicant) {
            Ok(result) => {
                self.status = format!(
                    "Scored with {}: {} ({:.2}% default probability).",
                    result.model.display_name(),
                    result.outcome.label(),
                    result.probability * 100.0
                );
                self.result = Some(result);
            }
            Err(err) => {
                self.result = None;
                self.status = err.message().to_string();
            }
        }
    }

    fn drivers(&self) -> Option<DriverTable> {
        let loaded = self.model.as_ref()?;
        loaded.package.variant(self.config.model).ok().map(|v| v.drivers)
    }

    fn write_report(&mut self) {
        let (Some(result), Some(drivers)) = (&self.result, self.drivers()) else {
            self.status = "Nothing to report yet: press p to score first.".to_string();
            return;
        };
        self.status = match crate::report::write_report_bundle(Path::new(REPORT_DIR), &self.applicant, result, &drivers) {
            Ok(path) => format!("Wrote report: {}", path.display()),
            Err(err) => format!("Report write failed: {err}"),
        };
    }

    fn threshold_label(&self) -> String {
        if let Some(t) = self.config.threshold {
            return format!("{t} (override)");
        }
        match &self.model {
            Some(loaded) => format!("{}", loaded.package.threshold_for(self.config.model)),
            None => "-".to_string(),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        if self.model.is_some() {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(44), Constraint::Min(0)])
                .split(chunks[1]);
            self.draw_form(frame, body[0]);
            self.draw_result(frame, body[1]);
        } else {
            self.draw_unavailable(frame, chunks[1]);
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let source = self
            .model
            .as_ref()
            .map(|m| m.path.display().to_string())
            .unwrap_or_else(|| "not loaded".to_string());
        let lines = vec![
            Line::from(vec![
                Span::styled("risk", Style::default().fg(Color::Cyan)),
                Span::raw(" - credit default-risk scoring"),
            ]),
            Line::from(Span::styled(
                format!(
                    "package: {source} | model: {} | threshold: {} | unknown categories: {:?}",
                    self.config.model.display_name(),
                    self.threshold_label(),
                    self.config.unknown_category,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::with_capacity(ROWS);
        items.push(ListItem::new(format!("{:<24} {}", "Model", self.config.model.display_name())));
        for (idx, field) in Field::ALL.iter().enumerate() {
            let value = match &self.edit {
                Some(buf) if self.selected == idx + 1 => format!("{buf}_"),
                _ => field.value(&self.applicant),
            };
            items.push(ListItem::new(format!("{:<24} {value}", field.label())));
        }

        let list = List::new(items)
            .block(Block::default().title("Applicant").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let Some(result) = &self.result else {
            let block = Block::default().title("Decision").borders(Borders::ALL);
            let msg = Paragraph::new("No prediction yet. Press p to score the applicant.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let tier_color = match result.tier {
            RiskTier::Low => Color::Green,
            RiskTier::Medium => Color::Yellow,
            RiskTier::High => Color::Red,
        };
        let verdict = match result.outcome {
            Outcome::GoodLoan => "APPROVED - Good Loan",
            Outcome::Default => "FLAGGED - High Default Risk",
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled(verdict, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(result.tier.label(), Style::default().fg(tier_color).add_modifier(Modifier::BOLD)),
            ]),
            Line::from(format!("Model used:           {}", result.model.display_name())),
            Line::from(format!("Decision threshold:   {}", result.threshold)),
        ];
        if let Some(grade) = result.grade {
            lines.push(Line::from(format!("Estimated loan grade: Grade {grade}")));
        }
        if let Some(lpi) = result.loan_percent_income {
            lines.push(Line::from(format!("Loan % of income:     {:.1}%", lpi * 100.0)));
        }
        lines.push(Line::from(format!(
            "Predicted class:      {} ({})",
            result.outcome.label(),
            result.class()
        )));
        lines.push(Line::from(format!("Confidence:           {:.2}%", result.confidence * 100.0)));
        lines.push(Line::from(format!(
            "Default probability:  {:.2}%",
            result.probability * 100.0
        )));

        let card = Paragraph::new(Text::from(lines)).block(Block::default().title("Decision").borders(Borders::ALL));
        frame.render_widget(card, chunks[0]);

        let p = result.probability.clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .block(Block::default().title("Default Probability").borders(Borders::ALL))
            .gauge_style(Style::default().fg(tier_color))
            .ratio(p)
            .label(format!("{}%", (p * 100.0).floor() as u32));
        frame.render_widget(gauge, chunks[1]);

        self.draw_drivers(frame, chunks[2]);
    }

    fn draw_drivers(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(drivers) = self.drivers() else {
            return;
        };
        let block = Block::default().title(drivers.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let top = drivers.top(5);
        if top.is_empty() {
            frame.render_widget(
                Paragraph::new("No driver table in the package.").style(Style::default().fg(Color::Gray)),
                inner,
            );
            return;
        }

        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(0)])
            .split(inner);

        let signed = matches!(drivers, DriverTable::Coefficients(_));
        let legend: Vec<Line> = top
            .iter()
            .enumerate()
            .map(|(i, (name, value))| {
                let score = if signed { format!("{value:+.4}") } else { format!("{value:.4}") };
                Line::from(format!("#{} {:<28} {score}", i + 1, truncate(name, 28)))
            })
            .collect();
        frame.render_widget(Paragraph::new(Text::from(legend)).wrap(Wrap { trim: true }), split[0]);
        frame.render_widget(DriversChart { bars: top, signed }, split[1]);
    }

    fn draw_unavailable(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let reason = self.unavailable.as_deref().unwrap_or("No model package loaded.");
        let lines = vec![
            Line::from(Span::styled(
                "Model not found",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(reason.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Restart with --model <package.json> or set LOAN_RISK_MODEL.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Scoring unavailable").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit/score  p score  m model  r reset  d report  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
