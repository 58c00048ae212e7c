//! Full-screen interactive charts drawn with ratatui.
//!
//! Each figure takes over the alternate screen until the user dismisses it.
//! The terminal is restored after every figure, and again on drop if a draw
//! failed part-way through.

use std::io::{self, Stdout};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, Paragraph};
use tempo_core::TempoError;
use tracing::debug;

use crate::figure::{Figure, FigureKind};
use crate::render::Renderer;

/// Draws figures on the alternate screen, one at a time.
///
/// The alternate screen is entered for each figure and left again once it
/// is dismissed, so text printed between figures lands on the main screen.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
    shown: usize,
}

impl TerminalRenderer {
    /// Attach to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::Render`] if the terminal cannot be queried.
    pub fn new() -> Result<Self, TempoError> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout())).map_err(render_error)?;
        Ok(Self {
            terminal,
            active: false,
            shown: 0,
        })
    }

    fn enter(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        self.active = true;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        self.terminal.clear()
    }

    fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }

    fn wait_for_dismiss(&mut self, figure: &Figure) -> io::Result<KeyAction> {
        let shown = self.shown;
        loop {
            self.terminal.draw(|frame| draw_figure(frame, figure, shown))?;

            if let Event::Key(key) = event::read()? {
                if let Some(action) = key_action(&key) {
                    return Ok(action);
                }
            }
        }
    }
}

/// What a key press does to the figure on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    /// Move on to the next figure.
    Dismiss,
    /// Abort the whole run.
    Interrupt,
}

fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        // raw mode swallows SIGINT
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Interrupt)
        }
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => {
            Some(KeyAction::Dismiss)
        }
        _ => None,
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, figure: &Figure) -> Result<(), TempoError> {
        self.shown += 1;
        debug!(title = %figure.title, "showing figure");
        let action = self.enter().and_then(|()| self.wait_for_dismiss(figure));
        let restored = self.leave();
        match action.map_err(render_error)? {
            KeyAction::Dismiss => restored.map_err(render_error),
            KeyAction::Interrupt => Err(TempoError::Interrupted),
        }
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

fn render_error(err: io::Error) -> TempoError {
    TempoError::Render(err.to_string())
}

fn draw_figure(frame: &mut Frame, figure: &Figure, shown: usize) {
    let [main, footer] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    let block = Block::bordered().title(format!(" {} ", figure.title));
    let (x_bounds, y_bounds) = figure.bounds();

    match &figure.kind {
        FigureKind::Scatter(points) => {
            let dataset = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Cyan))
                .data(points);
            let chart = Chart::new(vec![dataset])
                .block(block)
                .x_axis(axis(&figure.x_label, x_bounds))
                .y_axis(axis(&figure.y_label, y_bounds));
            frame.render_widget(chart, main);
        }
        FigureKind::QuantileQuantile(qq) => {
            let points = qq.points();
            let line: Vec<(f64, f64)> = qq
                .reference
                .map(|l| {
                    x_bounds
                        .iter()
                        .map(|&x| (x, l.intercept + l.slope * x))
                        .collect()
                })
                .unwrap_or_default();
            let datasets = vec![
                Dataset::default()
                    .name("sample")
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(Color::Cyan))
                    .data(&points),
                Dataset::default()
                    .name("reference")
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::Red))
                    .data(&line),
            ];
            let chart = Chart::new(datasets)
                .block(block)
                .x_axis(axis(&figure.x_label, x_bounds))
                .y_axis(axis(&figure.y_label, y_bounds));
            frame.render_widget(chart, main);
        }
        FigureKind::Bars(hist) => {
            let bars: Vec<Bar> = hist
                .centers()
                .iter()
                .zip(&hist.counts)
                .map(|(center, &count)| {
                    Bar::default()
                        .value(count)
                        .label(Line::from(format!("{center:.1}")))
                })
                .collect();
            let slots = u16::try_from(bars.len().max(1)).unwrap_or(u16::MAX);
            let bar_width = (main.width.saturating_sub(2) / slots).saturating_sub(1).max(1);
            let chart = BarChart::default()
                .block(block.title_bottom(format!(" {} ", figure.x_label)))
                .bar_width(bar_width)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Cyan))
                .data(BarGroup::default().bars(&bars));
            frame.render_widget(chart, main);
        }
    }

    let hint = Paragraph::new(Line::from(format!(
        " figure {shown} · q / Esc / Enter to continue · Ctrl+C to quit"
    )))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, footer);
}

fn axis(title: &str, bounds: [f64; 2]) -> Axis<'static> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    Axis::default()
        .title(title.to_string())
        .style(Style::default().fg(Color::Gray))
        .bounds(bounds)
        .labels(vec![
            Span::raw(format!("{:.1}", bounds[0])),
            Span::raw(format!("{mid:.1}")),
            Span::raw(format!("{:.1}", bounds[1])),
        ])
}
