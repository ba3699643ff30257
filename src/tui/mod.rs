//! Ratatui-based terminal dashboard.
//!
//! The dashboard provides a settings panel for the ARIMA order (p, d, q), the
//! per-dataset results and a history-vs-forecast chart. Every order change
//! re-runs the pipeline for both datasets from scratch.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};

use crate::app::pipeline::{run_all, DatasetOutcome, LoadedDataset};
use crate::domain::{ModelOrder, OrderComponent, SplitConfig};
use crate::error::AppError;
use crate::report::format_dataset;

mod plotters_chart;

use plotters_chart::ForecastChart;

/// Start the dashboard.
pub fn run(datasets: Vec<LoadedDataset>, order: ModelOrder, split: SplitConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(datasets, order, split);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
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
    datasets: Vec<LoadedDataset>,
    split: SplitConfig,
    order: ModelOrder,
    selected_field: usize,
    charted: usize,
    status: String,
    outcomes: Vec<DatasetOutcome>,
}

impl App {
    fn new(datasets: Vec<LoadedDataset>, order: ModelOrder, split: SplitConfig) -> Self {
        let mut app = Self {
            datasets,
            split,
            order,
            selected_field: 0,
            charted: 0,
            status: String::new(),
            outcomes: Vec::new(),
        };
        app.rerun();
        app
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

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
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
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the dashboard should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < OrderComponent::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Tab => {
                if !self.outcomes.is_empty() {
                    self.charted = (self.charted + 1) % self.outcomes.len();
                }
            }
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i64) {
        let component = OrderComponent::ALL[self.selected_field];
        let next = self.order.get(component) as i64 + delta;
        // Out-of-range values are rejected by the order itself; stay put.
        if let Ok(order) = self.order.with_component(component, next) {
            if order != self.order {
                self.order = order;
                self.rerun();
            }
        }
    }

    fn rerun(&mut self) {
        self.outcomes = run_all(&self.datasets, &self.order, &self.split);
        let failed = self.outcomes.iter().filter(|o| o.result.is_err()).count();
        self.status = if failed == 0 {
            format!("ARIMA{} fitted on {} datasets", self.order, self.outcomes.len())
        } else {
            format!("ARIMA{}: {failed} of {} datasets failed", self.order, self.outcomes.len())
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let test_years: Vec<String> = self.split.test_years().iter().map(|y| y.to_string()).collect();
        let lines = vec![
            Line::from(vec![
                Span::styled("arima-dash", Style::default().fg(Color::Cyan)),
                Span::raw(" | ARIMA forecasts of yearly totals"),
            ]),
            Line::from(Span::styled(
                format!(
                    "order: {} | train: <= {} | test: {}",
                    self.order,
                    self.split.train_end(),
                    test_years.join(", ")
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(columns[0]);

        self.draw_settings(frame, left[0]);
        self.draw_results(frame, left[1]);
        self.draw_chart(frame, columns[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = OrderComponent::ALL
            .iter()
            .map(|&c| {
                ListItem::new(format!(
                    "{}: {}  (0..={})",
                    c.label(),
                    self.order.get(c),
                    c.max()
                ))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Order").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                lines.push(Line::raw(""));
            }
            lines.push(Line::from(Span::styled(
                outcome.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            let style = if outcome.result.is_ok() {
                Style::default()
            } else {
                Style::default().fg(Color::Red)
            };
            for text in format_dataset(&outcome.result) {
                lines.push(Line::from(Span::styled(text, style)));
            }
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Results").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let outcome = self.outcomes.get(self.charted);
        let title = outcome
            .map(|o| format!("{} (Tab to switch)", o.title))
            .unwrap_or_else(|| "Chart".to_string());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = outcome.and_then(chart_series) else {
            let msg = Paragraph::new("No forecast to chart for this dataset.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };
        let y_label = outcome.map(|o| o.value_label.as_str()).unwrap_or("total");

        let widget = ForecastChart {
            history: &data.history,
            forecast: &data.forecast,
            actual: &data.actual,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "year",
            y_label,
            fmt_x: fmt_axis_year,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Tab chart  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Series and bounds for the chart widget.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    history: Vec<(f64, f64)>,
    forecast: Vec<(f64, f64)>,
    actual: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for a successful run; `None` for a failed dataset.
fn chart_series(outcome: &DatasetOutcome) -> Option<ChartData> {
    let run = outcome.result.as_ref().ok()?;

    let history: Vec<(f64, f64)> = run
        .history
        .points()
        .iter()
        .map(|p| (f64::from(p.year), p.total))
        .collect();
    let actual: Vec<(f64, f64)> = run
        .split
        .test
        .points()
        .iter()
        .map(|p| (f64::from(p.year), p.total))
        .collect();

    // Join the forecast to the last training point so the lines connect.
    let mut forecast = Vec::with_capacity(run.forecast.len() + 1);
    if let Some(last) = run.split.train.points().last() {
        forecast.push((f64::from(last.year), last.total));
    }
    forecast.extend(
        run.forecast
            .years
            .iter()
            .zip(&run.forecast.values)
            .map(|(&y, &v)| (f64::from(y), v)),
    );

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in history.iter().chain(&forecast) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !x_min.is_finite() || !x_max.is_finite() {
        return None;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        let mid = if y_min.is_finite() { y_min } else { 0.0 };
        y_min = mid - 1.0;
        y_max = mid + 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(ChartData {
        history,
        forecast,
        actual,
        x_bounds: [x_min - 0.5, x_max + 0.5],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_value(v: f64) -> String {
    if v.abs() >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v.abs() >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.1}")
    }
}
