//! History-vs-forecast chart widget.
//!
//! The first row of the area carries a legend drawn with Ratatui spans; the rest
//! is a Plotters chart rendered through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const HISTORY_COLOR: RGBColor = RGBColor(255, 255, 255);
const FORECAST_COLOR: RGBColor = RGBColor(0, 255, 255);
const ACTUAL_COLOR: RGBColor = RGBColor(0, 255, 0);

/// Render-only chart description; series and bounds are prepared by the caller.
pub struct ForecastChart<'a> {
    /// Yearly totals for every year in the table.
    pub history: &'a [(f64, f64)],
    /// Forecast line, starting at the last training point.
    pub forecast: &'a [(f64, f64)],
    /// Held-out actuals (a subset of `history`).
    pub actual: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl ForecastChart<'_> {
    fn has_valid_bounds(&self) -> bool {
        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        [x0, x1, y0, y1].iter().all(|v| v.is_finite()) && x1 > x0 && y1 > y0
    }
}

/// Legend row matching the series colours.
fn legend() -> Line<'static> {
    let entries = [
        ("historical", Color::White),
        ("forecast", Color::Cyan),
        ("held-out actual", Color::Green),
    ];
    let mut spans = Vec::with_capacity(entries.len() * 2);
    for (name, color) in entries {
        spans.push(Span::styled("━━ ", Style::default().fg(color)));
        spans.push(Span::raw(format!("{name}   ")));
    }
    Line::from(spans)
}

impl Widget for ForecastChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 9 {
            buf.set_string(
                area.x,
                area.y,
                "Enlarge the terminal to see the chart.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        if !self.has_valid_bounds() {
            return;
        }

        buf.set_line(area.x, area.y, &legend(), area.width);
        let plot_area = Rect {
            y: area.y + 1,
            height: area.height - 1,
            ..area
        };

        let ForecastChart {
            history,
            forecast,
            actual,
            x_bounds: [x0, x1],
            y_bounds: [y0, y1],
            x_label,
            y_label,
            fmt_x,
            fmt_y,
        } = self;

        widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc(x_label)
                .y_desc(y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_x(*v))
                .y_label_formatter(&|v| fmt_y(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            chart.draw_series(LineSeries::new(history.iter().copied(), &HISTORY_COLOR))?;
            chart.draw_series(LineSeries::new(forecast.iter().copied(), &FORECAST_COLOR))?;
            // Pixels rather than circles: the ratatui backend mis-scales circle radii.
            chart.draw_series(actual.iter().map(|&p| Pixel::new(p, ACTUAL_COLOR)))?;
            Ok(())
        })
        .render(plot_area, buf);
    }
}
