//! Panel 2 (Compare): daily mean price per zone from the historical dataset.

use chrono::{Datelike, NaiveDate};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Paragraph};
use ratatui::Frame;

use strompris_core::stats::DailyMean;
use strompris_core::{Currency, Zone};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(5)])
        .split(area);

    let history = &app.history;
    let header = vec![
        Line::from(vec![
            Span::styled("Dataset: ", theme::muted()),
            Span::styled(app.dataset_path.display().to_string(), theme::text()),
            Span::styled(format!("  {} zone-days", history.means.len()), theme::muted()),
            Span::styled(format!("  {}/kWh", app.currency), theme::accent()),
        ]),
        Line::from(Span::styled("[r]eload [n]ok/eur", theme::muted())),
    ];
    f.render_widget(Paragraph::new(header), chunks[0]);

    let body = chunks[1];
    if history.loading {
        message(f, body, "Loading dataset...", theme::muted());
    } else if let Some(err) = &history.error {
        message(f, body, err, theme::negative());
    } else if history.means.is_empty() {
        message(
            f,
            body,
            "No history yet. Run `strompris update` daily to build the dataset.",
            theme::muted(),
        );
    } else {
        render_chart(f, body, &history.means, app.currency);
    }
}

fn message(f: &mut Frame, area: Rect, msg: &str, style: Style) {
    let lines = vec![Line::from(""), Line::from(Span::styled(msg.to_string(), style))];
    f.render_widget(Paragraph::new(lines), area);
}

fn day_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// One line of (day, mean price) points per zone present in `means`, in
/// zone order.
pub fn zone_lines(means: &[DailyMean], currency: Currency) -> Vec<(Zone, Vec<(f64, f64)>)> {
    Zone::ALL
        .iter()
        .filter_map(|&zone| {
            let points: Vec<(f64, f64)> = means
                .iter()
                .filter(|m| m.zone == zone)
                .map(|m| (day_x(m.date), m.price(currency)))
                .collect();
            (!points.is_empty()).then_some((zone, points))
        })
        .collect()
}

fn render_chart(f: &mut Frame, area: Rect, means: &[DailyMean], currency: Currency) {
    let lines = zone_lines(means, currency);

    let (mut first, mut last) = (means[0].date, means[0].date);
    let (mut y_lo, mut y_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for m in means {
        first = first.min(m.date);
        last = last.max(m.date);
        y_lo = y_lo.min(m.price(currency));
        y_hi = y_hi.max(m.price(currency));
    }
    let padding = ((y_hi - y_lo).abs() * 0.05).max(0.01);
    let (y_lo, y_hi) = (y_lo - padding, y_hi + padding);
    let x_lo = day_x(first);
    let x_hi = day_x(last).max(x_lo + 1.0);

    let datasets: Vec<Dataset> = lines
        .iter()
        .map(|(zone, points)| {
            Dataset::default()
                .name(zone.code())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(theme::zone_color(*zone)))
                .graph_type(GraphType::Line)
                .data(points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .legend_position(Some(LegendPosition::TopRight))
        .x_axis(
            Axis::default()
                .title(Span::styled("Date", theme::muted()))
                .style(theme::muted())
                .bounds([x_lo, x_hi])
                .labels(vec![
                    Span::styled(first.to_string(), theme::muted()),
                    Span::styled(last.to_string(), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(format!("{currency}/kWh"), theme::muted()))
                .style(theme::muted())
                .bounds([y_lo, y_hi])
                .labels(vec![
                    Span::styled(format!("{y_lo:.2}"), theme::muted()),
                    Span::styled(format!("{y_hi:.2}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}
