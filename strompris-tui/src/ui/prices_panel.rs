//! Panel 1 (Prices): hourly price chart for the selected zone and range.

use chrono::{DateTime, FixedOffset, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Wrap};
use ratatui::Frame;

use strompris_core::data::RangeReport;
use strompris_core::stats::{current_record, PriceSummary};
use strompris_core::{Currency, PriceSeries};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let failures = app
        .prices
        .report
        .as_ref()
        .map_or(0, |r| r.failures.len()) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(failures.min(6)),
        ])
        .split(area);

    render_selectors(f, chunks[0], app);

    match (&app.prices.report, &app.prices.error) {
        (_, Some(err)) => render_message(f, chunks[1], err, theme::negative()),
        (Some(report), None) if !report.series.is_empty() => {
            render_chart(f, chunks[1], &report.series, app.currency);
            render_summary(f, chunks[2], &report.series, app.currency, Utc::now());
            render_failures(f, chunks[3], report);
        }
        _ if app.prices.pending.is_some() => {
            render_message(f, chunks[1], "Loading prices...", theme::muted())
        }
        _ => render_message(
            f,
            chunks[1],
            "Press r to load prices for the selected range.",
            theme::muted(),
        ),
    }
}

fn render_selectors(f: &mut Frame, area: Rect, app: &AppState) {
    let mut first = vec![
        Span::styled("Zone: ", theme::muted()),
        Span::styled(app.zone.label(), theme::accent_bold()),
        Span::styled("  Currency: ", theme::muted()),
        Span::styled(app.currency.code(), theme::accent()),
        Span::styled("  From ", theme::muted()),
        Span::styled(app.start.to_string(), theme::text()),
        Span::styled(" to ", theme::muted()),
        Span::styled(app.end.to_string(), theme::text()),
    ];
    if app.prices.pending.is_some() {
        first.push(Span::styled("  loading...", theme::warning()));
    }

    let second = match &app.prices.validation {
        Some(msg) => Line::from(Span::styled(msg.as_str(), theme::warning())),
        None => Line::from(Span::styled(
            "[z]one [n]ok/eur [h/l] start [j/k] end [t]oday [r]eload",
            theme::muted(),
        )),
    };

    f.render_widget(Paragraph::new(vec![Line::from(first), second]), area);
}

fn render_message(f: &mut Frame, area: Rect, msg: &str, style: Style) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(msg.to_string(), style)),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

/// Chart points split into contiguous runs, so a missing day shows as a gap
/// instead of a line across it. X is hours since `origin`.
pub fn chart_segments(
    series: &PriceSeries,
    currency: Currency,
    origin: DateTime<FixedOffset>,
) -> Vec<Vec<(f64, f64)>> {
    let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut prev_end: Option<DateTime<FixedOffset>> = None;

    for r in series {
        let x = (r.time_start - origin).num_minutes() as f64 / 60.0;
        let point = (x, r.price(currency));
        let contiguous = prev_end.map_or(false, |end| r.time_start <= end);
        match segments.len() {
            n if contiguous && n > 0 => segments[n - 1].push(point),
            _ => segments.push(vec![point]),
        }
        prev_end = Some(r.time_end);
    }
    segments
}

fn render_chart(f: &mut Frame, area: Rect, series: &PriceSeries, currency: Currency) {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return;
    };
    let segments = chart_segments(series, currency, first.time_start);

    let min_y = series.prices(currency).fold(f64::INFINITY, f64::min);
    let max_y = series.prices(currency).fold(f64::NEG_INFINITY, f64::max);
    let padding = ((max_y - min_y).abs() * 0.05).max(0.01);
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = (last.time_end - first.time_start).num_minutes() as f64 / 60.0;

    let datasets: Vec<Dataset> = segments
        .iter()
        .map(|seg| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(theme::ACCENT))
                .graph_type(GraphType::Line)
                .data(seg)
        })
        .collect();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled("Time", theme::muted()))
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(
                        first.time_start.format("%d.%m %H:%M").to_string(),
                        theme::muted(),
                    ),
                    Span::styled(
                        last.time_end.format("%d.%m %H:%M").to_string(),
                        theme::muted(),
                    ),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(format!("{currency}/kWh"), theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.2}"), theme::muted()),
                    Span::styled(format!("{y_max:.2}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_summary(
    f: &mut Frame,
    area: Rect,
    series: &PriceSeries,
    currency: Currency,
    now: DateTime<Utc>,
) {
    let Some(summary) = PriceSummary::of(series, currency) else {
        return;
    };

    let mut spans = vec![
        Span::styled("min ", theme::muted()),
        Span::styled(format!("{:.4}", summary.min), theme::positive()),
        Span::styled(format!(" @ {}", summary.min_at.format("%d.%m %H:%M")), theme::muted()),
        Span::styled("  mean ", theme::muted()),
        Span::styled(format!("{:.4}", summary.mean), theme::text()),
        Span::styled("  max ", theme::muted()),
        Span::styled(format!("{:.4}", summary.max), theme::negative()),
        Span::styled(format!(" @ {}", summary.max_at.format("%d.%m %H:%M")), theme::muted()),
    ];

    if let Some(r) = current_record(series, now) {
        let price = r.price(currency);
        spans.push(Span::styled("  now ", theme::muted()));
        spans.push(Span::styled(
            format!("{price:.4}"),
            Style::default().fg(theme::price_color(price, summary.mean)),
        ));
    }

    spans.push(Span::styled(format!("  {currency}/kWh"), theme::muted()));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// One inline line per failed day, naming the resource and status.
pub fn failure_lines(report: &RangeReport) -> Vec<String> {
    report
        .failures
        .iter()
        .map(|fail| format!("{} missing: {}", fail.date, fail.error))
        .collect()
}

fn render_failures(f: &mut Frame, area: Rect, report: &RangeReport) {
    if area.height == 0 {
        return;
    }
    let lines: Vec<Line> = failure_lines(report)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, theme::warning())))
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}
