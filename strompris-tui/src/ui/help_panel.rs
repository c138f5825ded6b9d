//! Panel 3 (Help): key bindings.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::theme;

pub fn render(f: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1 / 2 / 3", "Prices / Compare / Help");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "z / Z", "Next / previous price zone");
    key(&mut lines, "n", "Toggle NOK / EUR");
    key(&mut lines, "q / Esc", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1: Prices");
    key(&mut lines, "h / l", "Start date back / forward one day");
    key(&mut lines, "j / k", "End date back / forward one day");
    key(&mut lines, "t", "Reset both dates to today");
    key(&mut lines, "r / Enter", "Reload the selected range");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2: Compare");
    key(&mut lines, "r / Enter", "Reload daily means from the dataset");
    lines.push(Line::from(""));

    section(&mut lines, "Notes");
    key(&mut lines, "", "Days that fail to load are listed under the chart");
    key(&mut lines, "", "and left as gaps; the rest of the range still shows.");
    key(&mut lines, "", "Past ranges are cached until the dashboard exits.");

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
