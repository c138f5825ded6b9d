//! Keyboard input dispatch: global keys, then panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Panel};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Global keys.
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => {
            switch_panel(app, Panel::Prices);
            return;
        }
        KeyCode::Char('2') => {
            switch_panel(app, Panel::Compare);
            return;
        }
        KeyCode::Char('3') | KeyCode::Char('?') => {
            switch_panel(app, Panel::Help);
            return;
        }
        KeyCode::Tab => {
            let next = if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel.prev()
            } else {
                app.active_panel.next()
            };
            switch_panel(app, next);
            return;
        }
        KeyCode::BackTab => {
            let prev = app.active_panel.prev();
            switch_panel(app, prev);
            return;
        }
        KeyCode::Char('z') => {
            app.cycle_zone(true);
            return;
        }
        KeyCode::Char('Z') => {
            app.cycle_zone(false);
            return;
        }
        KeyCode::Char('n') => {
            app.toggle_currency();
            return;
        }
        _ => {}
    }

    // 2. Panel-specific keys.
    match app.active_panel {
        Panel::Prices => handle_prices_key(app, key),
        Panel::Compare => handle_compare_key(app, key),
        Panel::Help => {}
    }
}

fn switch_panel(app: &mut AppState, panel: Panel) {
    app.active_panel = panel;
    if panel == Panel::Compare && !app.history.loaded {
        app.request_history();
    }
}

fn handle_prices_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.shift_start(-1),
        KeyCode::Char('l') | KeyCode::Right => app.shift_start(1),
        KeyCode::Char('j') | KeyCode::Down => app.shift_end(-1),
        KeyCode::Char('k') | KeyCode::Up => app.shift_end(1),
        KeyCode::Char('t') => app.reset_dates(),
        KeyCode::Char('r') | KeyCode::Enter => {
            app.prices.pending = None;
            app.request_range();
        }
        _ => {}
    }
}

fn handle_compare_key(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('r') | KeyCode::Enter = key.code {
        app.request_history();
    }
}
