//! Dashboard selections persisted as JSON across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use strompris_core::{Currency, Zone};

use crate::app::{AppState, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub zone: Zone,
    pub currency: Currency,
    pub active_panel: Panel,
}

/// Load persisted state from disk. `None` if the file is missing or corrupt,
/// so the configured defaults apply.
pub fn load(path: &Path) -> Option<PersistedState> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        zone: app.zone,
        currency: app.currency,
        active_panel: app.active_panel,
    }
}

pub fn apply(app: &mut AppState, state: PersistedState) {
    app.zone = state.zone;
    app.currency = state.currency;
    app.active_panel = state.active_panel;
}
