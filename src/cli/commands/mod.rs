use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{config, WorkflowSettings};
use crate::host::JsonFileStore;
use crate::visit::Visit;

pub mod advance;
pub mod new;
pub mod stages;
pub mod status;

pub use advance::AdvanceCommand;
pub use new::NewCommand;
pub use stages::StagesCommand;
pub use status::StatusCommand;

/// Settings from the loaded configuration, or defaults when none loaded
pub fn current_settings() -> WorkflowSettings {
    match config() {
        Ok(config) => config.settings(),
        Err(e) => {
            tracing::warn!(error = %e, "Using default settings");
            WorkflowSettings::default()
        }
    }
}

pub async fn load_visit(path: &Path) -> Result<(JsonFileStore, Visit)> {
    let store = JsonFileStore::new(path);
    let visit = store
        .load()
        .await
        .with_context(|| format!("Failed to load visit from {}", path.display()))?;
    Ok((store, visit))
}

pub fn show_stamp(label: &str, visit: &Visit, id: crate::visit::StageId) {
    let record = visit.stage(id);
    match (record.at, record.location) {
        (Some(at), Some(location)) => println!("   ✅ {label:<14} {at}  📍 {location}"),
        (Some(at), None) => println!("   ✅ {label:<14} {at}"),
        (None, _) => println!("   ⬜ {label:<14} -"),
    }
}
