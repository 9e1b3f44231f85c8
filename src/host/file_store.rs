use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::visit::errors::StoreError;
use crate::visit::traits::DocumentStore;
use crate::visit::types::Visit;

/// Stores a single visit as a pretty-printed JSON file.
///
/// Saves go through a temporary sibling file and a rename so a failed
/// write never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Visit, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    /// Name given to a document saved here for the first time
    fn default_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "VISIT".to_string())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn save(&self, visit: &Visit) -> Result<Visit, StoreError> {
        let mut saved = visit.clone();
        if saved.name.is_none() {
            saved.name = Some(self.default_name());
        }

        let json = serde_json::to_string_pretty(&saved)?;
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        tokio::fs::write(&temp, json).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                warn!(path = %temp.display(), error = %cleanup, "Failed to remove temporary visit file");
            }
            return Err(e.into());
        }
        debug!(path = %self.path.display(), visit = ?saved.name, "Visit written");
        Ok(saved)
    }

    async fn reload(&self, name: &str) -> Result<Visit, StoreError> {
        let visit = self.load().await?;
        if visit.name.as_deref() != Some(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(visit)
    }
}
