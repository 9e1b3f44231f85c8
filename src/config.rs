use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the visit workflow
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VisitWorkflowConfig {
    /// Device location settings
    pub geolocation: GeolocationConfig,
    /// Notification settings
    pub notifications: NotificationConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeolocationConfig {
    /// Longest wait for a position fix, in milliseconds
    pub timeout_ms: u64,
    /// Ask the device for its most accurate fix
    pub high_accuracy: bool,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            high_accuracy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// How long toast alerts stay on screen
    pub toast_seconds: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { toast_seconds: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of plain text
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: true,
        }
    }
}

/// Bounds for the geolocation wait
pub const MIN_GEOLOCATION_TIMEOUT_MS: u64 = 1_000;
pub const MAX_GEOLOCATION_TIMEOUT_MS: u64 = 60_000;

impl VisitWorkflowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (visit-workflow.toml, .visit-workflow-rc)
    /// 3. Environment variables (prefixed with VISIT_WORKFLOW_)
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("geolocation.timeout_ms", defaults.geolocation.timeout_ms as i64)?
            .set_default("geolocation.high_accuracy", defaults.geolocation.high_accuracy)?
            .set_default("notifications.toast_seconds", defaults.notifications.toast_seconds as i64)?
            .set_default("observability.log_level", defaults.observability.log_level)?
            .set_default("observability.json", defaults.observability.json)?;

        if Path::new("visit-workflow.toml").exists() {
            builder = builder.add_source(File::with_name("visit-workflow"));
        }

        if Path::new(".visit-workflow-rc").exists() {
            builder = builder.add_source(File::with_name(".visit-workflow-rc").format(config::FileFormat::Toml));
        }

        // Double underscore separates sections, e.g. VISIT_WORKFLOW_GEOLOCATION__TIMEOUT_MS
        builder = builder.add_source(
            Environment::with_prefix("VISIT_WORKFLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: VisitWorkflowConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        let timeout = self.geolocation.timeout_ms;
        if !(MIN_GEOLOCATION_TIMEOUT_MS..=MAX_GEOLOCATION_TIMEOUT_MS).contains(&timeout) {
            bail!(
                "geolocation.timeout_ms must be between {MIN_GEOLOCATION_TIMEOUT_MS} and {MAX_GEOLOCATION_TIMEOUT_MS}, got {timeout}"
            );
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn settings(&self) -> WorkflowSettings {
        WorkflowSettings::from(self)
    }
}

/// Runtime knobs handed to a visit session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub geolocation_timeout: Duration,
    pub high_accuracy: bool,
    pub toast_duration: Duration,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings::from(&VisitWorkflowConfig::default())
    }
}

impl From<&VisitWorkflowConfig> for WorkflowSettings {
    fn from(config: &VisitWorkflowConfig) -> Self {
        Self {
            geolocation_timeout: Duration::from_millis(config.geolocation.timeout_ms),
            high_accuracy: config.geolocation.high_accuracy,
            toast_duration: Duration::from_secs(config.notifications.toast_seconds),
        }
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<VisitWorkflowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = VisitWorkflowConfig::load_env_file();
        VisitWorkflowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static VisitWorkflowConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
