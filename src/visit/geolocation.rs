// Geolocation probe - best effort, bounded wait, never fails the caller

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::visit::traits::GeolocationProvider;
use crate::visit::types::Coordinates;

/// Query options handed to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position the device may return; zero forces a fresh fix
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(10_000),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Raw position reported by the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in metres
    pub accuracy: Option<f64>,
}

/// Position accepted by the probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub coordinates: Coordinates,
    pub accuracy: Option<f64>,
}

pub struct GeolocationProbe {
    provider: Option<Arc<dyn GeolocationProvider>>,
    options: PositionOptions,
}

impl GeolocationProbe {
    pub fn new(provider: Option<Arc<dyn GeolocationProvider>>, wait: Duration, high_accuracy: bool) -> Self {
        Self {
            provider,
            options: PositionOptions {
                enable_high_accuracy: high_accuracy,
                timeout: wait,
                maximum_age: Duration::ZERO,
            },
        }
    }

    pub fn options(&self) -> PositionOptions {
        self.options
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn acquire_location(&self) -> Option<Coordinates> {
        self.acquire_fix().await.map(|fix| fix.coordinates)
    }

    /// Ask the device for a fresh position, giving up after the configured wait.
    pub async fn acquire_fix(&self) -> Option<LocationFix> {
        let Some(provider) = &self.provider else {
            warn!("Geolocation capability unavailable; continuing without location");
            return None;
        };

        let wait_ms = self.options.timeout.as_millis() as u64;
        match timeout(self.options.timeout, provider.current_position(self.options)).await {
            Ok(Ok(position)) => {
                let Some(coordinates) = Coordinates::new(position.latitude, position.longitude) else {
                    warn!(
                        latitude = position.latitude,
                        longitude = position.longitude,
                        "Device reported an invalid position"
                    );
                    return None;
                };
                debug!(%coordinates, accuracy = ?position.accuracy, "Acquired device location");
                Some(LocationFix {
                    coordinates,
                    accuracy: position.accuracy,
                })
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Geolocation failed; continuing without location");
                None
            }
            Err(_) => {
                warn!(wait_ms, "Geolocation timed out; continuing without location");
                None
            }
        }
    }
}

impl std::fmt::Debug for GeolocationProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeolocationProbe")
            .field("available", &self.provider.is_some())
            .field("options", &self.options)
            .finish()
    }
}
