// Host adapters - concrete implementations of the visit traits

pub mod console;
pub mod file_store;
pub mod memory;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

use crate::visit::errors::GeolocationError;
use crate::visit::geolocation::{Position, PositionOptions};
use crate::visit::traits::{Clock, GeolocationProvider};

pub use console::{ConsoleNotifier, ConsoleSurface, TriggerState};
pub use file_store::JsonFileStore;
pub use memory::{MemoryLedger, MemoryStore};

/// Local wall-clock time, truncated to whole seconds
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Reports the same position for every query
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation {
    position: Position,
}

impl FixedGeolocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Position {
                latitude,
                longitude,
                accuracy: None,
            },
        }
    }
}

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, GeolocationError> {
        Ok(self.position)
    }
}

/// Device without a location capability
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_has_whole_seconds() {
        let clock = SystemClock;
        assert_eq!(clock.now().nanosecond(), 0);
    }

    #[tokio::test]
    async fn test_fixed_and_missing_geolocation() {
        let fixed = FixedGeolocation::new(25.3, 82.9);
        let position = fixed.current_position(PositionOptions::default()).await.unwrap();
        assert_eq!(position.latitude, 25.3);

        let none = NoGeolocation;
        assert_eq!(
            none.current_position(PositionOptions::default()).await,
            Err(GeolocationError::Unsupported)
        );
    }
}
