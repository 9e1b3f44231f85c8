// Traits for dependency injection - each one is a capability owned by the host

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::time::Duration;

use crate::visit::errors::{GeolocationError, RpcError, StoreError};
use crate::visit::geolocation::{Position, PositionOptions};
use crate::visit::types::Visit;

/// Colour hint attached to notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Green,
    Blue,
    Orange,
    Red,
}

/// Hints passed along with a remote call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Block the form while the call is in flight
    pub freeze: bool,
    /// Progress message shown while frozen
    pub message: Option<String>,
}

/// Document persistence interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist the whole document atomically and return the stored copy
    async fn save(&self, visit: &Visit) -> Result<Visit, StoreError>;

    /// Fetch the current stored copy of a document
    async fn reload(&self, name: &str) -> Result<Visit, StoreError>;
}

/// Display properties of the rendered form
pub trait FormSurface: Send + Sync {
    fn set_hidden(&self, trigger: &str, hidden: bool);

    fn set_disabled(&self, trigger: &str, disabled: bool);

    /// Show a blocking progress indicator
    fn freeze(&self, message: &str);

    fn unfreeze(&self);
}

/// User-facing notifications
pub trait Notifier: Send + Sync {
    /// Transient alert
    fn toast(&self, message: &str, indicator: Indicator, duration: Duration);

    /// Modal message dialog
    fn dialog(&self, title: &str, message: &str, indicator: Indicator);
}

/// Host date/time service
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate;
}

/// Single-shot device position query
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self, options: PositionOptions)
        -> Result<Position, GeolocationError>;
}

/// Named server-side operations
#[async_trait]
pub trait RemoteProcedure: Send + Sync {
    async fn call(
        &self,
        method: &str,
        args: serde_json::Value,
        options: CallOptions,
    ) -> Result<serde_json::Value, RpcError>;
}
