// Recording test doubles for the host capabilities - no side effects

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::visit::errors::{GeolocationError, RpcError, StoreError};
use crate::visit::geolocation::{Position, PositionOptions};
use crate::visit::session::Collaborators;
use crate::visit::traits::*;
use crate::visit::types::Visit;

/// Store that keeps every saved copy
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub saved: Mutex<Vec<Visit>>,
    pub stored: Mutex<HashMap<String, Visit>>,
    pub fail_with: Mutex<Option<StoreError>>,
    /// Yield to the executor before saving so overlapping calls interleave
    pub yield_before_save: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yielding() -> Self {
        Self {
            yield_before_save: true,
            ..Self::default()
        }
    }

    pub fn fail_next(&self, error: StoreError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn put(&self, visit: Visit) {
        let name = visit.name.clone().expect("stored visits need a name");
        self.stored.lock().unwrap().insert(name, visit);
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn save(&self, visit: &Visit) -> Result<Visit, StoreError> {
        if self.yield_before_save {
            tokio::task::yield_now().await;
        }
        if let Some(error) = self.fail_with.lock().unwrap().take() {
            return Err(error);
        }
        let mut saved = visit.clone();
        if saved.name.is_none() {
            saved.name = Some(format!("VISIT-{:05}", self.save_count() + 1));
        }
        self.saved.lock().unwrap().push(saved.clone());
        self.put(saved.clone());
        Ok(saved)
    }

    async fn reload(&self, name: &str) -> Result<Visit, StoreError> {
        self.stored
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Hidden { trigger: String, hidden: bool },
    Disabled { trigger: String, disabled: bool },
    Freeze(String),
    Unfreeze,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Latest hidden flag per trigger
    pub fn hidden(&self) -> HashMap<String, bool> {
        let mut state = HashMap::new();
        for event in self.events.lock().unwrap().iter() {
            if let SurfaceEvent::Hidden { trigger, hidden } = event {
                state.insert(trigger.clone(), *hidden);
            }
        }
        state
    }

    pub fn visible_triggers(&self) -> Vec<String> {
        let mut visible: Vec<String> = self
            .hidden()
            .into_iter()
            .filter(|(_, hidden)| !hidden)
            .map(|(trigger, _)| trigger)
            .collect();
        visible.sort();
        visible
    }
}

impl FormSurface for RecordingSurface {
    fn set_hidden(&self, trigger: &str, hidden: bool) {
        self.events.lock().unwrap().push(SurfaceEvent::Hidden {
            trigger: trigger.to_string(),
            hidden,
        });
    }

    fn set_disabled(&self, trigger: &str, disabled: bool) {
        self.events.lock().unwrap().push(SurfaceEvent::Disabled {
            trigger: trigger.to_string(),
            disabled,
        });
    }

    fn freeze(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Freeze(message.to_string()));
    }

    fn unfreeze(&self) {
        self.events.lock().unwrap().push(SurfaceEvent::Unfreeze);
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub toasts: Mutex<Vec<(String, Indicator)>>,
    pub dialogs: Mutex<Vec<(String, String, Indicator)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<(String, Indicator)> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn dialogs(&self) -> Vec<(String, String, Indicator)> {
        self.dialogs.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, message: &str, indicator: Indicator, _duration: Duration) {
        self.toasts
            .lock()
            .unwrap()
            .push((message.to_string(), indicator));
    }

    fn dialog(&self, title: &str, message: &str, indicator: Indicator) {
        self.dialogs
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string(), indicator));
    }
}

#[derive(Debug)]
pub struct FixedClock {
    pub now: NaiveDateTime,
}

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid test timestamp");
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

/// Geolocation provider returning a canned answer
#[derive(Debug)]
pub struct ScriptedGeolocation {
    pub result: Result<Position, GeolocationError>,
    pub calls: Mutex<u32>,
}

impl ScriptedGeolocation {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            result: Ok(Position {
                latitude,
                longitude,
                accuracy: Some(15.0),
            }),
            calls: Mutex::new(0),
        }
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl GeolocationProvider for ScriptedGeolocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, GeolocationError> {
        *self.calls.lock().unwrap() += 1;
        self.result.clone()
    }
}

#[derive(Debug, Default)]
pub struct RecordingRemote {
    pub calls: Mutex<Vec<(String, serde_json::Value, CallOptions)>>,
    pub fail_with: Mutex<Option<RpcError>>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, serde_json::Value, CallOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteProcedure for RecordingRemote {
    async fn call(
        &self,
        method: &str,
        args: serde_json::Value,
        options: CallOptions,
    ) -> Result<serde_json::Value, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), args, options));
        match self.fail_with.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(serde_json::Value::Null),
        }
    }
}

/// Bundle of recording doubles wired into a session
pub struct TestHost {
    pub store: Arc<RecordingStore>,
    pub surface: Arc<RecordingSurface>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<FixedClock>,
    pub geolocation: Option<Arc<ScriptedGeolocation>>,
    pub remote: Arc<RecordingRemote>,
}

impl TestHost {
    pub fn new() -> Self {
        Self::with_store(RecordingStore::new())
    }

    pub fn with_store(store: RecordingStore) -> Self {
        Self {
            store: Arc::new(store),
            surface: Arc::new(RecordingSurface::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            clock: Arc::new(FixedClock::at(2025, 7, 14, 11, 45)),
            geolocation: Some(Arc::new(ScriptedGeolocation::at(25.317_645_8, 82.973_914_4))),
            remote: Arc::new(RecordingRemote::new()),
        }
    }

    pub fn without_location(mut self) -> Self {
        self.geolocation = Some(Arc::new(ScriptedGeolocation::failing(
            GeolocationError::PermissionDenied,
        )));
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            store: self.store.clone(),
            surface: self.surface.clone(),
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
            geolocation: self
                .geolocation
                .clone()
                .map(|g| g as Arc<dyn GeolocationProvider>),
            remote: Some(self.remote.clone()),
        }
    }
}
