// Visit session - one controller per opened document
//
// Owns the document, its lifecycle machine and the in-flight flag. All
// mutations go through `advance`, which stamps a working copy and only
// replaces the session document once the store accepted it.

use serde_json::json;
use statig::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn, Instrument};

use crate::config::WorkflowSettings;
use crate::telemetry::{create_visit_span, generate_correlation_id};
use crate::visit::errors::WorkflowError;
use crate::visit::gate::has_party;
use crate::visit::geolocation::{GeolocationProbe, LocationFix};
use crate::visit::lifecycle::{LifecycleEvent, VisitLifecycle, VisitPhase};
use crate::visit::stages::{StageId, StageTable};
use crate::visit::traits::{
    CallOptions, Clock, DocumentStore, FormSurface, GeolocationProvider, Indicator, Notifier,
    RemoteProcedure,
};
use crate::visit::types::{Coordinates, Visit};
use crate::visit::visibility::{compute_actionable, VisibilityPlan};

/// Server method that records an ad-hoc location against a saved visit
pub const LOG_LOCATION_METHOD: &str = "bwm_custom.api.visit.log_location";

const SAVING_MESSAGE: &str = "Saving...";
const LOCATING_MESSAGE: &str = "Capturing location...";

/// Host capabilities a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn DocumentStore>,
    pub surface: Arc<dyn FormSurface>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub geolocation: Option<Arc<dyn GeolocationProvider>>,
    pub remote: Option<Arc<dyn RemoteProcedure>>,
}

/// Result of a call to [`VisitSession::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Stamped(StampReceipt),
    /// Another advance was already in flight; nothing happened
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StampReceipt {
    pub stage: StageId,
    pub at: chrono::NaiveDateTime,
    pub location: Option<Coordinates>,
}

/// Result of a call to [`VisitSession::log_location`]
#[derive(Debug, Clone, PartialEq)]
pub enum LocationLog {
    Sent { fix: Option<LocationFix> },
    Ignored,
}

pub struct VisitSession {
    table: StageTable,
    visit: Mutex<Visit>,
    lifecycle: Mutex<StateMachine<VisitLifecycle>>,
    in_flight: AtomicBool,
    store: Arc<dyn DocumentStore>,
    surface: Arc<dyn FormSurface>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    remote: Option<Arc<dyn RemoteProcedure>>,
    probe: GeolocationProbe,
    settings: WorkflowSettings,
}

impl VisitSession {
    /// Open a session over a loaded document and render the initial triggers.
    pub fn open(
        visit: Visit,
        table: StageTable,
        collaborators: Collaborators,
        settings: WorkflowSettings,
    ) -> Result<Self, WorkflowError> {
        table.check_progression(&visit)?;

        let lifecycle = resumed_lifecycle(&table, table.completed_count(&visit));

        let probe = GeolocationProbe::new(
            collaborators.geolocation,
            settings.geolocation_timeout,
            settings.high_accuracy,
        );

        let session = Self {
            table,
            visit: Mutex::new(visit),
            lifecycle: Mutex::new(lifecycle),
            in_flight: AtomicBool::new(false),
            store: collaborators.store,
            surface: collaborators.surface,
            notifier: collaborators.notifier,
            clock: collaborators.clock,
            remote: collaborators.remote,
            probe,
            settings,
        };
        session.refresh();
        info!(visit = ?session.snapshot().name, phase = %session.phase(), "Visit session opened");
        Ok(session)
    }

    pub fn table(&self) -> &StageTable {
        &self.table
    }

    /// Copy of the document as last accepted by the store
    pub fn snapshot(&self) -> Visit {
        self.doc().clone()
    }

    pub fn phase(&self) -> VisitPhase {
        self.machine().inner().phase()
    }

    pub fn actionable(&self) -> Option<StageId> {
        compute_actionable(&self.doc(), &self.table)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Recompute trigger visibility from the current document
    pub fn refresh(&self) -> VisibilityPlan {
        let plan = VisibilityPlan::compute(&self.doc(), &self.table);
        plan.apply(self.surface.as_ref());
        plan
    }

    /// Replace both party fields and recompute visibility once
    pub fn set_party(&self, reference: Option<&str>, name: Option<&str>) -> VisibilityPlan {
        {
            let mut doc = self.doc();
            doc.party_reference = reference.map(str::to_string);
            doc.party_name = name.map(str::to_string);
        }
        self.refresh()
    }

    pub fn set_party_reference(&self, reference: Option<&str>) -> VisibilityPlan {
        self.doc().party_reference = reference.map(str::to_string);
        self.refresh()
    }

    pub fn set_party_name(&self, name: Option<&str>) -> VisibilityPlan {
        self.doc().party_name = name.map(str::to_string);
        self.refresh()
    }

    /// Replace the session document with the stored copy.
    pub async fn reload(&self) -> Result<(), WorkflowError> {
        let name = self.doc().name.clone().ok_or(WorkflowError::Unsaved("reloading"))?;
        let fresh = self.store.reload(&name).await?;
        self.table.check_progression(&fresh)?;

        let completed = self.table.completed_count(&fresh);
        *self.doc() = fresh;
        // The stored copy may have fewer stamps than this session has seen,
        // and `complete` is terminal, so the machine starts over.
        *self.machine() = resumed_lifecycle(&self.table, completed);
        self.refresh();
        debug!(visit = %name, completed, "Visit reloaded");
        Ok(())
    }

    /// Stamp `stage` and persist the visit.
    ///
    /// Only one advance runs per session; overlapping calls return
    /// [`Advance::Ignored`] without touching the document.
    pub async fn advance(&self, stage: StageId) -> Result<Advance, WorkflowError> {
        let Some(guard) = InFlightGuard::acquire(self) else {
            debug!(stage = %stage, "Advance already in flight; ignoring");
            return Ok(Advance::Ignored);
        };

        let correlation_id = generate_correlation_id();
        let name = self.doc().name.clone();
        let span = create_visit_span("advance", name.as_deref(), Some(stage.as_str()), &correlation_id);
        self.advance_guarded(stage, guard).instrument(span).await
    }

    async fn advance_guarded(
        &self,
        stage: StageId,
        mut guard: InFlightGuard<'_>,
    ) -> Result<Advance, WorkflowError> {
        let mut working = self.snapshot();

        if !has_party(&working) {
            warn!(stage = %stage, "Advance blocked: no party on visit");
            self.notifier.toast(
                "Please select a party before recording visit progress",
                Indicator::Orange,
                self.settings.toast_duration,
            );
            return Err(WorkflowError::PreconditionUnmet);
        }

        let descriptor = *self.table.get(stage).ok_or(WorkflowError::UnknownStage(stage))?;
        match compute_actionable(&working, &self.table) {
            Some(next) if next == stage => {}
            Some(next) => {
                warn!(stage = %stage, next = %next, "Advance blocked: stage not actionable");
                self.notifier.toast(
                    &format!("{} must be recorded before {}", next.label(), stage.label()),
                    Indicator::Orange,
                    self.settings.toast_duration,
                );
                return Err(WorkflowError::StageNotActionable {
                    requested: stage,
                    actionable: Some(next),
                });
            }
            None => {
                self.notifier.toast(
                    "All visit stages are already recorded",
                    Indicator::Blue,
                    self.settings.toast_duration,
                );
                return Err(WorkflowError::AlreadyComplete);
            }
        }

        guard.lock_controls();

        // 1. timestamp
        let at = self.clock.now();
        working.stage_mut(stage).at = Some(at);

        // 2. visit date, set once
        if working.visit_date.is_none() {
            working.visit_date = Some(self.clock.today());
        }

        // 3. geotag, existing coordinates survive a failed probe
        let mut location = None;
        if descriptor.geotag {
            location = self.probe.acquire_location().await;
            match location {
                Some(coordinates) => working.stage_mut(stage).location = Some(coordinates),
                None => self.notifier.toast(
                    "Location unavailable; saving without coordinates",
                    Indicator::Orange,
                    self.settings.toast_duration,
                ),
            }
        }

        // 4. persist
        guard.freeze(SAVING_MESSAGE);
        let saved = match self.store.save(&working).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(stage = %stage, error = %e, "Failed to save visit");
                self.notifier.dialog("Could not save visit", &e.to_string(), Indicator::Red);
                return Err(e.into());
            }
        };

        // 5. commit and recompute
        *self.doc() = saved;
        self.machine().handle(&LifecycleEvent::Stamped { stage });
        self.refresh();

        info!(stage = %stage, at = %at, location = ?location, "Stage recorded");
        self.notifier.toast(
            &format!("{} recorded", stage.label()),
            Indicator::Green,
            self.settings.toast_duration,
        );

        Ok(Advance::Stamped(StampReceipt { stage, at, location }))
    }

    /// Capture the device position and send it to the server, then reload.
    pub async fn log_location(&self) -> Result<LocationLog, WorkflowError> {
        let Some(guard) = InFlightGuard::acquire(self) else {
            debug!("Location log skipped; another operation is in flight");
            return Ok(LocationLog::Ignored);
        };

        let name = self.doc().name.clone().ok_or(WorkflowError::Unsaved("logging a location"))?;
        let remote = self.remote.clone().ok_or(WorkflowError::RemoteUnavailable)?;
        let correlation_id = generate_correlation_id();
        let span = create_visit_span("log_location", Some(&name), None, &correlation_id);
        self.log_location_guarded(&name, remote.as_ref(), guard)
            .instrument(span)
            .await
    }

    async fn log_location_guarded(
        &self,
        name: &str,
        remote: &dyn RemoteProcedure,
        mut guard: InFlightGuard<'_>,
    ) -> Result<LocationLog, WorkflowError> {
        guard.lock_controls();
        let fix = self.probe.acquire_fix().await;
        if fix.is_none() {
            self.notifier.toast(
                "Location unavailable; logging visit without coordinates",
                Indicator::Orange,
                self.settings.toast_duration,
            );
        }

        let args = json!({
            "visit": name,
            "latitude": fix.map(|f| f.coordinates.latitude),
            "longitude": fix.map(|f| f.coordinates.longitude),
            "accuracy": fix.and_then(|f| f.accuracy),
        });
        let options = CallOptions {
            freeze: true,
            message: Some(LOCATING_MESSAGE.to_string()),
        };

        if let Err(e) = remote.call(LOG_LOCATION_METHOD, args, options).await {
            error!(error = %e, "Location log failed");
            self.notifier.dialog("Could not log location", &e.to_string(), Indicator::Red);
            return Err(e.into());
        }

        self.reload().await?;
        info!(has_fix = fix.is_some(), "Location logged");
        Ok(LocationLog::Sent { fix })
    }

    fn doc(&self) -> MutexGuard<'_, Visit> {
        self.visit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn machine(&self) -> MutexGuard<'_, StateMachine<VisitLifecycle>> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn resumed_lifecycle(table: &StageTable, completed: usize) -> StateMachine<VisitLifecycle> {
    let mut lifecycle = VisitLifecycle::new(table).state_machine();
    lifecycle.handle(&LifecycleEvent::Resume { completed });
    lifecycle
}

impl std::fmt::Debug for VisitSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitSession")
            .field("visit", &self.doc().name)
            .field("phase", &self.phase())
            .field("busy", &self.is_busy())
            .field("probe", &self.probe)
            .finish()
    }
}

/// Holds the session's in-flight flag. Dropping it releases the flag and
/// undoes whatever UI locking was taken, on every exit path.
struct InFlightGuard<'a> {
    session: &'a VisitSession,
    controls_locked: bool,
    frozen: bool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(session: &'a VisitSession) -> Option<Self> {
        session
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                session,
                controls_locked: false,
                frozen: false,
            })
    }

    fn lock_controls(&mut self) {
        for stage in self.session.table.iter() {
            self.session.surface.set_disabled(stage.trigger, true);
        }
        self.controls_locked = true;
    }

    fn freeze(&mut self, message: &str) {
        self.session.surface.freeze(message);
        self.frozen = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.frozen {
            self.session.surface.unfreeze();
        }
        if self.controls_locked {
            for stage in self.session.table.iter() {
                self.session.surface.set_disabled(stage.trigger, false);
            }
        }
        self.session.in_flight.store(false, Ordering::Release);
    }
}
