use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use super::{current_settings, load_visit, show_stamp};
use crate::host::{ConsoleNotifier, ConsoleSurface, FixedGeolocation, SystemClock};
use crate::visit::{Advance, Collaborators, GeolocationProvider, StageId, StageTable, VisitSession};

pub struct AdvanceCommand {
    pub file: PathBuf,
    pub stage: Option<StageId>,
    pub position: Option<(f64, f64)>,
}

impl AdvanceCommand {
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            stage: None,
            position: None,
        }
    }

    pub fn with_stage(mut self, stage: Option<StageId>) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_position(mut self, position: Option<(f64, f64)>) -> Self {
        self.position = position;
        self
    }

    pub async fn execute(&self) -> Result<()> {
        let (store, visit) = load_visit(&self.file).await?;

        let geolocation = self.position.map(|(lat, lon)| {
            Arc::new(FixedGeolocation::new(lat, lon)) as Arc<dyn GeolocationProvider>
        });
        let collaborators = Collaborators {
            store: Arc::new(store),
            surface: Arc::new(ConsoleSurface::new()),
            notifier: Arc::new(ConsoleNotifier),
            clock: Arc::new(SystemClock),
            geolocation,
            remote: None,
        };
        let session = VisitSession::open(visit, StageTable::standard(), collaborators, current_settings())?;

        let stage = self.target_stage(&session);
        match session.advance(stage).await? {
            Advance::Stamped(receipt) => {
                show_stamp(receipt.stage.label(), &session.snapshot(), receipt.stage);
                println!("   Phase: {}", session.phase());
            }
            Advance::Ignored => println!("⏳ Another update is in progress"),
        }
        Ok(())
    }

    /// Requested stage, else the actionable one, else the first unrecorded one.
    /// A fully recorded visit falls back to the last stage so the session
    /// reports it as complete.
    fn target_stage(&self, session: &VisitSession) -> StageId {
        if let Some(stage) = self.stage {
            return stage;
        }
        if let Some(stage) = session.actionable() {
            return stage;
        }
        let visit = session.snapshot();
        let ids = session.table().ids();
        ids.iter()
            .copied()
            .find(|id| !visit.stage(*id).is_stamped())
            .or_else(|| ids.last().copied())
            .unwrap_or(StageId::CheckIn)
    }
}
