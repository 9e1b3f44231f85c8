// Per-visit lifecycle: pending stages until every stage is recorded

use serde::{Deserialize, Serialize};
use statig::prelude::*;

use crate::visit::stages::{StageId, StageTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Align with a document loaded from the store
    Resume { completed: usize },
    /// A stage was stamped and persisted
    Stamped { stage: StageId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitPhase {
    Pending(StageId),
    Complete,
}

impl std::fmt::Display for VisitPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisitPhase::Pending(stage) => write!(f, "pending {stage}"),
            VisitPhase::Complete => f.write_str("complete"),
        }
    }
}

#[derive(Debug, Default)]
pub struct VisitLifecycle {
    order: Vec<StageId>,
    completed: usize,
}

impl VisitLifecycle {
    pub fn new(table: &StageTable) -> Self {
        Self {
            order: table.ids(),
            completed: 0,
        }
    }

    pub fn phase(&self) -> VisitPhase {
        self.order
            .get(self.completed)
            .map_or(VisitPhase::Complete, |stage| VisitPhase::Pending(*stage))
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.order.len()
    }
}

#[state_machine(initial = "State::pending()")]
impl VisitLifecycle {
    #[state]
    fn pending(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Resume { completed } => {
                self.completed = (*completed).min(self.order.len());
                tracing::debug!(completed = self.completed, "Lifecycle resumed from document");
                if self.is_complete() {
                    Transition(State::complete())
                } else {
                    Handled
                }
            }
            LifecycleEvent::Stamped { stage } => {
                let expected = self.order.get(self.completed).copied();
                if expected != Some(*stage) {
                    tracing::warn!(
                        stage = %stage,
                        expected = ?expected,
                        "Ignoring out-of-order stage stamp"
                    );
                    return Handled;
                }
                self.completed += 1;
                tracing::info!(stage = %stage, completed = self.completed, "Stage completed");
                if self.is_complete() {
                    tracing::info!("All visit stages recorded");
                    Transition(State::complete())
                } else {
                    Handled
                }
            }
        }
    }

    #[state]
    fn complete(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        tracing::debug!(event = ?event, "Visit already complete; event ignored");
        Handled
    }
}
