// Visibility engine - exactly one trigger may be offered at a time

use crate::visit::gate::has_party;
use crate::visit::stages::{StageId, StageTable};
use crate::visit::traits::FormSurface;
use crate::visit::types::Visit;

/// First stage, in table order, whose timestamp is not recorded yet.
pub fn compute_actionable(visit: &Visit, table: &StageTable) -> Option<StageId> {
    table
        .iter()
        .find(|stage| !visit.stage(stage.id).is_stamped())
        .map(|stage| stage.id)
}

/// Which triggers the form should show for a given document state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityPlan {
    pub actionable: Option<StageId>,
    pub gate_open: bool,
    pub triggers: Vec<TriggerVisibility>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerVisibility {
    pub stage: StageId,
    pub trigger: &'static str,
    pub visible: bool,
}

impl VisibilityPlan {
    pub fn compute(visit: &Visit, table: &StageTable) -> Self {
        let actionable = compute_actionable(visit, table);
        let gate_open = has_party(visit);
        let triggers = table
            .iter()
            .map(|stage| TriggerVisibility {
                stage: stage.id,
                trigger: stage.trigger,
                // Actionable alone is not enough, the gate must hold too
                visible: gate_open && actionable == Some(stage.id),
            })
            .collect();

        Self {
            actionable,
            gate_open,
            triggers,
        }
    }

    /// The single trigger that should be shown, if any
    pub fn visible_trigger(&self) -> Option<&'static str> {
        self.triggers
            .iter()
            .find(|t| t.visible)
            .map(|t| t.trigger)
    }

    pub fn apply(&self, surface: &dyn FormSurface) {
        for trigger in &self.triggers {
            surface.set_hidden(trigger.trigger, !trigger.visible);
        }
        tracing::debug!(
            actionable = ?self.actionable,
            gate_open = self.gate_open,
            "Applied trigger visibility"
        );
    }
}
