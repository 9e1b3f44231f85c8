// Visit Workflow Library - field visit stage tracking
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod host;
pub mod telemetry;
pub mod visit;

// Re-export key types for easy access
pub use config::{config, init_config, VisitWorkflowConfig, WorkflowSettings};
pub use dispatch::{fill_rows, on_cancel, on_submit, ReferenceLedger, RunSheet, RunSheetRow};
pub use telemetry::{create_visit_span, generate_correlation_id, init_telemetry};
pub use visit::{
    Advance, Collaborators, StageId, StageTable, Visit, VisitPhase, VisitSession, WorkflowError,
};
