// Visit Workflow Module - session-scoped stage controller
//
// A visit moves through an ordered table of stages. Each stage is stamped
// by the sequencer in `session`, gated on the visit naming a party, with
// all host capabilities injected through the traits in `traits`.

pub mod errors;
pub mod gate;
pub mod geolocation;
pub mod lifecycle;
pub mod session;
pub mod stages;
pub mod traits;
pub mod types;
pub mod visibility;

#[cfg(test)]
pub mod mocks;


pub use errors::{GeolocationError, RpcError, StageTableError, StoreError, WorkflowError};
pub use gate::has_party;
pub use geolocation::{GeolocationProbe, LocationFix, Position, PositionOptions};
pub use lifecycle::{VisitLifecycle, VisitPhase};
pub use session::{Advance, Collaborators, LocationLog, StampReceipt, VisitSession};
pub use stages::{Stage, StageId, StageTable};
pub use traits::{
    CallOptions, Clock, DocumentStore, FormSurface, GeolocationProvider, Indicator, Notifier,
    RemoteProcedure,
};
pub use types::{Coordinates, DocStatus, PartyType, StageRecord, Visit};
pub use visibility::{compute_actionable, VisibilityPlan};
