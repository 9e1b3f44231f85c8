// Dispatch - run sheets and the references visits leave behind

pub mod errors;
pub mod references;
pub mod run_sheet;

pub use errors::{DirectoryError, ReferenceError};
pub use references::{
    on_cancel, on_submit, party_log_table, ReferenceLedger, VisitReference, RUN_SHEET_LOG_TABLE,
};
pub use run_sheet::{
    fill_rows, ContactDetails, LeadDetails, PartyDirectory, RunSheet, RunSheetLog, RunSheetRow,
};
