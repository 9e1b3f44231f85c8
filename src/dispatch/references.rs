// Submission back-references
//
// Submitting a visit records it on its run sheet and on the visited party.
// Cancelling removes exactly those rows again.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dispatch::errors::ReferenceError;
use crate::dispatch::run_sheet::RunSheetLog;
use crate::visit::types::{DocStatus, PartyType, Visit};

pub const RUN_SHEET_LOG_TABLE: &str = "visit_history";

/// Table on the party document holding its visit references
pub fn party_log_table(party_type: PartyType) -> &'static str {
    match party_type {
        PartyType::Customer => "custom_logs",
        PartyType::Lead => "custom_runsheet_logs",
        PartyType::CrmDeal => "custom_logs",
    }
}

/// Row appended to a party's visit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitReference {
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub purpose_of_visit: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub outcome_of_visit: Option<String>,
    pub runsheet_id: Option<String>,
    pub visit_id: Option<String>,
}

impl VisitReference {
    /// Rows written for `visit` are recognised by date, run sheet, employee and id
    fn belongs_to(&self, visit: &Visit) -> bool {
        self.visit_date == visit.visit_date
            && self.runsheet_id == visit.run_sheet
            && self.employee_id == visit.employee
            && self.visit_id == visit.name
    }
}

/// Read/write access to the child tables that hold back-references
#[async_trait]
pub trait ReferenceLedger: Send + Sync {
    async fn employee_name(&self, employee: &str) -> Result<Option<String>, ReferenceError>;

    async fn run_sheet_logs(&self, run_sheet: &str) -> Result<Vec<RunSheetLog>, ReferenceError>;

    async fn set_run_sheet_logs(&self, run_sheet: &str, rows: Vec<RunSheetLog>)
        -> Result<(), ReferenceError>;

    async fn party_logs(&self, party_type: PartyType, party: &str)
        -> Result<Vec<VisitReference>, ReferenceError>;

    async fn set_party_logs(
        &self,
        party_type: PartyType,
        party: &str,
        rows: Vec<VisitReference>,
    ) -> Result<(), ReferenceError>;
}

fn party_target(visit: &Visit) -> Option<(PartyType, &str)> {
    let party = visit
        .party_reference
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())?;
    visit.party_type.map(|party_type| (party_type, party))
}

fn require_status(visit: &Visit, expected: DocStatus) -> Result<(), ReferenceError> {
    if visit.status != expected {
        return Err(ReferenceError::InvalidStatus {
            expected,
            actual: visit.status,
        });
    }
    Ok(())
}

/// Append back-references for a submitted visit and mark it submitted.
pub async fn on_submit(visit: &mut Visit, ledger: &dyn ReferenceLedger) -> Result<(), ReferenceError> {
    require_status(visit, DocStatus::Draft)?;
    append_references(visit, ledger).await?;
    visit.status = DocStatus::Submitted;
    Ok(())
}

async fn append_references(visit: &Visit, ledger: &dyn ReferenceLedger) -> Result<(), ReferenceError> {
    let name = visit.name.clone().ok_or(ReferenceError::Unsaved("submitted"))?;

    // Every target table is read before anything is written, so a missing
    // table leaves both logs untouched.
    let sheet_rows = match visit.run_sheet.as_deref() {
        Some(run_sheet) => Some((run_sheet, ledger.run_sheet_logs(run_sheet).await?)),
        None => None,
    };
    let party_rows = match party_target(visit) {
        Some((party_type, party)) => {
            let employee_name = match visit.employee.as_deref() {
                Some(employee) => ledger.employee_name(employee).await?,
                None => None,
            };
            let rows = ledger.party_logs(party_type, party).await?;
            Some((party_type, party, employee_name, rows))
        }
        None => None,
    };

    if let Some((run_sheet, mut rows)) = sheet_rows {
        if !rows.iter().any(|r| r.visit_id == name) {
            rows.push(RunSheetLog {
                visit_id: name.clone(),
            });
        }
        ledger.set_run_sheet_logs(run_sheet, rows).await?;
        info!(visit = %name, run_sheet, "Visit logged on run sheet");
    }

    if let Some((party_type, party, employee_name, mut rows)) = party_rows {
        let reference = VisitReference {
            employee_id: visit.employee.clone(),
            employee_name,
            purpose_of_visit: visit.purpose.clone(),
            visit_date: visit.visit_date,
            outcome_of_visit: visit.outcome.clone(),
            runsheet_id: visit.run_sheet.clone(),
            visit_id: Some(name.clone()),
        };
        rows.retain(|r| !r.belongs_to(visit));
        rows.push(reference);
        ledger.set_party_logs(party_type, party, rows).await?;
        info!(visit = %name, %party_type, party, "Visit logged on party");
    }
    Ok(())
}

/// Remove the back-references written on submit and mark the visit cancelled.
pub async fn on_cancel(visit: &mut Visit, ledger: &dyn ReferenceLedger) -> Result<(), ReferenceError> {
    require_status(visit, DocStatus::Submitted)?;
    remove_references(visit, ledger).await?;
    visit.status = DocStatus::Cancelled;
    Ok(())
}

async fn remove_references(visit: &Visit, ledger: &dyn ReferenceLedger) -> Result<(), ReferenceError> {
    let name = visit.name.clone().ok_or(ReferenceError::Unsaved("cancelled"))?;

    let sheet_rows = match visit.run_sheet.as_deref() {
        Some(run_sheet) => Some((run_sheet, ledger.run_sheet_logs(run_sheet).await?)),
        None => None,
    };
    let party_rows = match party_target(visit) {
        Some((party_type, party)) => Some((party_type, party, ledger.party_logs(party_type, party).await?)),
        None => None,
    };

    if let Some((run_sheet, rows)) = sheet_rows {
        let before = rows.len();
        let kept: Vec<RunSheetLog> = rows.into_iter().filter(|r| r.visit_id != name).collect();
        let removed = before - kept.len();
        ledger.set_run_sheet_logs(run_sheet, kept).await?;
        info!(visit = %name, run_sheet, removed, "Visit removed from run sheet");
    }

    if let Some((party_type, party, rows)) = party_rows {
        let kept: Vec<VisitReference> = rows.into_iter().filter(|r| !r.belongs_to(visit)).collect();
        ledger.set_party_logs(party_type, party, kept).await?;
        info!(visit = %name, %party_type, party, "Visit removed from party log");
    }
    Ok(())
}
