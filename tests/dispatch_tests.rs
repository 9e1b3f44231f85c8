//! Run sheet and back-reference tests against the in-memory ledger

use async_trait::async_trait;
use chrono::NaiveDate;

use visit_workflow::dispatch::{
    fill_rows, on_cancel, on_submit, ContactDetails, DirectoryError, LeadDetails, PartyDirectory,
    ReferenceError, RunSheet, RunSheetLog, RunSheetRow,
};
use visit_workflow::host::MemoryLedger;
use visit_workflow::visit::{DocStatus, PartyType, Visit};

fn submitted_visit_fixture() -> Visit {
    let mut visit = RunSheetRow::for_party(PartyType::Customer, "CUST-0042")
        .new_visit("RS-2025-0007", Some("EMP-0011"));
    visit.name = Some("VISIT-00003".into());
    visit.visit_date = NaiveDate::from_ymd_opt(2025, 7, 14);
    visit.purpose = Some("Quarterly review".into());
    visit
}

fn ledger_fixture() -> MemoryLedger {
    let ledger = MemoryLedger::new();
    ledger.add_employee("EMP-0011", "Asha Verma");
    ledger.add_run_sheet(RunSheet {
        name: "RS-2025-0007".into(),
        visit_history: vec![RunSheetLog {
            visit_id: "VISIT-00001".into(),
        }],
        ..Default::default()
    });
    ledger.add_party(PartyType::Customer, "CUST-0042");
    ledger
}

#[tokio::test]
async fn test_submit_then_cancel_round_trip() {
    let ledger = ledger_fixture();
    let mut visit = submitted_visit_fixture();

    on_submit(&mut visit, &ledger).await.unwrap();
    assert_eq!(visit.status, DocStatus::Submitted);

    let sheet = ledger.run_sheet("RS-2025-0007").unwrap();
    assert_eq!(sheet.visit_history.len(), 2);
    assert_eq!(sheet.visit_history[1].visit_id, "VISIT-00003");

    let log = ledger.party_log(PartyType::Customer, "CUST-0042").unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].employee_name.as_deref(), Some("Asha Verma"));
    assert_eq!(log[0].purpose_of_visit.as_deref(), Some("Quarterly review"));
    assert_eq!(log[0].visit_id.as_deref(), Some("VISIT-00003"));

    on_cancel(&mut visit, &ledger).await.unwrap();
    assert_eq!(visit.status, DocStatus::Cancelled);

    // Only the rows written on submit are removed
    let sheet = ledger.run_sheet("RS-2025-0007").unwrap();
    assert_eq!(sheet.visit_history, vec![RunSheetLog { visit_id: "VISIT-00001".into() }]);
    assert!(ledger.party_log(PartyType::Customer, "CUST-0042").unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_rejects_wrong_status_and_unsaved_documents() {
    let ledger = ledger_fixture();

    let mut unsaved = submitted_visit_fixture();
    unsaved.name = None;
    assert_eq!(
        on_submit(&mut unsaved, &ledger).await,
        Err(ReferenceError::Unsaved("submitted"))
    );
    assert_eq!(unsaved.status, DocStatus::Draft);

    let mut draft = submitted_visit_fixture();
    assert!(matches!(
        on_cancel(&mut draft, &ledger).await,
        Err(ReferenceError::InvalidStatus { .. })
    ));
}

#[tokio::test]
async fn test_submit_against_unknown_party_fails() {
    let ledger = ledger_fixture();
    let mut visit = submitted_visit_fixture();
    visit.party_type = Some(PartyType::Lead);
    visit.party_reference = Some("LEAD-0099".into());

    let err = on_submit(&mut visit, &ledger).await.unwrap_err();
    assert!(matches!(err, ReferenceError::MissingTable { table: "custom_runsheet_logs", .. }));
    assert_eq!(visit.status, DocStatus::Draft);

    // Nothing was written to the run sheet either
    let sheet = ledger.run_sheet("RS-2025-0007").unwrap();
    assert_eq!(sheet.visit_history, vec![RunSheetLog { visit_id: "VISIT-00001".into() }]);

    // Once the lead exists, a retry logs the visit exactly once
    ledger.add_party(PartyType::Lead, "LEAD-0099");
    on_submit(&mut visit, &ledger).await.unwrap();
    assert_eq!(visit.status, DocStatus::Submitted);

    let sheet = ledger.run_sheet("RS-2025-0007").unwrap();
    let logged = sheet
        .visit_history
        .iter()
        .filter(|row| row.visit_id == "VISIT-00003")
        .count();
    assert_eq!(logged, 1);
    assert_eq!(ledger.party_log(PartyType::Lead, "LEAD-0099").unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_against_missing_party_table_changes_nothing() {
    let ledger = ledger_fixture();
    let mut visit = submitted_visit_fixture();
    on_submit(&mut visit, &ledger).await.unwrap();

    visit.party_reference = Some("CUST-0404".into());
    let err = on_cancel(&mut visit, &ledger).await.unwrap_err();
    assert!(matches!(err, ReferenceError::MissingTable { .. }));
    assert_eq!(visit.status, DocStatus::Submitted);
    assert_eq!(ledger.run_sheet("RS-2025-0007").unwrap().visit_history.len(), 2);
}

struct Directory;

#[async_trait]
impl PartyDirectory for Directory {
    async fn default_address(&self, _party_type: PartyType, party: &str) -> Result<Option<String>, DirectoryError> {
        Ok((party == "CUST-0042").then(|| "12 Mall Road, Varanasi".to_string()))
    }

    async fn default_contact(&self, _party_type: PartyType, party: &str) -> Result<Option<ContactDetails>, DirectoryError> {
        Ok((party == "CUST-0042").then(|| ContactDetails {
            mobile_no: None,
            phone: Some("0542-220011".into()),
            phone_nos: vec![],
        }))
    }

    async fn lead(&self, lead: &str) -> Result<Option<LeadDetails>, DirectoryError> {
        Ok((lead == "LEAD-0007").then(|| LeadDetails {
            lead_name: Some("Ravi Traders".into()),
            mobile_no: Some("98390 00000".into()),
            phone: None,
        }))
    }
}

#[tokio::test]
async fn test_fill_rows_and_create_visit_from_row() {
    let mut sheet = RunSheet {
        name: "RS-2025-0007".into(),
        party_list: vec![
            RunSheetRow::for_party(PartyType::Customer, "CUST-0042"),
            RunSheetRow::for_party(PartyType::Lead, "LEAD-0007"),
        ],
        ..Default::default()
    };

    fill_rows(&mut sheet, &Directory).await.unwrap();

    let customer = &sheet.party_list[0];
    assert_eq!(customer.address, "12 Mall Road, Varanasi");
    assert_eq!(customer.phone_number, "0542-220011");
    assert_eq!(customer.lead_name, "");

    let lead = &sheet.party_list[1];
    assert_eq!(lead.phone_number, "98390 00000");
    assert_eq!(lead.lead_name, "Ravi Traders");

    let visit = lead.new_visit(&sheet.name, Some("EMP-0011"));
    assert_eq!(visit.party_type, Some(PartyType::Lead));
    assert_eq!(visit.party_reference.as_deref(), Some("LEAD-0007"));
    assert_eq!(visit.party_name.as_deref(), Some("Ravi Traders"));
    assert_eq!(visit.run_sheet.as_deref(), Some("RS-2025-0007"));
    assert_eq!(visit.status, DocStatus::Draft);
}
