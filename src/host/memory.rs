// In-memory host adapters for embedding and demos

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::dispatch::errors::ReferenceError;
use crate::dispatch::references::{party_log_table, ReferenceLedger, VisitReference, RUN_SHEET_LOG_TABLE};
use crate::dispatch::run_sheet::{RunSheet, RunSheetLog};
use crate::visit::errors::StoreError;
use crate::visit::traits::DocumentStore;
use crate::visit::types::{PartyType, Visit};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Document store keeping visits in a map. New documents are named
/// `VISIT-00001`, `VISIT-00002`, ...
#[derive(Debug, Default)]
pub struct MemoryStore {
    visits: Mutex<HashMap<String, Visit>>,
    next_id: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, visit: Visit) -> Result<(), StoreError> {
        let name = visit
            .name
            .clone()
            .ok_or_else(|| StoreError::Rejected("visit has no name".to_string()))?;
        locked(&self.visits).insert(name, visit);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Visit> {
        locked(&self.visits).get(name).cloned()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save(&self, visit: &Visit) -> Result<Visit, StoreError> {
        let mut saved = visit.clone();
        if saved.name.is_none() {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            saved.name = Some(format!("VISIT-{id:05}"));
        }
        self.insert(saved.clone())?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(saved)
    }

    async fn reload(&self, name: &str) -> Result<Visit, StoreError> {
        self.get(name).ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

/// Ledger over in-memory run sheets and party logs.
///
/// Only registered run sheets and parties have log tables; writing to any
/// other target fails with `MissingTable`.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    employees: Mutex<HashMap<String, String>>,
    run_sheets: Mutex<HashMap<String, RunSheet>>,
    parties: Mutex<HashMap<(PartyType, String), Vec<VisitReference>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_employee(&self, id: &str, name: &str) {
        locked(&self.employees).insert(id.to_string(), name.to_string());
    }

    pub fn add_run_sheet(&self, sheet: RunSheet) {
        locked(&self.run_sheets).insert(sheet.name.clone(), sheet);
    }

    pub fn add_party(&self, party_type: PartyType, party: &str) {
        locked(&self.parties).insert((party_type, party.to_string()), Vec::new());
    }

    pub fn run_sheet(&self, name: &str) -> Option<RunSheet> {
        locked(&self.run_sheets).get(name).cloned()
    }

    fn missing_run_sheet(run_sheet: &str) -> ReferenceError {
        ReferenceError::MissingTable {
            parent: format!("Run Sheet {run_sheet}"),
            table: RUN_SHEET_LOG_TABLE,
        }
    }

    fn missing_party(party_type: PartyType, party: &str) -> ReferenceError {
        ReferenceError::MissingTable {
            parent: format!("{party_type} {party}"),
            table: party_log_table(party_type),
        }
    }
}

#[async_trait]
impl ReferenceLedger for MemoryLedger {
    async fn employee_name(&self, employee: &str) -> Result<Option<String>, ReferenceError> {
        Ok(locked(&self.employees).get(employee).cloned())
    }

    async fn run_sheet_logs(&self, run_sheet: &str) -> Result<Vec<RunSheetLog>, ReferenceError> {
        locked(&self.run_sheets)
            .get(run_sheet)
            .map(|sheet| sheet.visit_history.clone())
            .ok_or_else(|| Self::missing_run_sheet(run_sheet))
    }

    async fn set_run_sheet_logs(&self, run_sheet: &str, rows: Vec<RunSheetLog>) -> Result<(), ReferenceError> {
        let mut sheets = locked(&self.run_sheets);
        let sheet = sheets
            .get_mut(run_sheet)
            .ok_or_else(|| Self::missing_run_sheet(run_sheet))?;
        sheet.visit_history = rows;
        Ok(())
    }

    async fn party_logs(&self, party_type: PartyType, party: &str) -> Result<Vec<VisitReference>, ReferenceError> {
        locked(&self.parties)
            .get(&(party_type, party.to_string()))
            .cloned()
            .ok_or_else(|| Self::missing_party(party_type, party))
    }

    async fn set_party_logs(
        &self,
        party_type: PartyType,
        party: &str,
        rows: Vec<VisitReference>,
    ) -> Result<(), ReferenceError> {
        let mut parties = locked(&self.parties);
        let log = parties
            .get_mut(&(party_type, party.to_string()))
            .ok_or_else(|| Self::missing_party(party_type, party))?;
        *log = rows;
        Ok(())
    }
}

impl MemoryLedger {
    pub fn party_log(&self, party_type: PartyType, party: &str) -> Option<Vec<VisitReference>> {
        locked(&self.parties).get(&(party_type, party.to_string())).cloned()
    }
}
