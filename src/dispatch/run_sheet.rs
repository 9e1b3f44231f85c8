// Run sheets - the dispatch list visits are created from

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dispatch::errors::DirectoryError;
use crate::visit::types::{PartyType, Visit};

/// A dispatch list of parties to visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSheet {
    pub name: String,
    pub party_list: Vec<RunSheetRow>,
    /// Visits submitted against this run sheet
    pub visit_history: Vec<RunSheetLog>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSheetRow {
    pub party_type: Option<PartyType>,
    pub party: Option<String>,
    /// Display form of the party's default address
    pub address: String,
    pub phone_number: String,
    pub lead_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSheetLog {
    pub visit_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub mobile_no: Option<String>,
    pub phone: Option<String>,
    /// Additional numbers in entry order
    pub phone_nos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadDetails {
    pub lead_name: Option<String>,
    pub mobile_no: Option<String>,
    pub phone: Option<String>,
}

/// Party lookups provided by the host
#[async_trait]
pub trait PartyDirectory: Send + Sync {
    /// Display text of the party's default address
    async fn default_address(&self, party_type: PartyType, party: &str)
        -> Result<Option<String>, DirectoryError>;

    async fn default_contact(&self, party_type: PartyType, party: &str)
        -> Result<Option<ContactDetails>, DirectoryError>;

    async fn lead(&self, lead: &str) -> Result<Option<LeadDetails>, DirectoryError>;
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ContactDetails {
    /// Mobile first, then phone, then the first numbered entry
    pub fn best_phone(&self) -> Option<&str> {
        non_blank(&self.mobile_no)
            .or_else(|| non_blank(&self.phone))
            .or_else(|| {
                self.phone_nos
                    .iter()
                    .map(|p| p.trim())
                    .find(|p| !p.is_empty())
            })
    }
}

impl RunSheetRow {
    pub fn for_party(party_type: PartyType, party: impl Into<String>) -> Self {
        Self {
            party_type: Some(party_type),
            party: Some(party.into()),
            ..Default::default()
        }
    }

    /// Draft visit prefilled from this row
    pub fn new_visit(&self, run_sheet: &str, employee: Option<&str>) -> Visit {
        Visit {
            party_type: self.party_type,
            party_reference: self.party.clone(),
            party_name: (!self.lead_name.trim().is_empty()).then(|| self.lead_name.clone()),
            employee: employee.map(str::to_string),
            run_sheet: Some(run_sheet.to_string()),
            ..Default::default()
        }
    }

    async fn fill(&mut self, directory: &dyn PartyDirectory) -> Result<(), DirectoryError> {
        let mut address = String::new();
        let mut phone = String::new();

        if let (Some(party_type), Some(party)) = (self.party_type, non_blank(&self.party)) {
            if let Some(display) = directory.default_address(party_type, party).await? {
                address = display;
            }
            if let Some(contact) = directory.default_contact(party_type, party).await? {
                phone = contact.best_phone().unwrap_or_default().to_string();
            }
            if party_type == PartyType::Lead && phone.is_empty() {
                if let Some(lead) = directory.lead(party).await? {
                    phone = non_blank(&lead.mobile_no)
                        .or_else(|| non_blank(&lead.phone))
                        .unwrap_or_default()
                        .to_string();
                }
            }
        }

        self.address = address;
        self.phone_number = phone;
        self.fill_lead_name(directory).await
    }

    async fn fill_lead_name(&mut self, directory: &dyn PartyDirectory) -> Result<(), DirectoryError> {
        // Cleared on non-lead rows so a changed party type leaves nothing stale
        self.lead_name = match (self.party_type, non_blank(&self.party)) {
            (Some(PartyType::Lead), Some(party)) => directory
                .lead(party)
                .await?
                .and_then(|lead| lead.lead_name)
                .unwrap_or_default(),
            _ => String::new(),
        };
        Ok(())
    }
}

/// Fill address, phone number and lead name on every row of the sheet.
pub async fn fill_rows(sheet: &mut RunSheet, directory: &dyn PartyDirectory) -> Result<(), DirectoryError> {
    for row in sheet.party_list.iter_mut() {
        row.fill(directory).await?;
    }
    tracing::debug!(run_sheet = %sheet.name, rows = sheet.party_list.len(), "Run sheet rows filled");
    Ok(())
}
