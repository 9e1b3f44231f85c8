use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::dispatch::RunSheetRow;
use crate::host::JsonFileStore;
use crate::visit::{DocumentStore, PartyType, Visit};

pub struct NewCommand {
    pub file: PathBuf,
    pub party: Option<String>,
    pub party_name: Option<String>,
    pub party_type: PartyType,
    pub employee: Option<String>,
    pub run_sheet: Option<String>,
    pub purpose: Option<String>,
    pub force: bool,
}

impl NewCommand {
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            party: None,
            party_name: None,
            party_type: PartyType::Customer,
            employee: None,
            run_sheet: None,
            purpose: None,
            force: false,
        }
    }

    pub fn draft(&self) -> Visit {
        let mut visit = match (&self.run_sheet, &self.party) {
            (Some(run_sheet), Some(party)) => RunSheetRow::for_party(self.party_type, party.clone())
                .new_visit(run_sheet, self.employee.as_deref()),
            _ => Visit {
                party_type: Some(self.party_type),
                party_reference: self.party.clone(),
                employee: self.employee.clone(),
                run_sheet: self.run_sheet.clone(),
                ..Default::default()
            },
        };
        if self.party_name.is_some() {
            visit.party_name = self.party_name.clone();
        }
        visit.purpose = self.purpose.clone();
        visit
    }

    pub async fn execute(&self) -> Result<()> {
        if self.file.exists() && !self.force {
            bail!(
                "{} already exists (use --force to overwrite)",
                self.file.display()
            );
        }

        let store = JsonFileStore::new(&self.file);
        let saved = store.save(&self.draft()).await?;

        println!(
            "📝 Created visit {} at {}",
            saved.name.as_deref().unwrap_or("-"),
            self.file.display()
        );
        match saved.party_display() {
            Some(party) => println!("   Party: {party}"),
            None => println!("   ⚠️  No party yet; set one before recording progress"),
        }
        Ok(())
    }
}
