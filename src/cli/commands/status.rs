use anyhow::Result;
use std::path::PathBuf;

use statig::prelude::*;

use super::{load_visit, show_stamp};
use crate::visit::lifecycle::LifecycleEvent;
use crate::visit::{compute_actionable, has_party, StageTable, VisitLifecycle};

pub struct StatusCommand {
    pub file: PathBuf,
}

impl StatusCommand {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }

    pub async fn execute(&self) -> Result<()> {
        let (_, visit) = load_visit(&self.file).await?;
        let table = StageTable::standard();
        table.check_progression(&visit)?;

        let mut lifecycle = VisitLifecycle::new(&table).state_machine();
        lifecycle.handle(&LifecycleEvent::Resume {
            completed: table.completed_count(&visit),
        });

        println!("🚶 VISIT {}", visit.name.as_deref().unwrap_or("(unsaved)"));
        println!("==========================");
        println!("   Party:  {}", visit.party_display().unwrap_or("-"));
        if let Some(date) = visit.visit_date {
            println!("   Date:   {date}");
        }
        println!("   Status: {:?}", visit.status);
        println!("   Phase:  {}", lifecycle.inner().phase());
        println!();

        println!("📊 STAGES:");
        for stage in table.iter() {
            show_stamp(stage.id.label(), &visit, stage.id);
        }
        println!();

        match (compute_actionable(&visit, &table), has_party(&visit)) {
            (Some(next), true) => println!("👉 Next: {} ({})", next.label(), next.trigger()),
            (Some(_), false) => println!("⚠️  Select a party to start recording"),
            (None, _) => println!("🎉 All stages recorded"),
        }
        Ok(())
    }
}
