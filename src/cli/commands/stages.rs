use anyhow::Result;

use crate::visit::StageTable;

pub struct StagesCommand {
    pub table: StageTable,
}

impl StagesCommand {
    pub fn new() -> Self {
        Self {
            table: StageTable::standard(),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        println!("📋 VISIT STAGES");
        println!("===============");
        for (index, stage) in self.table.iter().enumerate() {
            let geotag = if stage.geotag { "📍" } else { "  " };
            println!(
                "{}. {} {:<14} {:<14} {}",
                index + 1,
                geotag,
                stage.id.label(),
                stage.id.as_str(),
                stage.trigger
            );
        }
        Ok(())
    }
}

impl Default for StagesCommand {
    fn default() -> Self {
        Self::new()
    }
}
