use anyhow::Result;
use clap::Parser;

use visit_workflow::cli::commands::{AdvanceCommand, NewCommand, StagesCommand, StatusCommand};
use visit_workflow::cli::{Cli, Commands};
use visit_workflow::config::{config, ObservabilityConfig};
use visit_workflow::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let observability = match config() {
        Ok(config) => config.observability.clone(),
        Err(_) => ObservabilityConfig::default(),
    };
    if let Err(e) = init_telemetry(&observability) {
        eprintln!("Warning: Failed to initialize telemetry: {e}");
    }

    tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            Commands::New {
                file,
                party,
                party_name,
                party_type,
                employee,
                run_sheet,
                purpose,
                force,
            } => {
                NewCommand {
                    file,
                    party,
                    party_name,
                    party_type,
                    employee,
                    run_sheet,
                    purpose,
                    force,
                }
                .execute()
                .await
            }
            Commands::Status { file } => StatusCommand::new(file).execute().await,
            Commands::Advance {
                file,
                stage,
                lat,
                lon,
            } => {
                AdvanceCommand::new(file)
                    .with_stage(stage)
                    .with_position(lat.zip(lon))
                    .execute()
                    .await
            }
            Commands::Stages => StagesCommand::new().execute().await,
        }
    })
}
