use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::visit::{PartyType, StageId};

pub mod commands;

#[derive(Parser)]
#[command(name = "visit-workflow")]
#[command(about = "Record field visit progress stage by stage")]
#[command(long_about = "Tracks a field visit through check-in, waiting, meeting and check-out. \
                       Each stage is stamped with the current time, and check-in and check-out \
                       carry the device location when one is available.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new draft visit document
    New {
        /// Where to write the visit
        file: PathBuf,
        /// Party being visited
        #[arg(long, help = "Party reference, e.g. a customer or lead id")]
        party: Option<String>,
        /// Display name of the party
        #[arg(long, help = "Free-text party name when there is no reference")]
        party_name: Option<String>,
        /// Kind of party
        #[arg(long, default_value = "customer", help = "customer, lead or crm-deal")]
        party_type: PartyType,
        /// Employee making the visit
        #[arg(long)]
        employee: Option<String>,
        /// Run sheet the visit was planned on
        #[arg(long, help = "Create the visit from a run sheet row")]
        run_sheet: Option<String>,
        /// Purpose of the visit
        #[arg(long)]
        purpose: Option<String>,
        /// Overwrite an existing file
        #[arg(long, help = "Overwrite the visit file if it already exists")]
        force: bool,
    },
    /// Show the visit phase, the next stage and recorded stamps
    Status {
        file: PathBuf,
    },
    /// Record the next stage of a visit
    Advance {
        file: PathBuf,
        /// Stage to record (defaults to the next one)
        #[arg(long, help = "check-in, waiting-end, meeting-start, meeting-end or check-out")]
        stage: Option<StageId>,
        /// Device latitude
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Device longitude
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// List the visit stages in order
    Stages,
}
