//! Command line interface of the shelter search tooling.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::errors::IngestError;
use crate::orchestrator::Orchestrator;

#[derive(Parser)]
#[command(
    name = "shelter-search",
    about = "Maintain the shelter search indexes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Upload searchable fields, facets and ranking of every index
    Settings,

    /// Rebuild every index from a JSON snapshot
    Reindex {
        /// Snapshot file with animals, breeds, colors, fosterFamilies and users lists
        snapshot: PathBuf,

        /// Empty each index before writing the snapshot
        #[arg(long)]
        clear: bool,
    },

    /// Apply write-through change events from a JSON lines file
    Sync {
        /// File with one change event per line
        events: PathBuf,
    },
}

impl Commands {
    /// Run the command to completion.
    pub async fn execute(self, orchestrator: &mut Orchestrator) -> Result<(), IngestError> {
        match self {
            Self::Settings => orchestrator.upload_settings().await,
            Self::Reindex { snapshot, clear } => orchestrator.reindex_file(snapshot, clear).await,
            Self::Sync { events } => {
                let summary = orchestrator.sync_file(events).await?;
                info!(
                    events_processed = summary.events_processed,
                    documents_indexed = summary.documents_indexed,
                    "Change events applied"
                );
                Ok(())
            }
        }
    }
}
