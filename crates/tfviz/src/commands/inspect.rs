//! `tfviz inspect` command implementation.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tfviz_diagrams::{AssembleOptions, DEFAULT_DPI, LayoutPreset, assemble, to_dot};
use tfviz_extract::{ScanResult, SkippedBlock, parse_dir};
use tfviz_model::ParsedConfig;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the inspect command.
#[derive(Args)]
pub(crate) struct InspectArgs {
    /// Directory containing .tf files.
    dir: PathBuf,

    /// Tier label attached to extracted resources.
    #[arg(long, default_value = "main")]
    tier: String,

    /// Emit Graphviz DOT instead of the JSON model.
    #[arg(long)]
    dot: bool,

    /// Figure title (DOT output only).
    #[arg(long, default_value = "Architecture")]
    title: String,

    /// Layout preset (DOT output only).
    #[arg(long, default_value = "paper")]
    preset: String,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// JSON payload for the default inspect output.
#[derive(Serialize)]
struct InspectReport<'a> {
    config: &'a ParsedConfig,
    skipped: &'a [SkippedBlock],
}

impl InspectArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let ScanResult { config, skipped } = parse_dir(&self.dir, &self.tier)?;
        for skip in &skipped {
            output.warning(&format!("Skipping {skip}"));
        }

        if self.dot {
            let preset = LayoutPreset::parse(&self.preset).ok_or_else(|| {
                CliError::Validation(format!("unknown preset '{}'", self.preset))
            })?;
            let description = assemble(
                std::slice::from_ref(&config),
                &AssembleOptions::new(self.title.clone()),
            );
            output.data(&to_dot(&description, &preset, DEFAULT_DPI));
        } else {
            let report = InspectReport {
                config: &config,
                skipped: &skipped,
            };
            output.data(&serde_json::to_string_pretty(&report)?);
        }

        Ok(())
    }
}
