//! `tfviz render` command implementation.

use std::path::PathBuf;

use clap::Args;
use tfviz_config::{CliSettings, Config, SourceConfig};
use tfviz_diagrams::{
    AssembleOptions, FigureRequest, LayoutPreset, OutputFormat, assemble, create_agent,
    render_all, to_dot,
};
use tfviz_extract::parse_dir;
use tfviz_model::ParsedConfig;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Figure title (overrides config).
    #[arg(long)]
    title: Option<String>,

    /// Kroki server URL for figure rendering (overrides config).
    #[arg(long)]
    kroki_url: Option<String>,

    /// Rendering DPI (overrides config).
    #[arg(long)]
    dpi: Option<u32>,

    /// Layout preset: paper, poster, or presentation (overrides config).
    #[arg(long)]
    preset: Option<String>,

    /// Output format: svg, png, or pdf (overrides config).
    #[arg(long)]
    format: Option<String>,

    /// Output directory for rendered figures (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Source tree as `TIER=DIR`, replacing configured sources (repeatable).
    #[arg(long = "source", value_name = "TIER=DIR")]
    sources: Vec<String>,

    /// Output filename stem.
    #[arg(long, default_value = "architecture")]
    name: String,

    /// Path to configuration file (default: auto-discover tfviz.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            title: self.title.clone(),
            kroki_url: self.kroki_url.clone(),
            dpi: self.dpi,
            preset: self.preset.clone(),
            format: self.format.clone(),
            output_dir: self.output_dir.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let sources = if self.sources.is_empty() {
            config.sources_resolved.clone()
        } else {
            parse_source_args(&self.sources)?
        };
        if sources.is_empty() {
            return Err(CliError::Validation(
                "no source trees configured; add [[sources]] entries to tfviz.toml \
                 or pass --source TIER=DIR"
                    .to_owned(),
            ));
        }

        let diagrams = &config.diagrams_resolved;
        let preset = LayoutPreset::parse(&diagrams.preset).ok_or_else(|| {
            CliError::Validation(format!("unknown preset '{}'", diagrams.preset))
        })?;
        let format = OutputFormat::parse(&diagrams.format).ok_or_else(|| {
            CliError::Validation(format!("unknown format '{}'", diagrams.format))
        })?;

        output.highlight(&format!(
            "Rendering '{}' ({}, {}, {} dpi)",
            config.project.title, preset.name, diagrams.format, diagrams.dpi
        ));

        let mut parsed: Vec<ParsedConfig> = Vec::with_capacity(sources.len());
        for source in &sources {
            output.info(&format!(
                "Source: {} (tier '{}')",
                source.dir.display(),
                source.tier
            ));
            let result = parse_dir(&source.dir, &source.tier)?;
            for skip in &result.skipped {
                output.warning(&format!("Skipping {skip}"));
            }
            parsed.push(result.config);
        }

        let mut options = AssembleOptions::new(config.project.title.clone());
        if let Some(tier) = config.runtime_tier() {
            options = options.runtime_tier(tier);
        }

        let description = assemble(&parsed, &options);
        output.info(&format!(
            "Assembled {} nodes and {} edges",
            description.nodes.len(),
            description.edges.len()
        ));

        let dot = to_dot(&description, &preset, diagrams.dpi);

        std::fs::create_dir_all(&diagrams.output_dir)?;

        let agent = create_agent(diagrams.timeout);
        let figures = vec![FigureRequest::new(self.name.clone(), dot)];
        let result = render_all(
            &figures,
            &diagrams.kroki_url,
            &diagrams.output_dir,
            format,
            diagrams.dpi,
            &agent,
        );

        for figure in &result.rendered {
            output.success(&format!(
                "Rendered {} ({} bytes)",
                figure.path.display(),
                figure.bytes
            ));
        }
        for error in &result.errors {
            output.error(&format!("Failed to render {error}"));
        }

        if result.errors.is_empty() {
            Ok(())
        } else {
            Err(CliError::Render(format!(
                "{} figure(s) failed to render",
                result.errors.len()
            )))
        }
    }
}

/// Parse `TIER=DIR` source arguments.
fn parse_source_args(args: &[String]) -> Result<Vec<SourceConfig>, CliError> {
    args.iter()
        .map(|arg| {
            let (tier, dir) = arg.split_once('=').ok_or_else(|| {
                CliError::Validation(format!("invalid --source '{arg}', expected TIER=DIR"))
            })?;
            if tier.is_empty() || dir.is_empty() {
                return Err(CliError::Validation(format!(
                    "invalid --source '{arg}', expected TIER=DIR"
                )));
            }
            Ok(SourceConfig {
                dir: PathBuf::from(dir),
                tier: tier.to_owned(),
                runtime: false,
            })
        })
        .collect()
}
