//! CLI argument parsing for the schedule-generation workflow.
//!
//! The CLI is intentionally thin: it collects input fields and backend
//! selection, then hands everything to the advisor, so the same core logic
//! can be reused elsewhere.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the maintenance-schedule workflow.
#[derive(Parser, Debug)]
#[command(
    name = "voltplan",
    version,
    about = "AI-assisted maintenance schedules for UK electrical installations",
    after_help = "Commands:\n  generate   Generate a schedule via the remote service\n  render     Re-render a saved plan JSON as text\n  init       Write a default config stub\n\nExamples:\n  voltplan generate --property-type domestic --description \"1970s consumer unit\" --postcode \"SW1A 1AA\"\n  voltplan generate --input request.json --json --out plan.json\n  voltplan generate --backend-command \"schedule-mock\" --transcript-dir /tmp/voltplan\n  voltplan render --plan plan.json\n  voltplan init",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level workflow commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Generate(GenerateArgs),
    Render(RenderArgs),
    Init(InitArgs),
}

/// Generate command inputs for one schedule request.
#[derive(Parser, Debug)]
#[command(about = "Generate a maintenance schedule via the remote service")]
pub struct GenerateArgs {
    /// Installation category (e.g. domestic, commercial, industrial)
    #[arg(long, value_name = "TYPE")]
    pub property_type: Option<String>,

    /// Free-text description of the installation
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// Site postcode
    #[arg(long, value_name = "POSTCODE")]
    pub postcode: Option<String>,

    /// Age of the installation in years
    #[arg(long, value_name = "YEARS")]
    pub age: Option<u32>,

    /// Date of the last periodic inspection
    #[arg(long, value_name = "DATE")]
    pub last_inspection: Option<String>,

    /// Known issues or previous faults
    #[arg(long, value_name = "TEXT")]
    pub known_issues: Option<String>,

    /// Read input fields from a JSON file (flags override file values)
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Backend HTTP endpoint
    #[arg(long, value_name = "URL", conflicts_with = "backend_command")]
    pub endpoint: Option<String>,

    /// Local backend command (reads request JSON on stdin)
    #[arg(long, value_name = "CMD")]
    pub backend_command: Option<String>,

    /// Emit the generated plan as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Write the generated plan JSON to a file
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Record request/response transcripts under this directory
    #[arg(long, value_name = "DIR")]
    pub transcript_dir: Option<PathBuf>,
}

/// Render command inputs for a saved plan.
#[derive(Parser, Debug)]
#[command(about = "Re-render a saved plan JSON as text")]
pub struct RenderArgs {
    /// Path to a plan JSON produced by `generate --out`
    #[arg(long, value_name = "PATH")]
    pub plan: PathBuf,
}

/// Init command inputs for bootstrapping a config file.
#[derive(Parser, Debug)]
#[command(about = "Write a default config stub")]
pub struct InitArgs {
    /// Config path (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Overwrite an existing config.json
    #[arg(long)]
    pub force: bool,
}
