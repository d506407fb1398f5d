use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "surge-bridge")]
#[command(version)]
#[command(about = "Dispatch preset and parameter actions to Surge XT running in REAPER", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send an action to the host and print the result
    Dispatch(RequestArgs),
    /// Print the generated host script without sending it
    Compile(RequestArgs),
    /// Print the tool descriptor for tool-calling frameworks
    Schema,
    /// Map a plain-language request onto an action and dispatch it
    Ask {
        /// What you want, e.g. "give me a deep bass sound"
        text: String,
        /// Show the mapped action without dispatching it
        #[arg(long)]
        dry_run: bool,
    },
    /// Initialize configuration
    Init,
    /// Show version information
    Version,
}

/// Request fields, mirroring the tool schema
#[derive(Args, Debug, Default)]
pub struct RequestArgs {
    /// Action: load_preset, set_parameter, list_presets or morph
    #[arg(short, long, required_unless_present = "json")]
    pub action: Option<String>,

    /// Preset name to load
    #[arg(long)]
    pub preset: Option<String>,

    /// Preset category for semantic search
    #[arg(long)]
    pub category: Option<String>,

    /// Track index in REAPER (0-based)
    #[arg(long, allow_negative_numbers = true)]
    pub track: Option<i64>,

    /// Parameter ID
    #[arg(long, allow_negative_numbers = true)]
    pub parameter: Option<i64>,

    /// Parameter value or morph target (0-1)
    #[arg(long, allow_negative_numbers = true)]
    pub value: Option<f64>,

    /// Morph interpolation steps
    #[arg(long, allow_negative_numbers = true)]
    pub steps: Option<i64>,

    /// Full request as a JSON object instead of flags
    #[arg(long, conflicts_with_all = ["action", "preset", "category", "track", "parameter", "value", "steps"])]
    pub json: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
}
