/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;
mod intent;

pub use args::{Cli, Commands, OutputFormat, RequestArgs};
pub use commands::{handle_command, show_version};
pub use intent::{describe_outcome, parse_intent};
