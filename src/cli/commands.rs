use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{Map, Value};

use crate::{
    actions::{ActionResult, Dispatcher},
    app::{init_config, load_config},
};

use super::intent::{describe_outcome, parse_intent};
use super::{Cli, Commands, OutputFormat, RequestArgs};

/// Handle CLI subcommands, returning the process exit code
pub async fn handle_command(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Commands::Init => {
            let path = init_config()?;
            println!("Configuration ready at: {}", path.display());
            Ok(0)
        }
        Commands::Version => {
            show_version();
            Ok(0)
        }
        Commands::Schema => {
            let dispatcher = build_dispatcher(cli)?;
            println!("{}", serde_json::to_string_pretty(&dispatcher.tool_descriptor())?);
            Ok(0)
        }
        Commands::Compile(args) => {
            let dispatcher = build_dispatcher(cli)?;
            let command = dispatcher.prepare_json(&args.to_json()?)?;
            print!("{}", command.script);
            Ok(0)
        }
        Commands::Dispatch(args) => {
            let dispatcher = build_dispatcher(cli)?;
            let result = dispatcher.dispatch_json(&args.to_json()?).await;
            print_result(&result, cli.output_format)?;
            Ok(exit_code(&result))
        }
        Commands::Ask { text, dry_run } => {
            let Some(request) = parse_intent(text) else {
                println!("I couldn't map that to a Surge action.");
                return Ok(1);
            };

            if *dry_run {
                println!("{}", serde_json::to_string_pretty(&request)?);
                return Ok(0);
            }

            let dispatcher = build_dispatcher(cli)?;
            let result = dispatcher.dispatch(&request).await;
            match cli.output_format {
                OutputFormat::Text => println!("{}", describe_outcome(&request, &result)),
                OutputFormat::Json => print_result(&result, cli.output_format)?,
            }
            Ok(exit_code(&result))
        }
    }
}

fn build_dispatcher(cli: &Cli) -> Result<Dispatcher> {
    let config = load_config(cli.config.as_deref())?;
    Ok(Dispatcher::from_config(&config)?)
}

/// Show version information
pub fn show_version() {
    println!("surge-bridge v{}", env!("CARGO_PKG_VERSION"));
    println!("   Action bridge between AI agents and Surge XT");
}

fn exit_code(result: &ActionResult) -> i32 {
    if result.success {
        0
    } else {
        1
    }
}

fn print_result(result: &ActionResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text if result.success => {
            println!(
                "{} {}",
                "[OK]".green(),
                result.message.as_deref().unwrap_or_default()
            );
            if let Some(data) = result.data.as_deref().filter(|d| !d.is_empty()) {
                println!("  {}", data);
            }
        }
        OutputFormat::Text => {
            let kind = result
                .kind
                .map(|k| format!(" ({:?})", k))
                .unwrap_or_default();
            println!(
                "{}{} {}",
                "[ERROR]".red(),
                kind,
                result.error.as_deref().unwrap_or_default()
            );
        }
    }
    Ok(())
}

impl RequestArgs {
    /// Collect flags (or the raw --json body) into a request object
    pub fn to_json(&self) -> Result<Value> {
        if let Some(raw) = &self.json {
            return serde_json::from_str(raw).context("--json is not valid JSON");
        }

        let mut object = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                object.insert(key.to_string(), value);
            }
        };
        put("action", self.action.clone().map(Value::from));
        put("preset", self.preset.clone().map(Value::from));
        put("category", self.category.clone().map(Value::from));
        put("track", self.track.map(Value::from));
        put("parameter", self.parameter.map(Value::from));
        put("value", self.value.map(Value::from));
        put("steps", self.steps.map(Value::from));
        Ok(Value::Object(object))
    }
}
