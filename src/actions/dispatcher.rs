//! Public entry point: validate, compile, execute, normalize.
//!
//! Every failure, including a panicking transport, comes back as an
//! `ActionResult` with `success == false`; nothing crosses this boundary
//! as an error or unwind.

use futures::FutureExt;
use serde::Deserialize;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, warn};

use super::compiler::{CommandCompiler, CompiledCommand, CompilerOptions};
use super::normalizer::normalize_reply;
use super::schema::SchemaRegistry;
use super::types::{ActionRequest, ActionResult, FailureKind};
use crate::app::Config;
use crate::transport::{Transport, TransportFactory};
use crate::utils::{Result, TransportFailure};

pub struct Dispatcher {
    registry: SchemaRegistry,
    compiler: CommandCompiler,
    transport: Box<dyn Transport>,
}

impl Dispatcher {
    pub fn new(compiler: CommandCompiler, transport: Box<dyn Transport>) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            compiler,
            transport,
        }
    }

    /// Build a dispatcher with the configured compiler options and transport
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let transport = TransportFactory::create(&config.transport);
        debug!("Using {} transport", transport.name());
        Ok(Self::new(
            CommandCompiler::new(CompilerOptions::from(&config.compiler)),
            transport,
        ))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Tool descriptor for discovery by tool-calling frameworks
    pub fn tool_descriptor(&self) -> Value {
        self.registry.tool_descriptor()
    }

    /// Validate and compile without touching the host
    pub fn prepare(&self, request: &ActionRequest) -> Result<CompiledCommand> {
        self.registry.validate(request)?;
        self.compiler.compile(request)
    }

    /// `prepare` for raw JSON, with the same parsing rules as `dispatch_json`
    pub fn prepare_json(&self, input: &Value) -> Result<CompiledCommand> {
        let request = self.parse_json(input)?;
        self.prepare(&request)
    }

    /// Run one request through the bridge
    pub async fn dispatch(&self, request: &ActionRequest) -> ActionResult {
        match self.run(request).await {
            Ok(result) => {
                if let Some(kind) = result.kind {
                    warn!(
                        "{} failed ({:?}): {}",
                        request.kind,
                        kind,
                        result.error.as_deref().unwrap_or_default()
                    );
                }
                result
            }
            Err(err) => {
                let kind = err.kind();
                warn!("{} failed ({:?}): {}", request.kind, kind, err);
                ActionResult::failure(kind, err.to_string())
            }
        }
    }

    /// Validate untyped JSON input, then dispatch it
    pub async fn dispatch_json(&self, input: &Value) -> ActionResult {
        match self.parse_json(input) {
            Ok(request) => self.dispatch(&request).await,
            Err(err) => {
                warn!("Rejected request: {}", err);
                ActionResult::failure(err.kind(), err.to_string())
            }
        }
    }

    fn parse_json(&self, input: &Value) -> Result<ActionRequest> {
        self.registry.validate_json(input)?;
        Ok(ActionRequest::deserialize(input)?)
    }

    async fn run(&self, request: &ActionRequest) -> Result<ActionResult> {
        let command = self.prepare(request)?;
        debug!("Compiled {} ({} bytes)", command.action, command.script.len());

        // The call itself sits inside the guarded future so a synchronous
        // panic in `execute` is caught too
        let reply = AssertUnwindSafe(async { self.transport.execute(&command).await })
            .catch_unwind()
            .await
            .map_err(|panic| TransportFailure::Panicked(panic_message(panic)))??;

        if !reply.delivered {
            let reason = Some(reply.output.trim())
                .filter(|text| !text.is_empty())
                .unwrap_or("host did not receive the command");
            return Ok(ActionResult::failure(FailureKind::Transport, reason));
        }

        info!(
            "{} answered in {} ms",
            command.action,
            reply.elapsed.as_millis()
        );
        Ok(normalize_reply(&command, &reply.output))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
