use async_trait::async_trait;
use std::time::Duration;

use crate::actions::CompiledCommand;
use crate::utils::Result;

/// Raw reply from one host round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResult {
    /// Text the host produced, unparsed
    pub output: String,
    /// Whether the payload reached the host and a reply came back
    pub delivered: bool,
    pub elapsed: Duration,
}

impl TransportResult {
    pub fn delivered(output: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            output: output.into(),
            delivered: true,
            elapsed,
        }
    }

    pub fn undelivered(output: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            output: output.into(),
            delivered: false,
            elapsed,
        }
    }
}

/// Core trait that all host transports must implement.
///
/// An implementation owns any transient resource it creates for a call and
/// must release it on every exit path, including when the returned future
/// is dropped before completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a compiled payload to the host and wait for its reply
    async fn execute(&self, command: &CompiledCommand) -> Result<TransportResult>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
