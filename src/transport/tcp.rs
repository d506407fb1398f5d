//! Socket transport for a host-side listener.
//!
//! Framing: the payload is written as-is, then the write half is shut down;
//! the host executes it and writes its status line before closing.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::traits::{Transport, TransportResult};
use crate::actions::CompiledCommand;
use crate::app::TcpConfig;
use crate::utils::{Result, TransportFailure};

#[derive(Debug, Clone)]
pub struct TcpTransport {
    address: String,
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(config: &TcpConfig) -> Self {
        Self {
            address: format!("{}:{}", config.host, config.port),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn exchange(&self, payload: &[u8]) -> std::result::Result<String, TransportFailure> {
        let mut stream = TcpStream::connect(self.address.as_str())
            .await
            .map_err(|source| TransportFailure::Unreachable {
                address: self.address.clone(),
                source,
            })?;

        stream
            .write_all(payload)
            .await
            .map_err(|e| TransportFailure::io("failed to send payload", e))?;
        stream
            .shutdown()
            .await
            .map_err(|e| TransportFailure::io("failed to finish payload", e))?;

        let mut reply = Vec::new();
        stream
            .read_to_end(&mut reply)
            .await
            .map_err(|e| TransportFailure::io("failed to read host reply", e))?;

        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn execute(&self, command: &CompiledCommand) -> Result<TransportResult> {
        let start = Instant::now();
        debug!("Sending {} to {}", command.action, self.address);

        let output = timeout(self.timeout, self.exchange(command.script.as_bytes()))
            .await
            .map_err(|_| TransportFailure::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        // A host that closes without writing never processed the payload
        if output.trim().is_empty() {
            return Ok(TransportResult::undelivered(output, start.elapsed()));
        }
        Ok(TransportResult::delivered(output, start.elapsed()))
    }

    fn name(&self) -> &'static str {
        "tcp"
    }
}
