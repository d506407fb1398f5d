use super::file_drop::FileDropTransport;
use super::tcp::TcpTransport;
use super::traits::Transport;
use crate::app::{TransportConfig, TransportKind};

/// Factory for creating the configured host transport
pub struct TransportFactory;

impl TransportFactory {
    /// Create a transport from configuration. Host location is always explicit.
    pub fn create(config: &TransportConfig) -> Box<dyn Transport> {
        match config.kind {
            TransportKind::FileDrop => Box::new(FileDropTransport::new(&config.file_drop)),
            TransportKind::Tcp => Box::new(TcpTransport::new(&config.tcp)),
        }
    }
}
