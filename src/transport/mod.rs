// Gateway module for transport - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod file_drop;
mod tcp;
mod traits;

// Public re-exports - the ONLY way to access transport functionality
pub use factory::TransportFactory;
pub use file_drop::FileDropTransport;
pub use tcp::TcpTransport;
pub use traits::{Transport, TransportResult};

#[cfg(test)]
pub(crate) use traits::MockTransport;
