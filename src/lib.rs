pub mod actions;
pub mod app;
pub mod cli;
pub mod constants;
pub mod transport;
pub mod utils;

pub use actions::{ActionKind, ActionRequest, ActionResult, Dispatcher, PresetCategory};
pub use app::{load_config, Config};
pub use transport::{FileDropTransport, TcpTransport, Transport};
pub use utils::BridgeError;
