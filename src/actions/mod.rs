// Gateway module for actions - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod compiler;
mod dispatcher;
mod normalizer;
mod schema;
mod types;

// Public re-exports - the ONLY way to access action functionality
pub use compiler::{CommandCompiler, CompiledCommand, CompilerOptions, ResponseGrammar};
pub use dispatcher::Dispatcher;
pub use normalizer::{normalize, normalize_reply, parse_status_line, HostReply};
pub use schema::{ActionSpec, Field, FieldSpec, FieldType, SchemaRegistry};
pub use types::{ActionKind, ActionRequest, ActionResult, FailureKind, PresetCategory};
