/// Constants module to avoid magic numbers in the codebase

// Tool discovery
pub const TOOL_NAME: &str = "surge_control";
pub const TOOL_DESCRIPTION: &str = "Control Surge XT synthesizer presets and parameters";

// Request limits
pub const MAX_PRESET_NAME_LEN: usize = 128;
pub const MAX_MORPH_STEPS: i64 = 1000;

// Compiler defaults
pub const DEFAULT_MORPH_STEPS: u32 = 20;
pub const DEFAULT_INTEGRATION_SCRIPT: &str = "Scripts/ai_assistant_integration.lua";
pub const DEFAULT_CLIENT_SCRIPT: &str = "Scripts/surge_tcp_client.lua";

// Wire format
pub const REPLY_OK: &str = "OK";
pub const REPLY_ERROR: &str = "ERROR";
pub const GENERIC_FAILURE: &str = "Operation failed";

// Transport
pub const SCRIPT_FILE_PREFIX: &str = "surge_control_";
pub const SCRIPT_FILE_SUFFIX: &str = ".lua";
pub const DEFAULT_RUNNER_PROGRAM: &str = "reaper";
pub const DEFAULT_HOST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";
pub const DEFAULT_TCP_PORT: u16 = 9777;

// Configuration
pub const CONFIG_ENV_PREFIX: &str = "SURGE_BRIDGE_";
pub const LOCAL_CONFIG_PATH: &str = ".surge-bridge/config.toml";
