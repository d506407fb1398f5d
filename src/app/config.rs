use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::actions::{CompilerOptions, Field};
use crate::utils::BridgeError;
use crate::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_CLIENT_SCRIPT, DEFAULT_HOST_TIMEOUT_SECS,
    DEFAULT_INTEGRATION_SCRIPT, DEFAULT_MORPH_STEPS, DEFAULT_RUNNER_PROGRAM, DEFAULT_TCP_HOST,
    DEFAULT_TCP_PORT, LOCAL_CONFIG_PATH,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How payloads reach the host
    #[serde(default)]
    pub transport: TransportConfig,

    /// Script generation settings
    #[serde(default)]
    pub compiler: CompilerConfig,
}

impl Config {
    /// Reject settings no request could run with
    pub fn validate(&self) -> crate::utils::Result<()> {
        Field::Steps
            .check_integer(i64::from(self.compiler.morph_steps))
            .map_err(|e| BridgeError::Config(format!("compiler.morph_steps: {e}")))?;
        if self.transport.file_drop.timeout_secs == 0 {
            return Err(BridgeError::Config(
                "transport.file_drop.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.transport.tcp.timeout_secs == 0 {
            return Err(BridgeError::Config(
                "transport.tcp.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    FileDrop,
    Tcp,
}

/// Transport selection and per-transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub kind: TransportKind,
    pub file_drop: FileDropConfig,
    pub tcp: TcpConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::FileDrop,
            file_drop: FileDropConfig::default(),
            tcp: TcpConfig::default(),
        }
    }
}

/// Script-file transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDropConfig {
    /// Where payload files are written (system temp dir when unset)
    pub script_dir: Option<PathBuf>,
    /// Program that executes a script file inside the host
    pub runner_program: String,
    /// Arguments placed before the script path
    pub runner_args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for FileDropConfig {
    fn default() -> Self {
        Self {
            script_dir: None,
            runner_program: DEFAULT_RUNNER_PROGRAM.to_string(),
            runner_args: vec!["-nonewinst".to_string()],
            timeout_secs: DEFAULT_HOST_TIMEOUT_SECS,
        }
    }
}

/// Socket transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TCP_HOST.to_string(),
            port: DEFAULT_TCP_PORT,
            timeout_secs: DEFAULT_HOST_TIMEOUT_SECS,
        }
    }
}

/// Script generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Morph interpolation steps when a request gives none
    pub morph_steps: u32,
    /// Host integration script, relative to REAPER's resource path
    pub integration_script: String,
    /// Host TCP client script, relative to REAPER's resource path
    pub client_script: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            morph_steps: DEFAULT_MORPH_STEPS,
            integration_script: DEFAULT_INTEGRATION_SCRIPT.to_string(),
            client_script: DEFAULT_CLIENT_SCRIPT.to_string(),
        }
    }
}

impl From<&CompilerConfig> for CompilerOptions {
    fn from(config: &CompilerConfig) -> Self {
        Self {
            morph_steps: config.morph_steps,
            integration_script: config.integration_script.clone(),
            client_script: config.client_script.clone(),
        }
    }
}

/// Load configuration from multiple sources.
///
/// Later sources win: defaults, global config, local project config, the
/// explicit file if given, then `SURGE_BRIDGE_` environment variables
/// (nested keys separated by `__`, e.g. `SURGE_BRIDGE_TRANSPORT__KIND=tcp`).
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut files = Vec::new();
    if let Ok(config_dir) = get_config_dir() {
        files.push(config_dir.join("config.toml"));
    }
    files.push(PathBuf::from(LOCAL_CONFIG_PATH));

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        files.push(path.to_path_buf());
    }

    let config: Config = figment_from(&files)
        .merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
        .extract()
        .context("Failed to load configuration")?;
    config.validate()?;
    Ok(config)
}

/// Defaults merged with whichever of `files` exist, in order
fn figment_from(files: &[PathBuf]) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    for file in files.iter().filter(|file| file.exists()) {
        figment = figment.merge(Toml::file(file));
    }
    figment
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "surge-bridge") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("surge-bridge"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(path)
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
    }

    Ok(config_file)
}
