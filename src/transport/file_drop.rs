//! Script-file transport: the payload is dropped into a uniquely named Lua
//! file and a host runner command is pointed at it.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tempfile::TempPath;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::traits::{Transport, TransportResult};
use crate::actions::CompiledCommand;
use crate::app::FileDropConfig;
use crate::constants::{SCRIPT_FILE_PREFIX, SCRIPT_FILE_SUFFIX};
use crate::utils::{Result, TransportFailure};

/// Runs each payload as `<program> <args...> <script path>` and reads stdout
#[derive(Debug, Clone)]
pub struct FileDropTransport {
    script_dir: PathBuf,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl FileDropTransport {
    pub fn new(config: &FileDropConfig) -> Self {
        Self {
            script_dir: config
                .script_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            program: config.runner_program.clone(),
            args: config.runner_args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    /// Write the payload to a fresh file. The returned guard deletes it on drop.
    fn write_script(&self, script: &str) -> std::result::Result<TempPath, TransportFailure> {
        let mut file = tempfile::Builder::new()
            .prefix(SCRIPT_FILE_PREFIX)
            .suffix(SCRIPT_FILE_SUFFIX)
            .tempfile_in(&self.script_dir)
            .map_err(|e| {
                TransportFailure::io(
                    format!("failed to create script file in {}", self.script_dir.display()),
                    e,
                )
            })?;

        file.write_all(script.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| TransportFailure::io("failed to write script file", e))?;

        // Close our handle so the runner can open the file on every platform
        Ok(file.into_temp_path())
    }
}

#[async_trait]
impl Transport for FileDropTransport {
    async fn execute(&self, command: &CompiledCommand) -> Result<TransportResult> {
        let start = Instant::now();
        let script = self.write_script(&command.script)?;

        debug!(
            "Running {} for {} via {}",
            self.program,
            command.action,
            script.display()
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(&*script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| TransportFailure::Timeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| TransportFailure::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Err(e) = script.close() {
            warn!("Failed to remove script file: {}", e);
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            debug!("Host runner stderr: {}", String::from_utf8_lossy(&output.stderr).trim());
        }

        if stdout.trim().is_empty() {
            if !output.status.success() {
                return Err(TransportFailure::NoReply {
                    code: output.status.code().unwrap_or(-1),
                }
                .into());
            }
            // The runner exited cleanly without handing the payload to the host
            return Ok(TransportResult::undelivered(stdout, start.elapsed()));
        }

        Ok(TransportResult::delivered(stdout, start.elapsed()))
    }

    fn name(&self) -> &'static str {
        "file_drop"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::actions::{ActionRequest, CommandCompiler};
    use crate::utils::BridgeError;
    use tempfile::TempDir;

    fn transport(dir: &TempDir, program: &str, args: &[&str]) -> FileDropTransport {
        FileDropTransport::new(&FileDropConfig {
            script_dir: Some(dir.path().to_path_buf()),
            runner_program: program.to_string(),
            runner_args: args.iter().map(|a| a.to_string()).collect(),
            timeout_secs: 5,
        })
    }

    fn shell(dir: &TempDir, script: &str) -> FileDropTransport {
        // `sh -c <script> <path>` binds the payload path to $0
        transport(dir, "sh", &["-c", script])
    }

    fn command() -> CompiledCommand {
        CommandCompiler::default()
            .compile(&ActionRequest::set_parameter(10, 0.8))
            .unwrap()
    }

    fn leftover_files(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_runner_reads_payload_and_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let transport = shell(&dir, "head -n 1 \"$0\" | sed 's/^-- surge_control: /OK:/'");

        let result = transport.execute(&command()).await.unwrap();

        assert!(result.delivered);
        assert_eq!(result.output.trim(), "OK:set_parameter");
        assert_eq!(leftover_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_host_error_reply_is_still_delivered() {
        let dir = TempDir::new().unwrap();
        let transport = shell(&dir, "echo ERROR:busy; exit 1");

        let result = transport.execute(&command()).await.unwrap();
        assert_eq!(result.output.trim(), "ERROR:busy");
        assert_eq!(leftover_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_silent_clean_exit_is_undelivered() {
        let dir = TempDir::new().unwrap();
        let transport = shell(&dir, "exit 0");

        let result = transport.execute(&command()).await.unwrap();
        assert!(!result.delivered);
        assert_eq!(leftover_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_silent_failing_runner_is_transport_error() {
        let dir = TempDir::new().unwrap();
        let transport = shell(&dir, "exit 3");

        let err = transport.execute(&command()).await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Transport(TransportFailure::NoReply { code: 3 })
        ));
        assert_eq!(leftover_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_failing_calls_leak_no_scripts() {
        let dir = TempDir::new().unwrap();
        let transport = transport(&dir, "/nonexistent/surge-host-runner", &[]);
        let command = command();

        for _ in 0..1000 {
            let err = transport.execute(&command).await.unwrap_err();
            assert!(matches!(
                err,
                BridgeError::Transport(TransportFailure::Spawn { .. })
            ));
        }
        assert_eq!(leftover_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_timeout_removes_script() {
        let dir = TempDir::new().unwrap();
        let transport = shell(&dir, "sleep 5").with_timeout(Duration::from_millis(100));

        let err = transport.execute(&command()).await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Transport(TransportFailure::Timeout { .. })
        ));
        assert_eq!(leftover_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_cancelled_call_removes_script() {
        let dir = TempDir::new().unwrap();
        let transport = shell(&dir, "sleep 5");
        let command = command();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(100), transport.execute(&command)).await;
        assert!(abandoned.is_err());
        assert_eq!(leftover_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_missing_script_dir_is_transport_error() {
        let dir = TempDir::new().unwrap();
        let mut transport = shell(&dir, "echo OK");
        transport.script_dir = dir.path().join("missing");

        let err = transport.execute(&command()).await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Transport(TransportFailure::Io { .. })
        ));
    }
}
