//! Tokio-backed [`ProcessRunnerPort`].
//!
//! Every command is spawned from an argument vector with no shell in between,
//! so caller-supplied strings are never shell-interpreted. On timeout the
//! child is killed (`kill_on_drop`) and partial output is discarded.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};
use workbench_application::ports::process_runner::{
    CommandOutput, CommandSpec, ProcessError, ProcessRunnerPort, RunOptions,
};
use workbench_domain::truncate_output;

/// Maximum captured size per stream (1 MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Runs commands with `tokio::process`
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    default_timeout: Duration,
}

impl TokioProcessRunner {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl ProcessRunnerPort for TokioProcessRunner {
    async fn run(
        &self,
        command: &CommandSpec,
        options: &RunOptions,
    ) -> Result<CommandOutput, ProcessError> {
        let command_display = command.to_string();

        if command.is_follow_mode() && !options.allow_follow {
            return Err(ProcessError::FollowRejected(command_display));
        }

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &options.cwd {
            if !Path::new(dir).is_dir() {
                return Err(ProcessError::Spawn {
                    command: command_display,
                    reason: format!("working directory does not exist: {}", dir),
                });
            }
            cmd.current_dir(dir);
        }

        // Linux: request kernel to send SIGTERM to child when the server dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let timeout = options.timeout.unwrap_or(self.default_timeout);
        debug!(command = %command_display, cwd = ?options.cwd, ?timeout, "Spawning process");

        let child = cmd.spawn().map_err(|e| ProcessError::Spawn {
            command: command_display.clone(),
            reason: e.to_string(),
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let result = CommandOutput {
                    stdout: truncate_output(&String::from_utf8_lossy(&output.stdout), MAX_OUTPUT_SIZE),
                    stderr: truncate_output(&String::from_utf8_lossy(&output.stderr), MAX_OUTPUT_SIZE),
                    exit_code: output.status.code(),
                };
                debug!(command = %command_display, exit_code = ?result.exit_code, "Process finished");
                Ok(result)
            }
            Ok(Err(e)) => Err(ProcessError::Io {
                command: command_display,
                reason: e.to_string(),
            }),
            Err(_) => {
                warn!(command = %command_display, ?timeout, "Process timed out, killing");
                Err(ProcessError::Timeout {
                    command: command_display,
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    fn is_installed(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
