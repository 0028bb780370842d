//! Process runner port
//!
//! Defines how handlers run external programs (`git`, `docker`, `lsof`,
//! `npm`). Commands are argument vectors, never shell strings.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use workbench_domain::ToolError;

/// A program plus its argument vector
///
/// Arguments added with [`CommandSpec::data_arg`] carry caller-supplied
/// values (messages, paths, queries) and are never read as flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    data_positions: Vec<usize>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            data_positions: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add `arg` only when `cond` holds
    pub fn arg_if(self, cond: bool, arg: impl Into<String>) -> Self {
        if cond { self.arg(arg) } else { self }
    }

    /// Add a caller-supplied value
    pub fn data_arg(mut self, arg: impl Into<String>) -> Self {
        self.data_positions.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn data_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        args.into_iter().fold(self, |cmd, arg| cmd.data_arg(arg))
    }

    fn is_data(&self, index: usize) -> bool {
        self.data_positions.contains(&index)
    }

    /// Whether the command asks to stream forever (`-f` / `--follow`).
    ///
    /// Only option arguments before a `--` separator count.
    pub fn is_follow_mode(&self) -> bool {
        self.args
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.is_data(*i))
            .map(|(_, a)| a.as_str())
            .take_while(|a| *a != "--")
            .any(|a| a == "-f" || a == "--follow" || a.starts_with("--follow="))
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Options for a single run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub cwd: Option<String>,
    pub timeout: Option<Duration>,
    pub allow_follow: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cwd(mut self, cwd: Option<String>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn allow_follow(mut self) -> Self {
        self.allow_follow = true;
        self
    }
}

/// Captured result of a process that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout and stderr joined into one text
    pub fn combined(&self) -> String {
        match (self.stdout.trim_end().is_empty(), self.stderr.trim_end().is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n--- stderr ---\n{}", self.stdout.trim_end(), self.stderr),
        }
    }

    /// Turn a non-zero exit into an `EXECUTION_FAILED` carrying stderr
    pub fn into_checked(self, command: &CommandSpec) -> Result<Self, ToolError> {
        if self.success() {
            return Ok(self);
        }
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        let code = self
            .exit_code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        Err(ToolError::execution_failed(format!(
            "`{}` exited with {}: {}",
            command, code, detail
        )))
    }
}

/// Why a process could not produce a [`CommandOutput`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Failed to spawn `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("`{command}` timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("`{0}` streams indefinitely; follow mode is not allowed")]
    FollowRejected(String),

    #[error("I/O error while running `{command}`: {reason}")]
    Io { command: String, reason: String },
}

impl From<ProcessError> for ToolError {
    fn from(err: ProcessError) -> Self {
        match &err {
            ProcessError::Timeout { .. } => {
                ToolError::new(workbench_domain::ErrorCode::Timeout, err.to_string())
            }
            ProcessError::FollowRejected(_) => ToolError::invalid_argument(err.to_string()),
            ProcessError::Spawn { .. } | ProcessError::Io { .. } => {
                ToolError::execution_failed(err.to_string())
            }
        }
    }
}

/// Port for running external processes
#[async_trait]
pub trait ProcessRunnerPort: Send + Sync {
    /// Run a command to completion.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`CommandOutput::exit_code`].
    async fn run(&self, command: &CommandSpec, options: &RunOptions)
    -> Result<CommandOutput, ProcessError>;

    /// Whether `program` can be found on `PATH`
    fn is_installed(&self, program: &str) -> bool;
}
