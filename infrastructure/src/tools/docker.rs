//! docker server: containers, logs, exec, stats, images and compose
//!
//! Output is passed through as text; only table formats are requested from
//! docker itself. `docker_exec` runs the caller's command with `sh -c` inside
//! the target container, which is the purpose of the tool.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use workbench_application::{CommandOutput, CommandSpec, ExecutionParams, ProcessRunnerPort, RunOptions};
use workbench_domain::{
    RiskLevel, ShapeType, ToolCall, ToolDefinition, ToolError, ToolOutput, ToolParameter,
    tool::provider::{ProviderError, ToolProvider},
};

use super::{parse_args, path_parameter, unknown};

pub const DOCKER_PS: &str = "docker_ps";
pub const DOCKER_LOGS: &str = "docker_logs";
pub const DOCKER_EXEC: &str = "docker_exec";
pub const DOCKER_STATS: &str = "docker_stats";
pub const DOCKER_IMAGES: &str = "docker_images";
pub const DOCKER_COMPOSE: &str = "docker_compose";

const PS_FORMAT: &str = "table {{.ID}}\\t{{.Image}}\\t{{.Status}}\\t{{.Names}}\\t{{.Ports}}";
const STATS_FORMAT: &str =
    "table {{.Name}}\\t{{.CPUPerc}}\\t{{.MemUsage}}\\t{{.NetIO}}\\t{{.BlockIO}}";
const IMAGES_FORMAT: &str =
    "table {{.Repository}}\\t{{.Tag}}\\t{{.ID}}\\t{{.Size}}\\t{{.CreatedSince}}";

const DEFAULT_TAIL: u32 = 100;

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(DOCKER_PS, "List containers", RiskLevel::Low).with_parameter(
            ToolParameter::new("all", "Include stopped containers", false)
                .with_type(ShapeType::Boolean),
        ),
        ToolDefinition::new(DOCKER_LOGS, "Show recent container logs", RiskLevel::Low)
            .with_parameter(ToolParameter::new("container", "Container name or ID", true))
            .with_parameter(
                ToolParameter::new("tail", "Number of lines from the end (default: 100)", false)
                    .with_type(ShapeType::Integer),
            )
            .with_parameter(ToolParameter::new(
                "since",
                "Only logs since a timestamp or relative time (e.g. 10m)",
                false,
            )),
        ToolDefinition::new(
            DOCKER_EXEC,
            "Run a shell command inside a running container",
            RiskLevel::High,
        )
        .with_parameter(ToolParameter::new("container", "Container name or ID", true))
        .with_parameter(ToolParameter::new(
            "command",
            "Command line, run with sh -c inside the container",
            true,
        )),
        ToolDefinition::new(DOCKER_STATS, "One-shot resource usage snapshot", RiskLevel::Low)
            .with_parameter(ToolParameter::new(
                "container",
                "Limit to one container",
                false,
            )),
        ToolDefinition::new(DOCKER_IMAGES, "List local images", RiskLevel::Low),
        ToolDefinition::new(DOCKER_COMPOSE, "Run a docker compose action", RiskLevel::High)
            .with_parameter(ToolParameter::new(
                "action",
                "One of: up, down, ps, logs, restart",
                true,
            ))
            .with_parameter(path_parameter())
            .with_parameter(ToolParameter::new("service", "Limit to one service", false)),
    ]
}

#[derive(Debug, Deserialize)]
struct PsArgs {
    #[serde(default)]
    all: bool,
}

#[derive(Debug, Deserialize)]
struct LogsArgs {
    container: String,
    tail: Option<u32>,
    since: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecArgs {
    container: String,
    command: String,
}

#[derive(Debug, Deserialize)]
struct StatsArgs {
    container: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ComposeAction {
    Up,
    Down,
    Ps,
    Logs,
    Restart,
}

impl ComposeAction {
    fn as_str(&self) -> &'static str {
        match self {
            ComposeAction::Up => "up",
            ComposeAction::Down => "down",
            ComposeAction::Ps => "ps",
            ComposeAction::Logs => "logs",
            ComposeAction::Restart => "restart",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComposeArgs {
    action: ComposeAction,
    path: Option<String>,
    service: Option<String>,
}

/// Provider for the docker server
pub struct DockerProvider {
    runner: Arc<dyn ProcessRunnerPort>,
    params: ExecutionParams,
}

impl DockerProvider {
    pub fn new(runner: Arc<dyn ProcessRunnerPort>, params: ExecutionParams) -> Self {
        Self { runner, params }
    }

    async fn docker(
        &self,
        cwd: Option<String>,
        command: CommandSpec,
    ) -> Result<CommandOutput, ToolError> {
        let options = RunOptions::new()
            .with_cwd(cwd)
            .with_timeout(self.params.process_timeout);
        debug!(command = %command, "Running docker");
        let output = self.runner.run(&command, &options).await?;
        output.into_checked(&command)
    }

    async fn ps(&self, args: PsArgs) -> Result<ToolOutput, ToolError> {
        let command = docker_command()
            .arg("ps")
            .arg_if(args.all, "-a")
            .args(["--format", PS_FORMAT]);
        let output = self.docker(None, command).await?;
        Ok(ToolOutput::text(output.stdout))
    }

    async fn logs(&self, args: LogsArgs) -> Result<ToolOutput, ToolError> {
        let mut command = docker_command()
            .args(["logs", "--tail"])
            .arg(args.tail.unwrap_or(DEFAULT_TAIL).to_string());
        if let Some(since) = args.since {
            command = command.data_arg(format!("--since={}", since));
        }
        // `--` keeps a container name from being parsed as a docker flag
        let command = command.arg("--").data_arg(args.container.clone());
        let output = self.docker(None, command).await?;
        let text = output.combined();
        if text.trim().is_empty() {
            Ok(ToolOutput::text(format!("No logs for {}", args.container)))
        } else {
            Ok(ToolOutput::text(text))
        }
    }

    async fn exec(&self, args: ExecArgs) -> Result<ToolOutput, ToolError> {
        if args.command.trim().is_empty() {
            return Err(ToolError::invalid_argument("command cannot be empty"));
        }
        let command = docker_command()
            .arg("exec")
            .data_arg(args.container)
            .args(["sh", "-c"])
            .data_arg(args.command);
        let output = self.docker(None, command).await?;
        Ok(ToolOutput::text(output.combined()))
    }

    async fn stats(&self, args: StatsArgs) -> Result<ToolOutput, ToolError> {
        let mut command = docker_command().args(["stats", "--no-stream", "--format", STATS_FORMAT]);
        if let Some(container) = args.container {
            command = command.arg("--").data_arg(container);
        }
        let output = self.docker(None, command).await?;
        Ok(ToolOutput::text(output.stdout))
    }

    async fn images(&self) -> Result<ToolOutput, ToolError> {
        let command = docker_command().args(["images", "--format", IMAGES_FORMAT]);
        let output = self.docker(None, command).await?;
        Ok(ToolOutput::text(output.stdout))
    }

    async fn compose(&self, args: ComposeArgs) -> Result<ToolOutput, ToolError> {
        let mut command = docker_command()
            .arg("compose")
            .arg(args.action.as_str())
            .arg_if(args.action == ComposeAction::Up, "-d");
        if args.action == ComposeAction::Logs {
            command = command.arg("--tail").arg(DEFAULT_TAIL.to_string());
        }
        if let Some(service) = args.service {
            command = command.arg("--").data_arg(service);
        }
        let cwd = self.params.resolve_dir(args.path.as_deref());
        let output = self.docker(cwd, command).await?;
        let text = output.combined();
        if text.trim().is_empty() {
            Ok(ToolOutput::text(format!(
                "docker compose {} completed",
                args.action.as_str()
            )))
        } else {
            Ok(ToolOutput::text(text))
        }
    }
}

fn docker_command() -> CommandSpec {
    CommandSpec::new("docker")
}

#[async_trait]
impl ToolProvider for DockerProvider {
    fn id(&self) -> &str {
        "docker"
    }

    fn display_name(&self) -> &str {
        "Docker"
    }

    async fn is_available(&self) -> bool {
        self.runner.is_installed("docker")
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(definitions())
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        match call.tool_name.as_str() {
            DOCKER_PS => self.ps(parse_args(call)?).await,
            DOCKER_LOGS => self.logs(parse_args(call)?).await,
            DOCKER_EXEC => self.exec(parse_args(call)?).await,
            DOCKER_STATS => self.stats(parse_args(call)?).await,
            DOCKER_IMAGES => self.images().await,
            DOCKER_COMPOSE => self.compose(parse_args(call)?).await,
            _ => Err(unknown(call)),
        }
    }
}
