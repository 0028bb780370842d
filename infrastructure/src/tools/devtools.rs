//! devtools server: port probes and npm project scripts
//!
//! Tools that need an external program are only advertised when it is
//! installed: `check_port` needs `lsof`, `run_script` and `npm_audit` need
//! `npm`. `list_scripts` only reads `package.json`.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use workbench_application::{CommandSpec, ExecutionParams, ProcessRunnerPort, RunOptions};
use workbench_domain::{
    RiskLevel, ShapeType, ToolCall, ToolDefinition, ToolError, ToolOutput, ToolParameter,
    tool::provider::{ProviderError, ToolProvider},
};

use super::{parse_args, path_parameter, unknown};

pub const CHECK_PORT: &str = "check_port";
pub const LIST_SCRIPTS: &str = "list_scripts";
pub const RUN_SCRIPT: &str = "run_script";
pub const NPM_AUDIT: &str = "npm_audit";

/// Tool name and the program it needs, if any
const REQUIREMENTS: [(&str, Option<&str>); 4] = [
    (CHECK_PORT, Some("lsof")),
    (LIST_SCRIPTS, None),
    (RUN_SCRIPT, Some("npm")),
    (NPM_AUDIT, Some("npm")),
];

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(CHECK_PORT, "Show which process is listening on a port", RiskLevel::Low)
            .with_parameter(
                ToolParameter::new("port", "TCP port number", true).with_type(ShapeType::Integer),
            ),
        ToolDefinition::new(LIST_SCRIPTS, "List the scripts in package.json", RiskLevel::Low)
            .with_parameter(path_parameter()),
        ToolDefinition::new(RUN_SCRIPT, "Run an npm script", RiskLevel::High)
            .with_parameter(ToolParameter::new("script", "Script name from package.json", true))
            .with_parameter(path_parameter())
            .with_parameter(
                ToolParameter::new("timeout_ms", "Timeout in milliseconds", false)
                    .with_type(ShapeType::Integer),
            ),
        ToolDefinition::new(NPM_AUDIT, "Report known vulnerabilities in dependencies", RiskLevel::Low)
            .with_parameter(path_parameter()),
    ]
}

#[derive(Debug, Deserialize)]
struct PortArgs {
    port: u16,
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunScriptArgs {
    script: String,
    path: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    scripts: serde_json::Map<String, serde_json::Value>,
}

/// Provider for the devtools server
pub struct DevtoolsProvider {
    runner: Arc<dyn ProcessRunnerPort>,
    params: ExecutionParams,
}

impl DevtoolsProvider {
    pub fn new(runner: Arc<dyn ProcessRunnerPort>, params: ExecutionParams) -> Self {
        Self { runner, params }
    }

    fn options(&self, path: Option<&str>) -> RunOptions {
        RunOptions::new()
            .with_cwd(self.params.resolve_dir(path))
            .with_timeout(self.params.process_timeout)
    }

    async fn check_port(&self, args: PortArgs) -> Result<ToolOutput, ToolError> {
        if args.port == 0 {
            return Err(ToolError::invalid_argument("port must be between 1 and 65535"));
        }
        let command = CommandSpec::new("lsof")
            .arg("-i")
            .arg(format!(":{}", args.port))
            .args(["-P", "-n"]);
        let output = self.runner.run(&command, &self.options(None)).await?;

        // lsof exits 1 when nothing matches
        if !output.success() || output.stdout.trim().is_empty() {
            return Ok(ToolOutput::text(format!("Port {} appears free", args.port)));
        }
        Ok(ToolOutput::text(format!(
            "Port {} is in use:\n{}",
            args.port, output.stdout
        )))
    }

    async fn list_scripts(&self, args: PathArgs) -> Result<ToolOutput, ToolError> {
        let dir = self
            .params
            .resolve_dir(args.path.as_deref())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let manifest_path = dir.join("package.json");

        let raw = tokio::fs::read_to_string(&manifest_path).await.map_err(|e| {
            ToolError::execution_failed(format!(
                "Cannot read {}: {}",
                manifest_path.display(),
                e
            ))
        })?;
        let manifest: PackageManifest = serde_json::from_str(&raw).map_err(|e| {
            ToolError::malformed_data(format!("Invalid {}: {}", manifest_path.display(), e))
        })?;

        if manifest.scripts.is_empty() {
            return Ok(ToolOutput::text("No scripts defined in package.json"));
        }
        let lines: Vec<String> = manifest
            .scripts
            .iter()
            .map(|(name, command)| {
                let command = command
                    .as_str()
                    .map(String::from)
                    .unwrap_or_else(|| command.to_string());
                format!("- {}: {}", name, command)
            })
            .collect();
        Ok(ToolOutput::text(format!(
            "Available scripts:\n{}",
            lines.join("\n")
        )))
    }

    async fn run_script(&self, args: RunScriptArgs) -> Result<ToolOutput, ToolError> {
        if args.script.trim().is_empty() || args.script.starts_with('-') {
            return Err(ToolError::invalid_argument(format!(
                "Invalid script name '{}'",
                args.script
            )));
        }
        let command = CommandSpec::new("npm").arg("run").data_arg(&args.script);
        let mut options = self.options(args.path.as_deref());
        if let Some(ms) = args.timeout_ms.filter(|ms| *ms > 0) {
            options = options.with_timeout(Duration::from_millis(ms));
        }
        debug!(command = %command, "Running npm script");
        let output = self.runner.run(&command, &options).await?;

        let code = output
            .exit_code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        Ok(ToolOutput::text(format!(
            "Script '{}' exited with code {}\n\n{}",
            args.script,
            code,
            output.combined()
        )))
    }

    async fn npm_audit(&self, args: PathArgs) -> Result<ToolOutput, ToolError> {
        let command = CommandSpec::new("npm").arg("audit");
        // npm audit exits non-zero when it finds advisories
        let output = self
            .runner
            .run(&command, &self.options(args.path.as_deref()))
            .await?;
        let text = output.combined();
        if text.trim().is_empty() {
            Ok(ToolOutput::text("npm audit produced no output"))
        } else {
            Ok(ToolOutput::text(text))
        }
    }
}

#[async_trait]
impl ToolProvider for DevtoolsProvider {
    fn id(&self) -> &str {
        "devtools"
    }

    fn display_name(&self) -> &str {
        "Developer Tools"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(definitions()
            .into_iter()
            .filter(|def| {
                REQUIREMENTS
                    .iter()
                    .find(|(name, _)| *name == def.name)
                    .and_then(|(_, program)| *program)
                    .is_none_or(|program| self.runner.is_installed(program))
            })
            .collect())
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        match call.tool_name.as_str() {
            CHECK_PORT => self.check_port(parse_args(call)?).await,
            LIST_SCRIPTS => self.list_scripts(parse_args(call)?).await,
            RUN_SCRIPT => self.run_script(parse_args(call)?).await,
            NPM_AUDIT => self.npm_audit(parse_args(call)?).await,
            _ => Err(unknown(call)),
        }
    }
}
