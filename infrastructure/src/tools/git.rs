//! git server: status, history, diffs, blame and commit helpers

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use workbench_application::{CommandSpec, ExecutionParams, ProcessRunnerPort, RunOptions};
use workbench_domain::{
    ChangeRecord, RiskLevel, Shape, ShapeType, ToolCall, ToolDefinition, ToolError, ToolOutput,
    ToolParameter, classify, parse_blame,
    tool::provider::{ProviderError, ToolProvider},
};

use super::{parse_args, path_parameter, unknown};

pub const GIT_STATUS: &str = "git_status";
pub const GIT_LOG: &str = "git_log";
pub const GIT_DIFF: &str = "git_diff";
pub const GIT_BRANCH: &str = "git_branch";
pub const GIT_BLAME: &str = "git_blame";
pub const GIT_SEARCH_LOG: &str = "git_search_log";
pub const GIT_ADD: &str = "git_add";
pub const GIT_COMMIT: &str = "git_commit";
pub const GIT_PUSH: &str = "git_push";
pub const GIT_SUGGEST_COMMIT: &str = "git_suggest_commit";

/// One-line log format consumed by callers: `hash | author | when | subject`
const LOG_FORMAT: &str = "--pretty=format:%h | %an | %ar | %s";

const DEFAULT_LOG_LIMIT: u32 = 10;

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            GIT_STATUS,
            "Show the working tree status (porcelain format with branch header)",
            RiskLevel::Low,
        )
        .with_parameter(path_parameter()),
        ToolDefinition::new(GIT_LOG, "Show recent commits, one per line", RiskLevel::Low)
            .with_parameter(path_parameter())
            .with_parameter(
                ToolParameter::new("limit", "Number of commits (default: 10)", false)
                    .with_type(ShapeType::Integer),
            )
            .with_parameter(ToolParameter::new("author", "Only commits by this author", false))
            .with_parameter(ToolParameter::new("file", "Only commits touching this file", false)),
        ToolDefinition::new(GIT_DIFF, "Show unstaged, staged or per-commit changes", RiskLevel::Low)
            .with_parameter(path_parameter())
            .with_parameter(
                ToolParameter::new("staged", "Show staged changes instead", false)
                    .with_type(ShapeType::Boolean),
            )
            .with_parameter(ToolParameter::new("commit", "Compare against this commit", false))
            .with_parameter(ToolParameter::new("file", "Limit the diff to this file", false)),
        ToolDefinition::new(GIT_BRANCH, "List branches", RiskLevel::Low)
            .with_parameter(path_parameter())
            .with_parameter(
                ToolParameter::new("all", "Include remote-tracking branches", false)
                    .with_type(ShapeType::Boolean),
            ),
        ToolDefinition::new(
            GIT_BLAME,
            "Per-line attribution of a file as a JSON array",
            RiskLevel::Low,
        )
        .with_parameter(path_parameter())
        .with_parameter(ToolParameter::new("file", "File to annotate", true))
        .with_parameter(
            ToolParameter::new("start_line", "First line (1-based)", false)
                .with_type(ShapeType::Integer),
        )
        .with_parameter(
            ToolParameter::new("end_line", "Last line (inclusive)", false)
                .with_type(ShapeType::Integer),
        ),
        ToolDefinition::new(
            GIT_SEARCH_LOG,
            "Search history by commit message or by code change",
            RiskLevel::Low,
        )
        .with_parameter(path_parameter())
        .with_parameter(ToolParameter::new("query", "Text to search for", true))
        .with_parameter(ToolParameter::new(
            "mode",
            "'message' (default) searches messages, 'code' searches added/removed code",
            false,
        ))
        .with_parameter(
            ToolParameter::new("limit", "Maximum commits (default: 10)", false)
                .with_type(ShapeType::Integer),
        ),
        ToolDefinition::new(GIT_ADD, "Stage files", RiskLevel::High)
            .with_parameter(path_parameter())
            .with_parameter(
                ToolParameter::new("files", "Files to stage", true)
                    .with_shape(Shape::array(Shape::string())),
            ),
        ToolDefinition::new(GIT_COMMIT, "Commit staged changes", RiskLevel::High)
            .with_parameter(path_parameter())
            .with_parameter(ToolParameter::new("message", "Commit message", true)),
        ToolDefinition::new(GIT_PUSH, "Push the current branch", RiskLevel::High)
            .with_parameter(path_parameter())
            .with_parameter(ToolParameter::new("remote", "Remote name (default: origin)", false))
            .with_parameter(ToolParameter::new("branch", "Branch to push", false)),
        ToolDefinition::new(
            GIT_SUGGEST_COMMIT,
            "Suggest a conventional commit message for the staged changes",
            RiskLevel::Low,
        )
        .with_parameter(path_parameter()),
    ]
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LogArgs {
    path: Option<String>,
    limit: Option<u32>,
    author: Option<String>,
    file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiffArgs {
    path: Option<String>,
    #[serde(default)]
    staged: bool,
    commit: Option<String>,
    file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchArgs {
    path: Option<String>,
    #[serde(default)]
    all: bool,
}

#[derive(Debug, Deserialize)]
struct BlameArgs {
    path: Option<String>,
    file: String,
    start_line: Option<u32>,
    end_line: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SearchMode {
    #[default]
    Message,
    Code,
}

#[derive(Debug, Deserialize)]
struct SearchLogArgs {
    path: Option<String>,
    query: String,
    #[serde(default)]
    mode: SearchMode,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AddArgs {
    path: Option<String>,
    files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CommitArgs {
    path: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct PushArgs {
    path: Option<String>,
    remote: Option<String>,
    branch: Option<String>,
}

/// Build the `-L` range argument for blame
fn line_range(start: Option<u32>, end: Option<u32>) -> Result<Option<String>, ToolError> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(0), _) | (_, Some(0)) => Err(ToolError::invalid_argument(
            "start_line and end_line are 1-based",
        )),
        (Some(s), Some(e)) if e < s => Err(ToolError::invalid_argument(format!(
            "end_line ({}) is before start_line ({})",
            e, s
        ))),
        (Some(s), Some(e)) => Ok(Some(format!("{},{}", s, e))),
        (Some(s), None) => Ok(Some(format!("{},", s))),
        (None, Some(e)) => Ok(Some(format!("1,{}", e))),
    }
}

/// Provider for the git server
pub struct GitProvider {
    runner: Arc<dyn ProcessRunnerPort>,
    params: ExecutionParams,
}

impl GitProvider {
    pub fn new(runner: Arc<dyn ProcessRunnerPort>, params: ExecutionParams) -> Self {
        Self { runner, params }
    }

    /// Run a git command in the resolved directory; non-zero exit is a failure
    async fn git(&self, path: Option<&str>, command: CommandSpec) -> Result<String, ToolError> {
        let options = RunOptions::new()
            .with_cwd(self.params.resolve_dir(path))
            .with_timeout(self.params.process_timeout);
        debug!(command = %command, "Running git");
        let output = self.runner.run(&command, &options).await?;
        let output = output.into_checked(&command)?;
        Ok(output.stdout)
    }

    async fn status(&self, args: PathArgs) -> Result<ToolOutput, ToolError> {
        let command = git_command().args(["status", "--porcelain", "--branch"]);
        let stdout = self.git(args.path.as_deref(), command).await?;
        let has_changes = stdout.lines().any(|l| !l.starts_with("##") && !l.is_empty());
        if has_changes {
            Ok(ToolOutput::text(stdout))
        } else {
            let header = stdout.lines().next().unwrap_or_default();
            Ok(ToolOutput::text(
                format!("{}\nWorking tree clean", header).trim_start().to_string(),
            ))
        }
    }

    async fn log(&self, args: LogArgs) -> Result<ToolOutput, ToolError> {
        let limit = args.limit.unwrap_or(DEFAULT_LOG_LIMIT).max(1);
        let mut command = git_command()
            .args(["log", LOG_FORMAT, "-n"])
            .arg(limit.to_string());
        if let Some(author) = args.author {
            command = command.data_arg(format!("--author={}", author));
        }
        if let Some(file) = args.file {
            command = command.arg("--").data_arg(file);
        }
        let stdout = self.git(args.path.as_deref(), command).await?;
        Ok(ToolOutput::text(non_empty(stdout, "No commits found")))
    }

    async fn diff(&self, args: DiffArgs) -> Result<ToolOutput, ToolError> {
        let mut command = git_command().arg("diff").arg_if(args.staged, "--staged");
        if let Some(commit) = args.commit {
            command = command.data_arg(commit);
        }
        if let Some(file) = args.file {
            command = command.arg("--").data_arg(file);
        }
        let stdout = self.git(args.path.as_deref(), command).await?;
        Ok(ToolOutput::text(non_empty(stdout, "No changes")))
    }

    async fn branch(&self, args: BranchArgs) -> Result<ToolOutput, ToolError> {
        let command = git_command().arg("branch").arg_if(args.all, "-a");
        let stdout = self.git(args.path.as_deref(), command).await?;
        Ok(ToolOutput::text(non_empty(stdout, "No branches")))
    }

    async fn blame(&self, args: BlameArgs) -> Result<ToolOutput, ToolError> {
        let mut command = git_command().args(["blame", "--line-porcelain"]);
        if let Some(range) = line_range(args.start_line, args.end_line)? {
            command = command.arg("-L").arg(range);
        }
        let command = command.arg("--").data_arg(args.file);
        let stdout = self.git(args.path.as_deref(), command).await?;
        ToolOutput::json(&parse_blame(&stdout))
    }

    async fn search_log(&self, args: SearchLogArgs) -> Result<ToolOutput, ToolError> {
        if args.query.is_empty() {
            return Err(ToolError::invalid_argument("query cannot be empty"));
        }
        let limit = args.limit.unwrap_or(DEFAULT_LOG_LIMIT).max(1);
        let command = git_command()
            .args(["log", LOG_FORMAT, "-n"])
            .arg(limit.to_string());
        let command = match args.mode {
            SearchMode::Message => command.data_arg(format!("--grep={}", args.query)),
            SearchMode::Code => command.arg("-S").data_arg(args.query),
        };
        let stdout = self.git(args.path.as_deref(), command).await?;
        Ok(ToolOutput::text(non_empty(stdout, "No matching commits")))
    }

    async fn add(&self, args: AddArgs) -> Result<ToolOutput, ToolError> {
        if args.files.is_empty() {
            return Err(ToolError::invalid_argument("files cannot be empty"));
        }
        let count = args.files.len();
        let command = git_command().args(["add", "--"]).data_args(args.files);
        self.git(args.path.as_deref(), command).await?;
        Ok(ToolOutput::text(format!("Staged {} file(s)", count)))
    }

    async fn commit(&self, args: CommitArgs) -> Result<ToolOutput, ToolError> {
        if args.message.trim().is_empty() {
            return Err(ToolError::invalid_argument("message cannot be empty"));
        }
        let command = git_command().args(["commit", "-m"]).data_arg(args.message);
        let stdout = self.git(args.path.as_deref(), command).await?;
        Ok(ToolOutput::text(stdout))
    }

    async fn push(&self, args: PushArgs) -> Result<ToolOutput, ToolError> {
        let remote = args.remote.unwrap_or_else(|| "origin".to_string());
        let mut command = git_command().arg("push").data_arg(remote.clone());
        if let Some(branch) = args.branch {
            command = command.data_arg(branch);
        }
        let options = RunOptions::new()
            .with_cwd(self.params.resolve_dir(args.path.as_deref()))
            .with_timeout(self.params.process_timeout);
        // git push reports progress on stderr
        let output = self.runner.run(&command, &options).await?.into_checked(&command)?;
        Ok(ToolOutput::text(non_empty(
            output.combined(),
            &format!("Pushed to {}", remote),
        )))
    }

    async fn suggest_commit(&self, args: PathArgs) -> Result<ToolOutput, ToolError> {
        let command = git_command().args(["diff", "--cached", "--name-status"]);
        let stdout = self.git(args.path.as_deref(), command).await?;
        let changes = ChangeRecord::parse_name_status(&stdout);
        if changes.is_empty() {
            return Ok(ToolOutput::text("No staged changes"));
        }
        let suggestion = classify(&changes);
        ToolOutput::json(&serde_json::json!({
            "type": suggestion.commit_type,
            "summary": suggestion.summary,
            "body": suggestion.body,
            "message": suggestion.message(),
        }))
    }
}

fn git_command() -> CommandSpec {
    CommandSpec::new("git")
}

fn non_empty(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

#[async_trait]
impl ToolProvider for GitProvider {
    fn id(&self) -> &str {
        "git"
    }

    fn display_name(&self) -> &str {
        "Git"
    }

    async fn is_available(&self) -> bool {
        self.runner.is_installed("git")
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(definitions())
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        match call.tool_name.as_str() {
            GIT_STATUS => self.status(parse_args(call)?).await,
            GIT_LOG => self.log(parse_args(call)?).await,
            GIT_DIFF => self.diff(parse_args(call)?).await,
            GIT_BRANCH => self.branch(parse_args(call)?).await,
            GIT_BLAME => self.blame(parse_args(call)?).await,
            GIT_SEARCH_LOG => self.search_log(parse_args(call)?).await,
            GIT_ADD => self.add(parse_args(call)?).await,
            GIT_COMMIT => self.commit(parse_args(call)?).await,
            GIT_PUSH => self.push(parse_args(call)?).await,
            GIT_SUGGEST_COMMIT => self.suggest_commit(parse_args(call)?).await,
            _ => Err(unknown(call)),
        }
    }
}
