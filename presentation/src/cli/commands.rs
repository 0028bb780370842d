//! CLI command definitions

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use workbench_domain::ServerKind;

/// CLI arguments for workbench-mcp
#[derive(Parser, Debug)]
#[command(name = "workbench-mcp")]
#[command(author, version, about = "MCP servers for git, docker, HTTP, SQL and project tooling")]
#[command(long_about = r#"
workbench-mcp exposes developer-workflow tools to an agent over the MCP stdio
transport. Each server is a separate process with its own tool catalog:

  git       status, log, diff, branch, blame, search, add, commit, push
  docker    containers, logs, exec, inspect, stats, images, compose
  http      single requests, scenario checks, sequential load probes
  database  SQL against PostgreSQL or MySQL
  devtools  port checks and npm scripts

Configuration files are loaded from (in priority order):
1. Environment: WORKBENCH_*, POSTGRES_*, MYSQL_*
2. --config <path>     Explicit config file
3. ./workbench.toml    Project-level config
4. ~/.config/workbench-mcp/config.toml   Global config

Example:
  workbench-mcp serve git
  workbench-mcp tools docker
  workbench-mcp call http http_request --args '{"url": "http://localhost:8080/health"}'
"#)]
pub struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one server on stdin/stdout
    Serve {
        /// git, docker, http, database or devtools
        server: ServerKind,
    },
    /// Print a server's tool descriptors as JSON
    Tools { server: ServerKind },
    /// Invoke one tool once and print the result envelope
    Call {
        server: ServerKind,
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}", value_parser = parse_json_object)]
        args: Value,
    },
    /// Show configuration sources and the effective configuration
    Config,
}

impl Command {
    /// The server this command needs, if any
    pub fn server(&self) -> Option<ServerKind> {
        match self {
            Command::Serve { server } | Command::Tools { server } | Command::Call { server, .. } => {
                Some(*server)
            }
            Command::Config => None,
        }
    }
}

fn parse_json_object(raw: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("arguments must be a JSON object".to_string())
    }
}
