//! CLI entrypoint for workbench-mcp
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use workbench_application::{
    DispatchToolUseCase, ExecutionParams, ToolExecutorPort, ToolSchemaPort,
};
use workbench_domain::{ServerKind, ToolCall};
use workbench_infrastructure::{
    ConfigLoader, FileConfig, JsonlInvocationLogger, McpToolSchema, ReqwestHttpClient,
    SqlEngines, TokioProcessRunner, ToolDependencies, ToolRegistry, build_provider,
};
use workbench_presentation::{Cli, Command, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
    }
    .map_err(workbench_infrastructure::ConfigError::from)?;

    let _log_guard = init_tracing(cli.verbose, config.logging.directory.as_deref());

    for issue in config.check()? {
        warn!(field = %issue.field, "Config warning: {}", issue.message);
    }

    let server = match cli.command.server() {
        Some(server) => server,
        None => {
            print_config(&cli, &config)?;
            return Ok(());
        }
    };

    info!(server = %server, "Starting workbench-mcp");

    // === Dependency Injection ===
    let registry = build_registry(server, &config).await?;
    let mut dispatcher = DispatchToolUseCase::new(registry.clone());
    if let Some(path) = &config.logging.invocation_log
        && let Some(logger) = JsonlInvocationLogger::new(path)
    {
        dispatcher = dispatcher.with_invocation_logger(Arc::new(logger));
    }

    match cli.command {
        Command::Serve { .. } => {
            let mcp = McpServer::new(server, dispatcher, Arc::new(McpToolSchema));
            mcp.run_stdio().await?;
        }
        Command::Tools { .. } => {
            let tools = McpToolSchema.all_tools_schema(registry.tool_spec());
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
        Command::Call { tool, args, .. } => {
            let call = ToolCall::from_json(tool, args).map_err(anyhow::Error::msg)?;
            let result = dispatcher.execute(&call).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Config => {}
    }

    Ok(())
}

/// Initialize logging based on verbosity level.
///
/// Diagnostics go to stderr; stdout carries only protocol frames.
fn init_tracing(verbose: u8, directory: Option<&str>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "workbench-mcp.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

async fn build_registry(server: ServerKind, config: &FileConfig) -> Result<Arc<ToolRegistry>> {
    let params: ExecutionParams = config.execution_params();
    let deps = ToolDependencies {
        runner: Arc::new(TokioProcessRunner::new(params.process_timeout)),
        http: Arc::new(ReqwestHttpClient::new(&config.http.user_agent)?),
        engines: SqlEngines::from_config(&config.database),
        params,
    };

    let mut registry = ToolRegistry::new().register_arc(build_provider(server, &deps));
    registry
        .discover()
        .await
        .with_context(|| format!("Failed to build the {} tool catalog", server))?;

    let stats = registry.stats();
    info!(
        server = %server,
        tools = stats.total_tools,
        "Tool catalog ready"
    );
    if stats.total_tools == 0 {
        warn!(server = %server, "No tools available; is the backing tool installed?");
    }

    Ok(Arc::new(registry))
}

fn print_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    if cli.no_config {
        println!("Configuration files disabled (--no-config)");
    } else {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
    }
    println!();
    println!("Effective configuration:");
    println!("{}", redacted_config(config)?);
    Ok(())
}

fn redacted_config(config: &FileConfig) -> Result<String> {
    let mut value = serde_json::to_value(config)?;
    for engine in ["postgres", "mysql"] {
        if let Some(password) = value
            .pointer_mut(&format!("/database/{}/password", engine))
            .filter(|p| p.as_str().is_some_and(|s| !s.is_empty()))
        {
            *password = serde_json::Value::String("********".to_string());
        }
    }
    Ok(serde_json::to_string_pretty(&value)?)
}
