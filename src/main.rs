use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::path::Path;
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use gmaps_mcp::config::Config;
use gmaps_mcp::invoker::Invoker;
use gmaps_mcp::maps::GoogleMapsClient;
use gmaps_mcp::server::McpServer;
use gmaps_mcp::tools::{InvocationRequest, ToolContext, ToolRegistry};
use gmaps_mcp::trace::{TraceAnalyzer, load_trace};

/// Logs go to stderr; stdout carries the JSON-RPC stream in serve mode.
fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stderr);

    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(config.log_filter());
    }

    builder.try_init().context("Failed to initialize logger")?;
    info!("Logging initialized at {}", config.log_level);
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if let Some(Commands::Tools) = &cli.command {
        return handle_tools_command();
    }

    config.validate().context("Invalid configuration")?;
    let ctx = build_context(config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        match &cli.command {
            None | Some(Commands::Serve) => handle_serve_command(&ctx).await,
            Some(Commands::Call { name, arguments }) => handle_call_command(name, arguments, &ctx).await,
            Some(Commands::AnalyzeTrace { file, vehicle_id, json }) => {
                handle_analyze_trace_command(file, vehicle_id, *json, &ctx).await
            }
            Some(Commands::Tools) => handle_tools_command(),
        }
    })
}

/// The blocking HTTP client must be built outside the async runtime.
fn build_context(config: &Config) -> Result<ToolContext> {
    let client = GoogleMapsClient::new(config.google_maps_api_key.clone(), config.http.timeout())
        .context("Failed to create Maps client")?;
    let invoker = Invoker::new(
        Arc::new(client),
        config.retry.policy(),
        config.workers.max_concurrent_calls,
    );
    Ok(ToolContext::new(invoker, config.limits()))
}

async fn handle_serve_command(ctx: &ToolContext) -> Result<()> {
    let server = McpServer::new(ToolRegistry::standard(), ctx.clone());
    eprintln!(
        "{} {} tools on stdio",
        "Serving".green(),
        server.registry().len()
    );

    server
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await
        .context("Server failed")?;

    info!("Server stopped");
    Ok(())
}

fn handle_tools_command() -> Result<()> {
    let registry = ToolRegistry::standard();
    let tools: Vec<_> = registry.definitions().iter().map(|d| d.to_rpc_schema()).collect();
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}

async fn handle_call_command(name: &str, arguments: &str, ctx: &ToolContext) -> Result<()> {
    let arguments: serde_json::Value =
        serde_json::from_str(arguments).context("Tool arguments must be valid JSON")?;
    if !arguments.is_object() {
        eyre::bail!("Tool arguments must be a JSON object");
    }

    info!("Calling tool: {}", name);
    let response = ToolRegistry::standard()
        .dispatch(InvocationRequest::new(name, arguments), ctx)
        .await;

    println!("{}", response.to_json_pretty());
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn handle_analyze_trace_command(file: &Path, vehicle_id: &str, json: bool, ctx: &ToolContext) -> Result<()> {
    let trace = load_trace(file).with_context(|| format!("Failed to read trace {}", file.display()))?;
    info!("Loaded {} trace points from {}", trace.len(), file.display());

    let report = TraceAnalyzer::new(ctx.clone())
        .analyze(&trace, vehicle_id, chrono::Local::now().fixed_offset())
        .await
        .context("Trace analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", cli::report::render(&report));
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging
    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
