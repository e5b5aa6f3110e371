use anyhow::Result;
use module_finder::app::engine::AnalysisEngine;
use module_finder::cli::{self, Cli, Command};
use module_finder::server::{http, mcp::ModuleFinderMcpServer};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable (and free for MCP stdio)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        model = %cli.model.display(),
        exclude_tests = cli.exclude_tests,
        "mftool starting"
    );

    let engine = AnalysisEngine::load_from_json(&cli.model, cli.exclude_tests)?;

    match cli.command {
        Command::Summary => cli::display_summary(&engine),
        Command::Callgraph => cli::display_call_graph(&engine),
        Command::Coupling { limit } => cli::display_coupling(&engine, limit),
        Command::Pair { a, b } => cli::display_pair(&engine, &a, &b),
        Command::Matrix => cli::display_matrix(&engine),
        Command::Dendrogram => cli::display_dendrogram(&engine),
        Command::Modules { cp, json } => cli::display_modules(&engine, cp, json),
        Command::Serve { port } => {
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            runtime()?.block_on(http::serve(engine, addr))
        }
        Command::Mcp => runtime()?.block_on(ModuleFinderMcpServer::new(engine).serve_stdio()),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
