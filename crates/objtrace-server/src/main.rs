//! objtrace - object trace frontend
//!
//! Resolves a Kubernetes object and a rough timestamp to the one trace
//! recorded for it, over HTTP or from the command line.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use objtrace_core::config::{ConfigLoader, FrontendConfig};
use objtrace_core::{
    JsonlTraceStore, MemoryTraceStore, RequestMetrics, StaticClusterRegistry, TraceRequest,
    TraceResolver, TraceStore,
};
use objtrace_web::{UiTrace, WebConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "objtrace")]
#[command(version)]
#[command(about = "Object trace frontend", long_about = None)]
struct Cli {
    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "OBJTRACE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the trace API over HTTP
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// JSONL trace file (overrides config)
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Resolve one object and print the rendered trace as JSON
    Resolve {
        /// Cluster the object lives in
        #[arg(long)]
        cluster: String,

        /// Resource type, e.g. pods
        #[arg(long)]
        resource: String,

        /// Object namespace
        #[arg(short, long)]
        namespace: Option<String>,

        /// Object name
        #[arg(long)]
        name: String,

        /// Approximate RFC 3339 timestamp
        #[arg(long)]
        ts: String,

        /// Keep only logs carrying this key
        #[arg(long)]
        span_type: Option<String>,

        /// JSONL trace file (overrides config)
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.clone(), cli.verbose)?;

    // CLI verbose flag takes precedence, then config, then default
    let subscriber = subscriber(log_level(cli.verbose, &config.server.log_level));
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve { host, port, store } => {
            if let Some(host) = host {
                config.web.host = host;
            }
            if let Some(port) = port {
                config.web.port = port;
            }
            if let Some(store) = store {
                config.store.path = Some(store.display().to_string());
            }
            serve_command(config).await
        }
        Commands::Resolve {
            cluster,
            resource,
            namespace,
            name,
            ts,
            span_type,
            store,
        } => {
            if let Some(store) = store {
                config.store.path = Some(store.display().to_string());
            }
            let request = TraceRequest::new(cluster, resource, name, ts)
                .with_namespace(namespace.unwrap_or_default())
                .with_span_type(span_type.unwrap_or_default());
            resolve_command(config, request).await
        }
        Commands::Config => config_command(&config),
    }
}

/// Load configuration from file/env
///
/// Defaults are used only when no config file exists; a file that fails to
/// parse or validate is an error. Loader messages go to a temporary
/// subscriber since the real one depends on the loaded log level.
fn load_config(cli_path: Option<PathBuf>, verbose: u8) -> anyhow::Result<FrontendConfig> {
    let loader = ConfigLoader::new().with_cli_path(cli_path);
    tracing::subscriber::with_default(subscriber(log_level(verbose, "info")), || loader.load())
        .context("failed to load configuration")
}

fn subscriber(level: Level) -> FmtSubscriber {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish()
}

fn log_level(verbose: u8, configured: &str) -> Level {
    if verbose > 0 {
        return match verbose {
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
    }
    match configured.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build the resolver described by the configuration
async fn build_resolver(config: &FrontendConfig) -> anyhow::Result<TraceResolver> {
    let store: Arc<dyn TraceStore> = match &config.store.path {
        Some(path) => {
            let store = JsonlTraceStore::open(path, config.store.shallow_search)
                .await
                .with_context(|| format!("failed to open trace store {}", path))?;
            Arc::new(store)
        }
        None => {
            warn!("No trace store configured, every lookup will find nothing");
            Arc::new(MemoryTraceStore::new())
        }
    };

    if config.clusters.names.is_empty() {
        warn!("No clusters configured, every request will be rejected");
    }
    let registry = Arc::new(StaticClusterRegistry::new(config.clusters.names.clone()));

    Ok(TraceResolver::with_system_clock(store, registry)
        .with_service_name(config.trace.service_name.clone())
        .with_metrics(RequestMetrics::shared()))
}

async fn serve_command(config: FrontendConfig) -> anyhow::Result<()> {
    if !config.web.enabled {
        bail!("trace server is disabled (web.enabled = false)");
    }

    let resolver = build_resolver(&config).await?;
    let web_config = WebConfig {
        host: config.web.host.clone(),
        port: config.web.port,
    };

    tokio::select! {
        result = objtrace_web::start_server(web_config, resolver) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}

async fn resolve_command(config: FrontendConfig, request: TraceRequest) -> anyhow::Result<()> {
    let resolver = build_resolver(&config).await?;
    let trace = resolver.resolve(&request).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&UiTrace::from_trace(&trace))?
    );
    Ok(())
}

fn config_command(config: &FrontendConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
