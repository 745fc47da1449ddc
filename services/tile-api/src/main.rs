//! Genomic tile API service.
//!
//! HTTP server for matrix, vector and annotation tiles, tileset info and the
//! dataset catalog.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tile_api::{build_router, AppState, ServiceConfig};
use tile_engine::EngineConfig;

#[derive(Parser, Debug)]
#[command(name = "tile-api")]
#[command(about = "Genomic tile API server")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,

    /// SQLite URL of the dataset catalog
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Base directory for relative dataset paths
    #[arg(long, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Header carrying the authenticated user id
    #[arg(long, env = "REQUESTER_HEADER")]
    requester_header: Option<String>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    } else if let Ok(threads_str) = env::var("TOKIO_WORKER_THREADS") {
        if let Ok(threads) = threads_str.parse::<usize>() {
            runtime_builder.worker_threads(threads);
        }
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))?;
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).json().finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // CLI flags override the environment
    let mut config = ServiceConfig::from_env();
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(name) = args.requester_header {
        config.requester_header = name.to_lowercase();
    }
    config.validate().map_err(|e| anyhow!("Invalid service config: {}", e))?;

    let mut engine = EngineConfig::from_env();
    if let Some(dir) = args.data_dir {
        engine.data_dir = dir;
    }
    engine.validate().map_err(|e| anyhow!("Invalid engine config: {}", e))?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    info!(
        data_dir = %engine.data_dir.display(),
        upload_enabled = engine.upload_enabled,
        batch_concurrency = engine.batch_concurrency,
        "Starting tile API server"
    );

    let addr: SocketAddr = config.listen.parse()?;
    let state = Arc::new(AppState::new(config, engine).await?);
    let app = build_router(state, Some(prometheus_handle));

    info!(address = %addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
