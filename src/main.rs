use clap::Parser;
use gridchen_dev_server::config::{AppState, Config};
use gridchen_dev_server::mount::{MountTable, PackageRegistry};
use gridchen_dev_server::{browser, logger, server};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Static dev server for the gridchen components
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file, without extension
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not open a browser on startup
    #[arg(long)]
    no_browser: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = Config::load_from(&cli.config)?;
    if let Some(host) = cli.host {
        cfg.server.host = host;
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    if cli.no_browser {
        cfg.browser.open = false;
    }

    logger::init(&cfg)?;

    // Mounts are registered before anything is bound; an invalid table is fatal
    let registry = PackageRegistry::from_config(&cfg.packages);
    let mounts = MountTable::from_config(&cfg, &registry).map_err(|e| {
        logger::log_error(&format!("Invalid mount configuration: {e}"));
        e
    })?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, mounts))
}

async fn async_main(cfg: Config, mounts: MountTable) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let bound = listener.local_addr()?;

    logger::log_server_start(&bound, &cfg, &mounts);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    if cfg.browser.open {
        browser::launch(browser::entry_url(bound, &cfg.browser.entry_path));
    }

    let state = Arc::new(AppState::new(cfg, mounts));
    let connections = Arc::new(AtomicUsize::new(0));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state, connections, signals))
        .await
}
