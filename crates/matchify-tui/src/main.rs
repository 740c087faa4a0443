//! Matchify terminal client entry point.

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use clap::Parser;
use matchify_client::{
    Category, DEFAULT_BASE_URL, LocalIdentity, SessionConfig, transport::WsTransport,
};
use matchify_tui::{Runtime, StrangerServer, SystemEnv, TerminalDriver, Transport};
use rand::Rng;
use tracing_subscriber::EnvFilter;

/// Base URL reported to the simulated stranger.
const SIMULATED_BASE_URL: &str = "sim://stranger";

/// Matchify terminal client
#[derive(Parser, Debug)]
#[command(name = "matchify")]
#[command(about = "Chat anonymously with strangers who share your taste")]
#[command(version)]
struct Args {
    /// Matching server base URL. `--server` alone uses ws://localhost:8080/chat
    ///
    /// If not provided, runs in simulation mode with an in-process stranger.
    #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_BASE_URL)]
    server: Option<String>,

    /// User id sent with every frame. Random if not given.
    #[arg(long)]
    user_id: Option<String>,

    /// Display name. Random if not given.
    #[arg(long)]
    username: Option<String>,

    /// Category preselected in the lobby (artists, albums, movies).
    #[arg(short, long)]
    category: Option<Category>,

    /// Quiet time after the last keystroke before typing stops, in ms.
    #[arg(long, default_value_t = 500)]
    quiet_interval_ms: u64,

    /// Write logs to this file. Nothing is logged otherwise.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path, &args.log_level)?;
    }

    let identity = local_identity(&args);
    let (transport, base_url) = match &args.server {
        Some(url) => (Transport::WebSocket(WsTransport::new()), url.clone()),
        None => (Transport::Simulated(StrangerServer::default()), SIMULATED_BASE_URL.to_string()),
    };
    let config = SessionConfig {
        base_url,
        quiet_interval: Duration::from_millis(args.quiet_interval_ms),
    };
    tracing::info!(user_id = %identity.user_id, base_url = %config.base_url, "starting");

    let driver = TerminalDriver::new(transport)?;
    let mut runtime = Runtime::new(driver, SystemEnv::new(), identity, config);
    if let Some(category) = args.category {
        runtime.app_mut().select_category(category);
    }

    Ok(runtime.run().await?)
}

/// Install a file subscriber. The terminal belongs to the UI.
fn init_logging(path: &Path, level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn local_identity(args: &Args) -> LocalIdentity {
    let mut rng = rand::rng();
    let user_id =
        args.user_id.clone().unwrap_or_else(|| format!("anon-{:08x}", rng.random::<u32>()));
    let username =
        args.username.clone().unwrap_or_else(|| format!("Guest{}", rng.random_range(1000..10000)));
    LocalIdentity::new(user_id, username)
}
