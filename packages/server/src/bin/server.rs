//! Watch-room synchronization server.
//!
//! Keeps every participant of a room in sync with the host's playback and
//! relays chat, reactions and gifts.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin watchroom-server
//! cargo run --bin watchroom-server -- --host 0.0.0.0 --port 5000 --jwt-secret <secret>
//! ```

use std::time::Duration;

use clap::Parser;
use watchroom_server::{
    app::build_app_state,
    config::{DEFAULT_JWT_SECRET, DEFAULT_STORE_TIMEOUT_MS, ServerConfig},
    ui::Server,
};
use watchroom_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "watchroom-server")]
#[command(about = "Watch-party room synchronization server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "WATCHROOM_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "WATCHROOM_PORT", default_value = "5000")]
    port: u16,

    /// HS256 secret used to verify connection credentials
    #[arg(long, env = "JWT_SECRET", default_value = DEFAULT_JWT_SECRET, hide_env_values = true)]
    jwt_secret: String,

    /// Timeout for each collaborator-store call, in milliseconds
    #[arg(long, env = "WATCHROOM_STORE_TIMEOUT_MS", default_value_t = DEFAULT_STORE_TIMEOUT_MS)]
    store_timeout_ms: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            jwt_secret: args.jwt_secret,
            store_timeout: Duration::from_millis(args.store_timeout_ms),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    if config.uses_default_secret() {
        tracing::warn!("Using the development JWT secret; set JWT_SECRET in production");
    }

    let state = build_app_state(&config);
    let server = Server::new(state);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
