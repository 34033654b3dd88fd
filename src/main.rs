//! Realtime session relay.
//!
//! Issues short-lived realtime session tokens and serves the client shell.
//! Every outbound call goes through a proxy-aware dispatcher that re-reads
//! `HTTPS_PROXY` / `HTTP_PROXY` / `ALL_PROXY` on each request.
//!
//! ```text
//!   browser ──▶ axum router ──▶ /token ────▶ SessionTokenService ─┐
//!                          ├──▶ /check-ip ─▶ DiagnosticProbe ─────┤
//!                          └──▶ /set-proxy ─▶ env store           │
//!                                                 ▲               ▼
//!                                                 └──── Dispatcher (resolve → select → execute)
//!                                                                 │
//!                                                       direct ◀──┴──▶ proxy tunnel ──▶ upstream
//! ```

use clap::Parser;
use std::path::PathBuf;

use realtime_relay::config::loader::CONFIG_PATH_VAR;
use realtime_relay::lifecycle::startup;

#[derive(Parser)]
#[command(name = "realtime-relay", version, about = "Realtime session token relay")]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = CONFIG_PATH_VAR)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    startup::run(cli.config).await?;
    Ok(())
}
