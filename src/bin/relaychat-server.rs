//! Stateless relay answering `POST /api/chat`.
//!
//! # Usage
//!
//! ```bash
//! relaychat-server --bind 0.0.0.0:8000
//! RUST_LOG=debug relaychat-server
//! ```

use arrrg::CommandLine;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use relaychat::relay::{self, EchoAnswerer, RelayArgs, RelayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (args, free) = RelayArgs::from_command_line_relaxed("relaychat-server [OPTIONS]");
    if !free.is_empty() {
        eprintln!("command takes no positional arguments");
        std::process::exit(1);
    }
    let config = RelayConfig::try_from(args)?;

    let listener = TcpListener::bind(config.bind).await?;
    relay::serve(listener, EchoAnswerer).await?;
    Ok(())
}
