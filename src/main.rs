use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;
use url::Url;

use boardlink::chess::Color;
use boardlink::config::{self, PlayConfig};
use boardlink::engine::EngineKind;
use boardlink::peer::{self, PeerConfig};

/// Play chess against an engine over a websocket peer.
#[derive(Parser)]
#[command(name = "boardlink", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to a peer and play on the terminal board
    Play {
        #[arg(long, env = config::URL_ENV, default_value = config::DEFAULT_URL, value_parser = config::parse_url)]
        url: Url,

        #[arg(long, env = config::PROTOCOL_ENV, default_value = config::DEFAULT_PROTOCOL)]
        protocol: String,

        /// side moved by hand, the engine plays the other
        #[arg(long, default_value_t = Color::White)]
        human: Color,

        #[arg(long, default_value_t = EngineKind::Minimax)]
        engine: EngineKind,

        /// search depth in plies
        #[arg(long, env = config::DEPTH_ENV, default_value_t = config::DEFAULT_DEPTH)]
        depth: u32,

        #[arg(long, default_value_t = config::DEFAULT_POLL_INTERVAL_MS)]
        poll_ms: u64,
    },
    /// Serve games to clients as the other end of the connection
    Peer {
        #[arg(long, env = config::BIND_ENV, default_value = config::DEFAULT_BIND, value_parser = config::parse_bind)]
        bind: SocketAddr,

        #[arg(long, env = config::PROTOCOL_ENV, default_value = config::DEFAULT_PROTOCOL)]
        protocol: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Play {
            url,
            protocol,
            human,
            engine,
            depth,
            poll_ms,
        } => boardlink::play(&PlayConfig {
            url,
            protocol,
            human,
            engine,
            depth,
            poll_interval: Duration::from_millis(poll_ms),
        })
        .map_err(|err| err.to_string()),
        Command::Peer { bind, protocol } => peer::serve(&PeerConfig { bind, protocol }).map_err(|err| err.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
