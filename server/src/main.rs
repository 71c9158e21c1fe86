use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use server::build_app;

/// HTTP front end for a prebuilt boolean index
#[derive(Parser)]
#[command(name = "server")]
struct Args {
    /// Directory holding index.bin
    #[arg(long, default_value = "./index")]
    index: String,
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let Args { index, host, port } = Args::parse();

    let app = build_app(index.clone()).with_context(|| format!("loading index from {index}"))?;
    let addr = SocketAddr::new(host, port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, index = %index, "accepting queries");
    axum::serve(listener, app).await?;
    Ok(())
}
