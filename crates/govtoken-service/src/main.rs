use clap::Parser;
use govtoken_core::{Address, Amount, SnapshotStoreConfig, TokenConfig};
use govtoken_service::{build_router, ServiceConfig, ServiceState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "govtokend", version, about = "Governed token REST service")]
struct Cli {
    /// REST socket address to bind, e.g. 127.0.0.1:8095
    #[arg(long, default_value = "127.0.0.1:8095", env = "GOVTOKEN_LISTEN")]
    listen: SocketAddr,
    /// JSON snapshot of the token state. Loaded when present; state stays in
    /// memory when omitted.
    #[arg(long, env = "GOVTOKEN_STATE_PATH")]
    state_path: Option<PathBuf>,
    /// Deploying account: initial owner, superuser and holder of the initial supply.
    #[arg(long, env = "GOVTOKEN_DEPLOYER")]
    deployer: Address,
    #[arg(long, default_value = "Governed Token")]
    name: String,
    #[arg(long, default_value = "GOV")]
    symbol: String,
    #[arg(long, default_value_t = 8)]
    decimals: u8,
    #[arg(long, default_value_t = 10_000_000_000)]
    initial_supply: Amount,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "govtoken_service=info,info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let store = match cli.state_path {
        Some(path) => SnapshotStoreConfig::file(path),
        None => SnapshotStoreConfig::Memory,
    };
    let config = ServiceConfig {
        token: TokenConfig {
            name: cli.name,
            symbol: cli.symbol,
            decimals: cli.decimals,
            initial_supply: cli.initial_supply,
            contract_address: None,
        },
        deployer: cli.deployer,
        store,
    };
    let state = ServiceState::bootstrap(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!("govtoken-service REST listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
