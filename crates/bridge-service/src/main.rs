use anyhow::{Context, Result};
use bridge_config::{BridgeConfig, ConfigLoader, LedgerClientConfig};
use bridge_core::SubmissionOrchestrator;
use bridge_ledger::create_ledger_service;
use bridge_service::api::ApiServer;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "topic-bridge")]
#[command(about = "Forwards scheduler job results to a consensus topic", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", env = "BRIDGE_CONFIG", default_value = "config/bridge.toml")]
	config: PathBuf,

	#[arg(long, env = "BRIDGE_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the bridge service
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Start) | None => start_service(cli).await,
		Some(Commands::Validate) => validate_config(cli).await,
	}
}

async fn load_config(cli: &Cli) -> Result<BridgeConfig> {
	ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", cli.config))
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("Starting topic bridge");

	let config = load_config(&cli).await?;
	info!("Network: {}", config.ledger.network);
	info!("Operator: {}", config.ledger.operator_account_id);
	info!("Ledger client: {}", config.ledger.client.kind());

	// Everything that can fail is done before the listener is bound.
	let ledger = create_ledger_service(&config.ledger).context("Failed to initialize ledger client")?;
	let orchestrator = SubmissionOrchestrator::new(Arc::new(ledger));

	ApiServer::new(config.server, orchestrator)
		.run(shutdown_signal())
		.await
		.context("HTTP server failed")?;

	info!("Topic bridge stopped");
	Ok(())
}

async fn validate_config(cli: Cli) -> Result<()> {
	info!("Validating configuration file: {:?}", cli.config);

	let config = load_config(&cli).await?;

	info!("Configuration is valid");
	info!("Listen address: {}", config.server.bind_address());
	info!("Network: {}", config.ledger.network);
	info!("Operator: {}", config.ledger.operator_account_id);
	info!("Ledger client: {}", config.ledger.client.kind());
	match &config.ledger.client {
		LedgerClientConfig::Relay(relay) => info!("Relay URL: {}", relay.url),
		LedgerClientConfig::Memory(memory) => info!(
			"Known topics: {}, message size limit: {} bytes",
			memory.topics.len(),
			memory.max_message_size
		),
	}

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
		.with_context(|| format!("Invalid log level: {}", log_level))?;

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!("Failed to install Ctrl+C handler: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				error!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received, draining in-flight requests");
}
