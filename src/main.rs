use std::path::PathBuf;

use apparel_recon::{api, AppConfig, MatchStrategy, Reconciler};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "apparel-recon", version, about = "Reconcile purchase-order registers against supplier receipts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match a register CSV against a directory of receipt CSVs.
    Match {
        /// Directory holding one CSV per receipt.
        #[arg(long, env = "RECON_RECEIPTS")]
        receipts: PathBuf,
        /// Purchase-order register CSV.
        #[arg(long, env = "RECON_REGISTER")]
        register: PathBuf,
        /// Minimum product similarity, overrides the configured value.
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long, value_enum)]
        strategy: Option<MatchStrategy>,
    },
    /// Serve the HTTP API.
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Match {
            receipts,
            register,
            threshold,
            strategy,
        } => {
            if let Some(threshold) = threshold {
                config.matching.threshold = threshold;
            }
            if let Some(strategy) = strategy {
                config.matching.strategy = strategy;
            }
            config.validate()?;
            info!("Starting reconciliation with config: {:?}", config.matching);

            let matching = config.matching;
            let output = tokio::task::spawn_blocking(move || {
                Reconciler::new(matching).run_files(&receipts, &register)
            })
            .await??;
            info!(
                "Wrote {} and {}",
                output.register_path.display(),
                output.receipt_path.display()
            );
        }
        Command::Serve => {
            info!("Starting server with config: {:?}", config);
            let app = api::router(config.matching);

            let addr = format!("{}:{}", config.server.host, config.server.port);
            info!("Server listening on {}", addr);
            info!("API Endpoints:");
            info!("  GET  /health");
            info!("  POST /api/reconcile");

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
