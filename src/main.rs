use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use canary_supervisor::config::{CanaryConfig, CliArgs};
use canary_supervisor::pipeline::run_canary;
use canary_supervisor::rollout::controller::RolloutOutcome;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canary_supervisor=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting canary-supervisor v{}", env!("CARGO_PKG_VERSION"));
    info!("Deployment: {}", args.deployment_url);
    info!("Branch: {}", args.branch);
    info!("Strategy: {:?}", args.strategy);

    let config = CanaryConfig::from_args(args);

    // Ctrl+C flips the cancellation signal; the rollout checks it before
    // every health poll and rolls back instead of advancing blind.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, requesting rollback");
            let _ = cancel_tx.send(true);
        }
    });

    match run_canary(&config, cancel_rx).await {
        Ok(outcome) => {
            match &outcome.rollout {
                Some(RolloutOutcome::Completed { final_percentage }) => {
                    info!("Canary rollout completed at {}%", final_percentage);
                }
                Some(RolloutOutcome::RolledBack { reason }) => {
                    error!("Canary rolled back: {}", reason);
                }
                None => error!("Canary finished without a rollout decision"),
            }
            if outcome.succeeded() {
                Ok(())
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Canary run failed: {}", e);
            std::process::exit(2);
        }
    }
}
