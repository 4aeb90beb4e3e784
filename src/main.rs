use tracing_subscriber::EnvFilter;
use user_cluster::cluster::{Role, WorkerCommand, WorkerSupervisor};
use user_cluster::config::{ServerConfig, load_dotenv};
use user_cluster::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenv {
        Ok(Some(path)) => tracing::debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => tracing::warn!("Ignoring .env: {:#}", e),
    }

    let config = ServerConfig::from_env()?;

    // Decided once; the primary marks each child it forks.
    match Role::from_env() {
        Role::Primary => {
            tracing::info!("Workers will listen on {}", config.bind_addr());

            let supervisor = WorkerSupervisor::new(WorkerCommand::current_exe()?);
            supervisor.run(shutdown_signal()).await?;
        }
        Role::Worker { id } => {
            server::run_worker(&config, id).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
