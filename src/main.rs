use clap::Parser; // for cli
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use backoffice_core::app;
use backoffice_core::cache::{CacheInvalidator, HttpInvalidator, InvalidationQueue, LogInvalidator};
use backoffice_core::config::Args;
use backoffice_core::rate_limit::RateLimiter;
use backoffice_core::state::AppState;
use backoffice_core::store::MemoryStore;
use backoffice_core::worker::{invalidation_worker, rate_limit_sweeper};

// this is main async function with tokio
#[tokio::main]
async fn main() {
    // parse cli arguments
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).init();

    let store = MemoryStore::new();
    if let Some(path) = &args.seed {
        if let Err(e) = store.seed_from_file(path) {
            error!(error = %e, "Failed to seed record store");
            std::process::exit(1);
        }
    }

    let invalidator: Arc<dyn CacheInvalidator> = match &args.revalidate_url {
        Some(url) => {
            let http = HttpInvalidator::new(
                reqwest::Client::new(),
                url,
                args.revalidate_secret.clone(),
            );
            info!("Revalidating pages through {}", http.endpoint());
            Arc::new(http)
        }
        None => {
            info!("No revalidation url set, invalidations are only logged");
            Arc::new(LogInvalidator)
        }
    };

    let (invalidations, invalidation_rx) = InvalidationQueue::channel(args.invalidation_queue);
    let rate_limiter = RateLimiter::in_memory();

    // creating shared state
    let state = Arc::new(AppState {
        store: Arc::new(store),
        invalidations,
        rate_limiter: rate_limiter.clone(),
        login_limit: args.login_limit,
        login_window: args.login_window(),
    });

    // spawn the background workers
    tokio::spawn(invalidation_worker(invalidation_rx, invalidator));
    tokio::spawn(rate_limit_sweeper(rate_limiter, args.sweep_interval()));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, "Failed to bind {}", addr);
            std::process::exit(1);
        }
    };

    info!("Back-office API running on http://localhost:{}", args.port);
    info!(
        "Login limit: {} attempts per {} seconds",
        args.login_limit, args.login_window
    );

    if let Err(e) = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
    }

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
