mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use lithocore_layers::{
    seed_authored_layers, LexiconClassifier, SearchController, SearchOptions,
    SharedSearchController,
};
use lithocore_mindat::{LocalityFilters, MindatClient};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(lithocore_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = MindatClient::from_config(&config)?;
    if !client.has_credential() {
        tracing::warn!("MINDAT_API_KEY is not set; mineral search is disabled until it is configured");
    }

    let filters = LocalityFilters {
        country: config.search_country.clone(),
        ..LocalityFilters::default()
    };
    let options = SearchOptions {
        filters: filters.clone(),
        deadline: Duration::from_secs(config.session_deadline_secs),
        ..SearchOptions::default()
    };

    let mut controller = SearchController::new(client.clone(), LexiconClassifier, options);
    if !config.sites_path.exists() {
        tracing::warn!(
            path = %config.sites_path.display(),
            "sites file not found; starting without authored layers"
        );
    }
    let sites = lithocore_core::load_sites_or_default(&config.sites_path)?;
    seed_authored_layers(controller.registry_mut(), &sites);
    let search = SharedSearchController::new(controller);

    let warm = search.clone();
    let minerals = config.default_minerals.clone();
    tokio::spawn(async move {
        warm.warm_load(&minerals, &filters).await;
    });

    let app = build_app(
        AppState { client, search },
        rate_limit_state(config.rate_limit_per_minute),
    );

    tracing::info!(addr = %config.bind_addr, env = %config.env, "lithocore server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
