//! Scorecard Back binary entrypoint wiring configuration, storage and the REST layer.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use scorecard_back::{
    auth::TokenVerifier,
    config::{AppConfig, StoreBackend},
    dao::{
        game_store::{GameStore, memory::InMemoryGameStore},
        storage::StorageError,
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = init_state(&config)?;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    info!(%addr, store = ?config.store(), "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the configured store, starting a background supervisor for remote databases.
fn init_state(config: &AppConfig) -> anyhow::Result<SharedState> {
    let verifier = config.token_verifier();

    match config.store() {
        StoreBackend::Memory => Ok(AppState::with_game_store(
            Arc::new(InMemoryGameStore::new()),
            verifier,
        )),
        StoreBackend::Mongo => supervise_mongo(verifier),
        StoreBackend::Couch => supervise_couch(verifier),
    }
}

#[cfg(feature = "mongo-store")]
fn supervise_mongo(verifier: Arc<dyn TokenVerifier>) -> anyhow::Result<SharedState> {
    use scorecard_back::dao::game_store::mongodb::{MongoConfig, MongoGameStore};

    let state = AppState::new(verifier);
    tokio::spawn(storage_supervisor::run(state.clone(), "mongodb", || async {
        let config = MongoConfig::from_env().await?;
        let store = MongoGameStore::connect(config).await?;
        Ok::<_, StorageError>(Arc::new(store) as Arc<dyn GameStore>)
    }));
    Ok(state)
}

#[cfg(not(feature = "mongo-store"))]
fn supervise_mongo(_verifier: Arc<dyn TokenVerifier>) -> anyhow::Result<SharedState> {
    anyhow::bail!("MongoDB support requires the `mongo-store` feature")
}

#[cfg(feature = "couch-store")]
fn supervise_couch(verifier: Arc<dyn TokenVerifier>) -> anyhow::Result<SharedState> {
    use scorecard_back::dao::game_store::couchdb::{CouchConfig, CouchGameStore};

    let state = AppState::new(verifier);
    tokio::spawn(storage_supervisor::run(state.clone(), "couchdb", || async {
        let config = CouchConfig::from_env()?;
        let store = CouchGameStore::connect(config).await?;
        Ok::<_, StorageError>(Arc::new(store) as Arc<dyn GameStore>)
    }));
    Ok(state)
}

#[cfg(not(feature = "couch-store"))]
fn supervise_couch(_verifier: Arc<dyn TokenVerifier>) -> anyhow::Result<SharedState> {
    anyhow::bail!("CouchDB support requires the `couch-store` feature")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
