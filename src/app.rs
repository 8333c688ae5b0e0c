/*
 * Responsibility
 * - Load .env / Config -> build dependencies -> assemble the Router
 * - Apply middleware (HTTP-level layers; the permission gate is applied per route)
 * - Start with axum::serve() and shut down gracefully
 */
use std::{panic, process, str::FromStr, time::Duration};

use anyhow::Result;
use axum::Router;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware::http::{self, HttpLimits},
    repos::drink_repo,
    services::auth::build_auth_service,
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,coffee_shop_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost".
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    // .env first, so RUST_LOG from it reaches the subscriber too.
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = connect_db(&config.database_url).await?;
    drink_repo::ensure_schema(&db).await?;

    let auth = build_auth_service(&config)?;
    // Not fatal: the key store fetches again on the first request.
    match auth.keys().prime().await {
        Ok(count) => tracing::info!(keys = count, url = %config.auth_jwks_url, "signing keys loaded"),
        Err(err) => tracing::warn!(error = %err, url = %config.auth_jwks_url, "signing keys not loaded yet"),
    }

    let state = AppState::new(db, auth);
    let app = build_router(
        state,
        HttpLimits {
            timeout: config.request_timeout,
            body_limit_bytes: config.request_body_limit_bytes,
        },
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn connect_db(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let router = api::routes(&state).with_state(state);
    http::apply(router, limits)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
