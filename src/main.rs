//! Bistro Boss - Restaurant Ordering Backend
//! Mission: Serve the menu, run checkout, and keep the admin dashboard honest

use anyhow::{Context, Result};
use bistro_backend::{
    api::{self, AppState},
    auth::JwtHandler,
    config::Config,
    payments::StripeGateway,
    store::Database,
};
use clap::Parser;
use dotenv::dotenv;
use std::{path::Path, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();

    info!("🍽️  Bistro Boss backend starting");

    if config.uses_dev_secret() {
        warn!("⚠️  ACCESS_TOKEN_SECRET not set; using the development signing key");
    }

    let db = Database::new(&config.db_path)?;
    info!("📦 Document store opened at: {}", config.db_path);

    let jwt = JwtHandler::new(config.access_token_secret.clone())
        .with_ttl_secs(config.token_ttl_secs);

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    let gateway = StripeGateway::new(
        http_client,
        config.payment_api_base.clone(),
        config.payment_secret_key.clone(),
    );
    if !gateway.is_configured() {
        warn!("💳 PAYMENT_SECRET_KEY not set; payment intents will fail");
    }

    let state = AppState::new(db, jwt, Arc::new(gateway));

    if let Some(email) = config.bootstrap_admin_email.as_deref() {
        state
            .users
            .ensure_admin(email)
            .await
            .context("Failed to bootstrap admin user")?;
    }

    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bistro_backend=debug,bistro=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also the crate root, for runs started from elsewhere
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}
