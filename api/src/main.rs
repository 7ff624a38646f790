use std::sync::Arc;

use anyhow::{Context, Result};
use api::{
    config::AppConfig,
    db,
    models::SqliteCredentialStore,
    routes::{self, AppState},
};
use scrobblist::{
    lastfm::LastFmClient, spotify::SpotifyClient, ReconciliationPipeline, ServicesBuilder,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let pool = db::connect(&config.database_url)
        .await
        .context("Failed to open the database")?;
    let store = Arc::new(SqliteCredentialStore::new(pool));

    let lastfm = Arc::new(
        LastFmClient::builder()
            .api_key(&config.lastfm_api_key)
            .proxy(config.proxy_url.as_deref())
            .build()?,
    );
    let spotify = Arc::new(
        SpotifyClient::builder()
            .client_id(&config.spotify_client_id)
            .client_secret(&config.spotify_client_secret)
            .redirect_uri(&config.spotify_redirect_uri)
            .proxy(config.proxy_url.as_deref())
            .build()?,
    );

    let services = ServicesBuilder::new()
        .history(lastfm)
        .catalog(spotify.clone())
        .credential_store(store.clone())
        .build()
        .map_err(anyhow::Error::msg)?;
    let pipeline = Arc::new(ReconciliationPipeline::from_services(&services));

    let app = routes::router(AppState {
        spotify,
        store,
        pipeline,
    });

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Listening on {}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
