use tracing_subscriber::EnvFilter;

use marquee_api::auth::JwtKeys;
use marquee_api::config::Config;
use marquee_api::store::create_pool;
use marquee_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_secs);

    let state = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            sqlx::migrate!().run(&pool).await?;
            tracing::info!("Using PostgreSQL storage");
            AppState::postgres(pool, jwt)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory storage");
            AppState::in_memory(jwt)
        }
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
