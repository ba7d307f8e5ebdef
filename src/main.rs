use std::net::SocketAddr;
use std::sync::Arc;

use jobportal_backend::{
    build_app,
    config::{get_config, init_config},
    database::{
        pool::{create_pool, run_migrations},
        MemoryStore, PgStore, Store,
    },
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jobportal_backend=debug,tower_http=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    init_config()?;
    let config = get_config();

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            info!("using postgres store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; data lives in memory and is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    tokio::fs::create_dir_all(&config.uploads_dir).await?;
    let (app, _state) = build_app(store, config)?;

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
