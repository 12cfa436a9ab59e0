use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use apple_api::cli::Args;
use apple_api::database::models::{Product, Store};
use apple_api::database::seed::{sample_products, sample_stores, seed};
use apple_api::database::{DatabaseManager, MemoryRepository, PgRepository};
use apple_api::handlers::{build_router, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and friends are picked up.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("apple_api=info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let config = args.load_config();
    tracing::info!("Starting Apple API in {} mode", config.environment.as_str());

    let services = if args.in_memory {
        tracing::info!("Serving sample data from memory");
        Services {
            products: MemoryRepository::with_records(sample_products()).boxed(),
            stores: MemoryRepository::with_records(sample_stores()).boxed(),
            pool: None,
        }
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        let timeout = config.query_timeout();
        let logging = config.database.enable_query_logging;

        let products = PgRepository::<Product>::new(pool.clone(), timeout)
            .with_query_logging(logging)
            .boxed();
        let stores = PgRepository::<Store>::new(pool.clone(), timeout)
            .with_query_logging(logging)
            .boxed();

        if args.seed {
            seed(products.as_ref(), sample_products()).await;
        }

        Services {
            products,
            stores,
            pool: Some(pool),
        }
    };

    let app = build_router(&config, services);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
