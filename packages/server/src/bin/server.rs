//! Shared shopping room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kaimono-server
//! cargo run --bin kaimono-server -- --host 0.0.0.0 --port 3000 --product-catalog products.json
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use kaimono_server::{
    config::{ServerConfig, ttl_from_secs},
    domain::ProductLookup,
    infrastructure::product::InMemoryProductCatalog,
    ui::Server,
};
use kaimono_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kaimono-server")]
#[command(about = "Shared shopping room server with real-time room events", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "KAIMONO_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "KAIMONO_PORT", default_value = "8080")]
    port: u16,

    /// Seconds without activity before an ephemeral room is closed (0 disables)
    #[arg(long, env = "KAIMONO_IDLE_ROOM_TTL_SECS", default_value = "3600")]
    idle_room_ttl_secs: u64,

    /// Seconds an ended room stays addressable before it is purged
    #[arg(long, default_value = "600")]
    tombstone_retention_secs: u64,

    /// Seconds between idle room sweeps
    #[arg(long, default_value = "60")]
    sweep_interval_secs: u64,

    /// Page size when the client does not ask for one
    #[arg(long, default_value = "50")]
    default_page_limit: usize,

    /// Largest page size a client may ask for
    #[arg(long, default_value = "200")]
    max_page_limit: usize,

    /// JSON file with the products that can be shared
    #[arg(long, env = "KAIMONO_PRODUCT_CATALOG")]
    product_catalog: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            idle_room_ttl: ttl_from_secs(args.idle_room_ttl_secs),
            tombstone_retention: Duration::from_secs(args.tombstone_retention_secs),
            sweep_interval: Duration::from_secs(args.sweep_interval_secs),
            default_page_limit: args.default_page_limit,
            max_page_limit: args.max_page_limit,
            product_catalog: args.product_catalog,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    let catalog = match &config.product_catalog {
        Some(path) => match InMemoryProductCatalog::from_json_file(path) {
            Ok(catalog) => {
                tracing::info!("Loaded {} product(s) from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No product catalog configured, product shares will not be enriched");
            InMemoryProductCatalog::default()
        }
    };
    let products: Arc<dyn ProductLookup> = Arc::new(catalog);

    let server = Server::from_config(&config, products);
    let listener = match tokio::net::TcpListener::bind(config.bind_addr()).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr(), e);
            std::process::exit(1);
        }
    };
    tracing::info!("Press Ctrl+C to shutdown gracefully");

    if let Err(e) = server.run(listener).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
