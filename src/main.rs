//! Resource Directory daemon
//!
//! Loads configuration, connects the backing store, registers the enabled
//! provisioning drivers and their pools, then serves the REST edge next to
//! health and metrics endpoints.

use clap::Parser;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use resource_directory::{
    driver, store, ApiServer, ApiServerConfig, CallerContext, Directory, DirectoryConfig,
    DirectoryMetrics, DriverFactory, Error, KeySpace, Result,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Resource Directory - metadata store for the storage control plane
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "DIRECTORY_CONFIG")]
    config: Option<String>,

    /// REST API bind address (overrides api.bindAddr)
    #[arg(long, env = "API_ADDR")]
    api_addr: Option<String>,

    /// Metrics server bind address (overrides api.metricsAddr)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,

    /// Health server bind address
    #[arg(long, env = "HEALTH_ADDR", default_value = "0.0.0.0:8081")]
    health_addr: String,

    /// Backing store driver (overrides database.driver)
    #[arg(long, env = "DB_DRIVER")]
    db_driver: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let mut config = match &args.config {
        Some(path) => DirectoryConfig::from_file(path)?,
        None => DirectoryConfig::default(),
    };
    if let Some(addr) = &args.api_addr {
        config.api.bind_addr = addr.clone();
    }
    if let Some(addr) = &args.metrics_addr {
        config.api.metrics_addr = addr.clone();
    }
    if let Some(db_driver) = &args.db_driver {
        config.database.driver = db_driver.clone();
    }
    config.validate()?;

    info!("Starting Resource Directory");
    info!("  Version: {}", resource_directory::VERSION);
    info!("  Store: {}", config.database.driver);
    info!("  Key root: {}", config.keyspace.root);
    info!("  REST API: {}", config.api.bind_addr);

    let registry = Registry::new();
    let metrics = DirectoryMetrics::register(&registry)?;
    let kv = store::connect(&config.database)?;
    let directory =
        Directory::new(kv, KeySpace::new(config.keyspace.root.clone())).with_metrics(metrics);

    register_drivers(&directory, &config).await?;

    let health_addr = args.health_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = run_health_server(&health_addr).await {
            error!("Health server error: {}", e);
        }
    });

    let metrics_addr = config.api.metrics_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = run_metrics_server(&metrics_addr, registry).await {
            error!("Metrics server error: {}", e);
        }
    });

    let api_config = ApiServerConfig::from_bind_addr(&config.api.bind_addr)?;
    let api_server = Arc::new(ApiServer::new(api_config, directory));

    let signal_server = api_server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, shutting down");
            signal_server.shutdown();
        }
    });

    api_server.run().await?;

    info!("Resource Directory shutdown complete");
    Ok(())
}

// =============================================================================
// Driver Registration
// =============================================================================

/// Set up each enabled driver, record a dock for it and sync its pools
async fn register_drivers(directory: &Directory, config: &DirectoryConfig) -> Result<()> {
    let ctx = CallerContext::admin("");
    for name in &config.drivers.enabled_backends {
        let backend = DriverFactory::create(name)?;
        driver::setup_driver(backend.as_ref()).await?;

        let dock =
            driver::register_dock(directory, &ctx, backend.as_ref(), &config.api.bind_addr).await?;

        match driver::sync_pools(directory, &ctx, &dock.base.id, backend.as_ref()).await {
            Ok(pools) => info!("Driver {} registered with {} pools", name, pools.len()),
            Err(e) => warn!("Driver {} pools not synced: {}", name, e),
        }
    }
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn", "tower=warn", "axum=info"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

// =============================================================================
// Health Server
// =============================================================================

async fn run_health_server(addr: &str) -> Result<()> {
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Body, Request, Response, Server, StatusCode};

    let make_svc = make_service_fn(|_conn| async {
        Ok::<_, std::convert::Infallible>(service_fn(|req: Request<Body>| async move {
            let (status, body) = match req.uri().path() {
                "/healthz" | "/livez" | "/readyz" => (StatusCode::OK, "ok"),
                _ => (StatusCode::NOT_FOUND, "not found"),
            };
            let mut response = Response::new(Body::from(body));
            *response.status_mut() = status;
            Ok::<_, std::convert::Infallible>(response)
        }))
    });

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Configuration(format!("Invalid health server address: {}", e)))?;

    info!("Health server listening on {}", addr);
    Server::bind(&addr)
        .serve(make_svc)
        .await
        .map_err(|e| Error::Internal(format!("Health server error: {}", e)))?;

    Ok(())
}

// =============================================================================
// Metrics Server
// =============================================================================

async fn run_metrics_server(addr: &str, registry: Registry) -> Result<()> {
    use hyper::header::{HeaderValue, CONTENT_TYPE};
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Body, Request, Response, Server, StatusCode};
    use prometheus::{Encoder, TextEncoder};

    let make_svc = make_service_fn(move |_conn| {
        let registry = registry.clone();
        async move {
            Ok::<_, std::convert::Infallible>(service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                async move {
                    if req.uri().path() != "/metrics" {
                        let mut response = Response::new(Body::from("not found"));
                        *response.status_mut() = StatusCode::NOT_FOUND;
                        return Ok::<_, std::convert::Infallible>(response);
                    }

                    let encoder = TextEncoder::new();
                    let mut buffer = Vec::new();
                    let response = match encoder.encode(&registry.gather(), &mut buffer) {
                        Ok(()) => {
                            let mut response = Response::new(Body::from(buffer));
                            if let Ok(value) = HeaderValue::from_str(encoder.format_type()) {
                                response.headers_mut().insert(CONTENT_TYPE, value);
                            }
                            response
                        }
                        Err(e) => {
                            let mut response = Response::new(Body::from(e.to_string()));
                            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                            response
                        }
                    };
                    Ok::<_, std::convert::Infallible>(response)
                }
            }))
        }
    });

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Configuration(format!("Invalid metrics server address: {}", e)))?;

    info!("Metrics server listening on {}", addr);
    Server::bind(&addr)
        .serve(make_svc)
        .await
        .map_err(|e| Error::Internal(format!("Metrics server error: {}", e)))?;

    Ok(())
}
