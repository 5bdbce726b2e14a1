use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::http::StatusCode;
use axum::{routing::get, Router};
use http::HeaderValue;
use rust_decimal::Decimal;
use tokio::{signal, sync::mpsc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use fieldops_api as api;

use api::collaborators::http::{
    HttpApartmentReader, HttpContractReader, HttpEmployeeDirectory, HttpInvoiceWriter,
    HttpServiceCatalog, HttpTimeEntryStore,
};
use api::repositories::{InMemoryJobRepository, JobRepository, SqlJobRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Storage backend: sea-orm pool or the in-memory store
    let (db, repository): (Option<Arc<_>>, Arc<dyn JobRepository>) =
        if cfg.uses_in_memory_storage() {
            info!("Using in-memory job storage");
            (None, Arc::new(InMemoryJobRepository::new()))
        } else {
            let pool = api::db::establish_connection_from_app_config(&cfg).await?;
            if cfg.auto_migrate {
                api::db::run_migrations(&pool).await.map_err(|e| {
                    error!("Failed running migrations: {}", e);
                    e
                })?;
            }
            let pool = Arc::new(pool);
            (Some(pool.clone()), Arc::new(SqlJobRepository::new(pool)))
        };

    // Init events
    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    // Collaborator clients share one bounded HTTP client
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.collaborator_timeout_secs))
        .build()?;
    let directory = Arc::new(HttpEmployeeDirectory::new(
        http_client.clone(),
        cfg.employee_directory_url.clone(),
    ));
    let time_entries = Arc::new(HttpTimeEntryStore::new(
        http_client.clone(),
        cfg.time_entry_store_url.clone(),
    ));
    let contracts = Arc::new(HttpContractReader::new(
        http_client.clone(),
        cfg.contract_reader_url.clone(),
    ));
    let apartments = Arc::new(HttpApartmentReader::new(
        http_client.clone(),
        cfg.apartment_reader_url.clone(),
    ));
    let service_catalog = Arc::new(HttpServiceCatalog::new(
        http_client.clone(),
        cfg.service_catalog_url.clone(),
    ));
    let invoices = Arc::new(HttpInvoiceWriter::new(
        http_client,
        cfg.invoice_writer_url.clone(),
    ));

    let adhoc_service_fee = Decimal::try_from(cfg.adhoc_service_fee)
        .map_err(|e| format!("invalid adhoc_service_fee: {e}"))?;

    let engine = Arc::new(api::services::jobs::JobLifecycleService::new(
        repository.clone(),
        directory,
        time_entries,
        contracts.clone(),
        invoices,
        event_sender.clone(),
        cfg.lookup_deadline(),
        adhoc_service_fee,
        cfg.default_currency.clone(),
    ));
    let queries = Arc::new(api::queries::JobQueryService::new(
        repository,
        apartments,
        service_catalog,
        contracts,
        cfg.lookup_deadline(),
    ));

    // Compose shared app state
    let app_state = api::AppState {
        db,
        config: cfg.clone(),
        engine,
        queries,
        event_sender,
    };

    // Build CORS layer from config
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    let cors_layer = if let Some(origins) = configured_origins {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(cfg.cors_allow_credentials)
    } else if cfg.should_allow_permissive_cors() {
        info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        error!("Missing CORS configuration detected; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
        return Err("Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true".into());
    };

    // Build router: status/health/metrics + v1 API + Swagger UI
    let app = Router::<api::AppState>::new()
        .route("/", get(|| async { "fieldops-api up" }))
        .route("/health", get(api::handlers::health::health))
        .route(
            "/metrics",
            get(|| async move {
                match api::metrics::metrics_handler().await {
                    Ok(body) => (StatusCode::OK, body),
                    Err(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        String::from("metrics error"),
                    ),
                }
            }),
        )
        .nest("/api/v1", api::api_v1_routes())
        .merge(api::openapi::swagger_ui())
        .route_layer(axum::middleware::from_fn(api::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(app_state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("fieldops-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
