//! Router and server lifecycle.
//!
//! The router exposes the aggregated document, the docs pages pointing at it, and a
//! health check. Every request for the document calls the configured producer.

use crate::config::Config;
use crate::docs::{SWAGGER_UI_OAUTH2_REDIRECT_HTML, redoc_html, swagger_ui_html};
use crate::error::AggregationFailure;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use openapi_merge::reqwest;
use openapi_merge::{AggregationPipeline, CachedProducer, DocumentProducer, HttpFetcher};
use serde_json::Value;
use std::future::ready;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Health check path.
pub const HEALTH_PATH: &str = "/health";

/// Shared handle to whatever produces the aggregated document.
pub type SharedProducer = Arc<dyn DocumentProducer>;

/// Build the producer described by `config`: the HTTP pipeline, cached when
/// `merge.cache_ttl_secs` is set.
pub fn build_producer(config: &Config) -> Result<SharedProducer, reqwest::Error> {
    let fetcher = HttpFetcher::with_timeout(config.fetch_timeout())?;
    let pipeline = AggregationPipeline::new(fetcher, config.local_document())
        .upstreams(config.merge.upstreams.iter().cloned())
        .overrides(config.merge.overrides.clone());

    Ok(match config.cache_ttl() {
        Some(ttl) => Arc::new(CachedProducer::new(pipeline, ttl)),
        None => Arc::new(pipeline),
    })
}

/// Build the router without starting a server.
///
/// Route paths are those [`AppConfig::routes`](crate::config::AppConfig::routes) lists,
/// checked when the config was parsed.
pub fn router(config: &Config, producer: SharedProducer) -> Router {
    let app = &config.app;

    let mut router = Router::new();
    if let Some(openapi_url) = &app.openapi_url {
        router = router.route(openapi_url, get(openapi_document));
    }
    let mut router = router
        .with_state(producer)
        .route(HEALTH_PATH, get(|| async { "ok" }));

    // Docs pages fetch the document through the proxy prefix, if any.
    if let Some(openapi_url) = &app.openapi_url {
        let spec_url = format!("{}{}", app.root_path, openapi_url);

        if let Some(docs_url) = &app.docs_url {
            let redirect_url = app
                .swagger_ui_oauth2_redirect_url
                .as_ref()
                .map(|url| format!("{}{}", app.root_path, url));
            let html = swagger_ui_html(
                &app.title,
                &spec_url,
                redirect_url.as_deref(),
                app.swagger_ui_init_oauth.as_ref(),
            );
            router = router.route(docs_url, get(move || ready(Html(html.clone()))));

            if let Some(redirect) = &app.swagger_ui_oauth2_redirect_url {
                router = router.route(
                    redirect,
                    get(|| ready(Html(SWAGGER_UI_OAUTH2_REDIRECT_HTML))),
                );
            }
        }
        if let Some(redoc_url) = &app.redoc_url {
            let html = redoc_html(&app.title, &spec_url);
            router = router.route(redoc_url, get(move || ready(Html(html.clone()))));
        }
    }

    router.layer(TraceLayer::new_for_http())
}

async fn openapi_document(
    State(producer): State<SharedProducer>,
) -> Result<Json<Value>, AggregationFailure> {
    match producer.produce().await {
        Ok(document) => Ok(Json(document)),
        Err(err) => {
            tracing::warn!(error = %err, "OpenAPI aggregation failed");
            Err(err.into())
        }
    }
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let producer = build_producer(&config)?;
    let router = router(&config, producer);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        endpoint = %config.endpoint(),
        upstreams = config.merge.upstreams.len(),
        cache_ttl_secs = ?config.merge.cache_ttl_secs,
        "Serving aggregated OpenAPI document"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
