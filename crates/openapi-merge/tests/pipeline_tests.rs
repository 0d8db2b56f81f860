//! Tests for aggregation order, precedence and fail-fast behavior.

use async_trait::async_trait;
use openapi_merge::{
    AggregationPipeline, DocumentProducer, Fetch, FetchError, OpenApiBuilder, PipelineError,
    Upstream, produce,
};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned documents by URL and records the order of requests.
#[derive(Default)]
struct StaticFetcher {
    documents: HashMap<String, Value>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    fn with(mut self, url: &str, document: Value) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn fetch(&self, upstream: &Upstream) -> Result<Value, FetchError> {
        self.requested.lock().unwrap().push(upstream.url().to_string());
        self.documents
            .get(upstream.url())
            .cloned()
            .ok_or_else(|| FetchError::Response {
                url: upstream.url().to_string(),
                status: 503,
                body: "unavailable".to_string(),
            })
    }
}

fn overrides(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_precedence_upstream_local_override() {
    let fetcher = StaticFetcher::default().with("u", json!({"info": {"title": "U"}}));
    let local = json!({"info": {"title": "L", "version": "1"}});

    // Without override the recursive merge keeps the local version.
    let merged = produce(&fetcher, &[Upstream::new("u")], &local, &Map::new())
        .await
        .unwrap();
    assert_eq!(merged["info"], json!({"title": "L", "version": "1"}));

    // The override replaces the whole `info` value.
    let result = produce(
        &fetcher,
        &[Upstream::new("u")],
        &local,
        &overrides(json!({"info": {"title": "O"}})),
    )
    .await
    .unwrap();
    assert_eq!(result["info"], json!({"title": "O"}));
}

#[tokio::test]
async fn test_later_upstreams_win_conflicts() {
    let fetcher = StaticFetcher::default()
        .with(
            "a",
            json!({"openapi": "3.0.0", "paths": {"/a": {}}, "tags": [{"name": "a"}]}),
        )
        .with(
            "b",
            json!({"openapi": "3.1.0", "paths": {"/b": {}}, "tags": [{"name": "b"}]}),
        );

    let sources = [Upstream::new("a"), Upstream::new("b")];
    let result = produce(&fetcher, &sources, &json!({}), &Map::new())
        .await
        .unwrap();

    assert_eq!(result["openapi"], "3.1.0");
    assert_eq!(
        result["paths"].as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["/a", "/b"]
    );
    assert_eq!(result["tags"], json!([{"name": "a"}, {"name": "b"}]));
    assert_eq!(fetcher.requested(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_local_document_folded_last() {
    let fetcher = StaticFetcher::default().with(
        "shared",
        json!({
            "components": {"schemas": {"Error": {"type": "object"}}},
            "info": {"title": "Shared", "description": "Building blocks"}
        }),
    );
    let local = OpenApiBuilder::new().title("Gateway").version("2.0.0").build();

    let result = produce(&fetcher, &[Upstream::new("shared")], &local, &Map::new())
        .await
        .unwrap();

    assert_eq!(result["info"]["title"], "Gateway");
    assert_eq!(result["info"]["description"], "Building blocks");
    assert_eq!(result["info"]["version"], "2.0.0");
    assert!(result["components"]["schemas"]["Error"].is_object());
    assert_eq!(result["paths"], json!({}));
}

#[tokio::test]
async fn test_no_upstreams_yields_local_document() {
    let fetcher = StaticFetcher::default();
    let local = json!({"openapi": "3.1.0", "paths": {}});

    let result = produce(&fetcher, &[], &local, &Map::new()).await.unwrap();
    assert_eq!(result, local);
}

#[tokio::test]
async fn test_failing_upstream_aborts() {
    let fetcher = StaticFetcher::default()
        .with("one", json!({"a": 1}))
        .with("three", json!({"c": 3}));
    let local_calls = AtomicUsize::new(0);
    let local = || {
        local_calls.fetch_add(1, Ordering::SeqCst);
        json!({})
    };

    let result = produce(
        &fetcher,
        &[
            Upstream::new("one"),
            Upstream::new("two"),
            Upstream::new("three"),
        ],
        &local,
        &overrides(json!({"x": 1})),
    )
    .await;

    match result {
        Err(PipelineError::Abort {
            index,
            upstream,
            source,
        }) => {
            assert_eq!(index, 1);
            assert_eq!(upstream.url(), "two");
            assert!(source.is_transport());
            assert!(matches!(source, FetchError::Response { status: 503, .. }));
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(local_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fetcher.requested(), vec!["one", "two"]);
}

#[tokio::test]
async fn test_non_mapping_result_rejected() {
    let fetcher = StaticFetcher::default();
    let local = json!(["not", "a", "document"]);

    let result = produce(&fetcher, &[], &local, &Map::new()).await;
    assert!(matches!(result, Err(PipelineError::NotAMapping)));
}

#[tokio::test]
async fn test_pipeline_is_deterministic() {
    let fetcher = StaticFetcher::default()
        .with("a", json!({"paths": {"/a": {"get": {}}}, "tags": [1]}))
        .with("b", json!({"paths": {"/b": {"get": {}}}, "tags": [2]}));
    let pipeline = AggregationPipeline::new(fetcher, OpenApiBuilder::new().build())
        .upstream("a")
        .upstream("b")
        .overrides(overrides(json!({"servers": [{"url": "/"}]})));

    let first = pipeline.produce().await.unwrap();
    let second = pipeline.produce().await.unwrap();

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(pipeline.sources().len(), 2);
}

#[tokio::test]
async fn test_runs_are_independent() {
    let fetcher = Arc::new(StaticFetcher::default().with("a", json!({"tags": [1]})));
    let pipeline = Arc::new(
        AggregationPipeline::new(Arc::clone(&fetcher), json!({"tags": [0]})).upstream("a"),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move { DocumentProducer::produce(pipeline.as_ref()).await })
        })
        .collect();

    for handle in handles {
        let document = handle.await.unwrap().unwrap();
        assert_eq!(document, json!({"tags": [1, 0]}));
    }
    assert_eq!(fetcher.requested().len(), 4);
}
