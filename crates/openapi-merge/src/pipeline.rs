//! Fetch, merge, fold in the local document, override.

use crate::error::PipelineError;
use crate::fetch::Fetch;
use crate::merge::{apply_override, merge_owned};
use crate::types::{OverrideDocument, Upstream};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Producer of this service's own document.
///
/// Called once per aggregation run, only after every upstream was fetched.
pub trait DocumentProvider: Send + Sync {
    fn document(&self) -> Value;
}

impl DocumentProvider for Value {
    fn document(&self) -> Value {
        self.clone()
    }
}

impl<F> DocumentProvider for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn document(&self) -> Value {
        self()
    }
}

/// The operation exposed to the serving layer.
#[async_trait]
pub trait DocumentProducer: Send + Sync {
    /// Produce a complete aggregated document, or fail without a partial result.
    async fn produce(&self) -> Result<Value, PipelineError>;
}

/// Run one aggregation.
///
/// 1. Start from an empty mapping.
/// 2. Fetch each upstream in order and [`merge()`](crate::merge()) it into the result;
///    the first failure aborts the run.
/// 3. Merge the local document.
/// 4. [`apply_override`].
///
/// Fetches are sequential. Nothing is shared between runs, so concurrent calls need no
/// coordination.
pub async fn produce<F, P>(
    fetcher: &F,
    sources: &[Upstream],
    local: &P,
    overrides: &OverrideDocument,
) -> Result<Value, PipelineError>
where
    F: Fetch + ?Sized,
    P: DocumentProvider + ?Sized,
{
    let mut result = Value::Object(Map::new());

    for (index, upstream) in sources.iter().enumerate() {
        let document = fetcher
            .fetch(upstream)
            .await
            .map_err(|source| PipelineError::Abort {
                index,
                upstream: upstream.clone(),
                source,
            })?;
        result = merge_owned(result, document);
    }

    result = merge_owned(result, local.document());

    apply_override(result, overrides)
}

/// An aggregation configured once and run on demand.
///
/// # Example
///
/// ```ignore
/// let pipeline = AggregationPipeline::new(HttpFetcher::new()?, local_document)
///     .upstreams(config.upstreams.clone())
///     .overrides(config.overrides.clone());
/// let document = pipeline.produce().await?;
/// ```
#[derive(Debug, Clone)]
pub struct AggregationPipeline<F, P> {
    fetcher: F,
    local: P,
    sources: Vec<Upstream>,
    overrides: OverrideDocument,
}

impl<F, P> AggregationPipeline<F, P>
where
    F: Fetch,
    P: DocumentProvider,
{
    /// Create a pipeline with no upstreams and an empty override.
    pub fn new(fetcher: F, local: P) -> Self {
        Self {
            fetcher,
            local,
            sources: Vec::new(),
            overrides: Map::new(),
        }
    }

    /// Append one upstream; upstreams are merged in the order they are added.
    pub fn upstream(mut self, upstream: impl Into<Upstream>) -> Self {
        self.sources.push(upstream.into());
        self
    }

    /// Append upstreams in order.
    pub fn upstreams(mut self, upstreams: impl IntoIterator<Item = Upstream>) -> Self {
        self.sources.extend(upstreams);
        self
    }

    /// Set the top-level override applied after all merges.
    pub fn overrides(mut self, overrides: OverrideDocument) -> Self {
        self.overrides = overrides;
        self
    }

    /// The configured upstreams, in merge order.
    pub fn sources(&self) -> &[Upstream] {
        &self.sources
    }

    /// Run the aggregation once.
    pub async fn produce(&self) -> Result<Value, PipelineError> {
        produce(&self.fetcher, &self.sources, &self.local, &self.overrides).await
    }
}

#[async_trait]
impl<F, P> DocumentProducer for AggregationPipeline<F, P>
where
    F: Fetch,
    P: DocumentProvider,
{
    async fn produce(&self) -> Result<Value, PipelineError> {
        AggregationPipeline::produce(self).await
    }
}
