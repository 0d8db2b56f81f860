//! Opt-in reuse of an aggregated document for a bounded staleness window.

use crate::error::PipelineError;
use crate::pipeline::DocumentProducer;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Wraps a producer and serves its last document until `ttl` has elapsed.
///
/// Failures are never cached: the next call retries the inner producer. Callers that
/// arrive during a refresh wait for it instead of starting their own.
#[derive(Debug)]
pub struct CachedProducer<P> {
    inner: P,
    ttl: Duration,
    slot: Mutex<Option<(Instant, Value)>>,
}

impl<P> CachedProducer<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Drop the cached document so the next call re-aggregates.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

#[async_trait]
impl<P> DocumentProducer for CachedProducer<P>
where
    P: DocumentProducer,
{
    async fn produce(&self) -> Result<Value, PipelineError> {
        let mut slot = self.slot.lock().await;

        if let Some((stored_at, document)) = slot.as_ref()
            && stored_at.elapsed() < self.ttl
        {
            return Ok(document.clone());
        }

        let document = self.inner.produce().await?;
        *slot = Some((Instant::now(), document.clone()));
        Ok(document)
    }
}
