use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use dataspace_common::CallerContext;

use crate::types::{AppendEntry, StreamAnnotation};

/// Creates streams and appends entries to them.
///
/// Implemented by the remote auditable stream service and by
/// `MemoryStreamStore` (tests). Also implemented for `Arc<S>`.
#[async_trait]
pub trait StreamStore: Send + Sync {
    /// Create an empty stream and return its id.
    async fn create(&self, annotation: StreamAnnotation, caller: &CallerContext) -> Result<String>;

    /// Append an entry to `stream_id` and return the entry id.
    async fn append_entry(
        &self,
        stream_id: &str,
        entry: AppendEntry,
        caller: &CallerContext,
    ) -> Result<String>;
}

#[async_trait]
impl<S: StreamStore + ?Sized> StreamStore for Arc<S> {
    async fn create(&self, annotation: StreamAnnotation, caller: &CallerContext) -> Result<String> {
        (**self).create(annotation, caller).await
    }

    async fn append_entry(
        &self,
        stream_id: &str,
        entry: AppendEntry,
        caller: &CallerContext,
    ) -> Result<String> {
        (**self).append_entry(stream_id, entry, caller).await
    }
}
