//! In-memory stream store (tests, no stream service required).

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;

use dataspace_common::CallerContext;

use crate::store::StreamStore;
use crate::types::{AppendEntry, StreamAnnotation, StreamEntry};

/// Streams keyed by id, entries with a store-wide incrementing sequence.
/// Thread-safe.
pub struct MemoryStreamStore {
    next_seq: AtomicI64,
    streams: Mutex<HashMap<String, StreamAnnotation>>,
    entries: Mutex<Vec<StreamEntry>>,
    failure: Option<String>,
}

impl MemoryStreamStore {
    pub fn new() -> Self {
        Self {
            next_seq: AtomicI64::new(1),
            streams: Mutex::new(HashMap::new()),
            entries: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// A store whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    pub fn stream_count(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    pub fn stream(&self, stream_id: &str) -> Option<StreamAnnotation> {
        self.streams.lock().unwrap().get(stream_id).cloned()
    }

    /// Entries of one stream in append order.
    pub fn entries(&self, stream_id: &str) -> Vec<StreamEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.stream_id == stream_id)
            .cloned()
            .collect()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn check_failure(&self) -> Result<()> {
        if let Some(message) = &self.failure {
            bail!("stream store unavailable: {message}");
        }
        Ok(())
    }
}

impl Default for MemoryStreamStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamStore for MemoryStreamStore {
    async fn create(&self, annotation: StreamAnnotation, _caller: &CallerContext) -> Result<String> {
        self.check_failure()?;
        let id = format!("ais:{}", uuid::Uuid::new_v4().simple());
        self.streams.lock().unwrap().insert(id.clone(), annotation);
        Ok(id)
    }

    async fn append_entry(
        &self,
        stream_id: &str,
        entry: AppendEntry,
        caller: &CallerContext,
    ) -> Result<String> {
        self.check_failure()?;
        if !self.streams.lock().unwrap().contains_key(stream_id) {
            bail!("stream {stream_id} does not exist");
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let id = format!("{stream_id}:{seq}");
        self.entries.lock().unwrap().push(StreamEntry {
            id: id.clone(),
            stream_id: stream_id.to_string(),
            seq,
            ts: Utc::now(),
            user_identity: caller.user_identity.clone(),
            entry,
        });
        Ok(id)
    }
}
