//! Trace store loaded from a JSONL file
//!
//! Each non-empty line holds one complete trace as JSON. The file is read
//! once at open; the contents are then served from memory.

use super::{MemoryTraceStore, StoreError, StoreResult, TraceStore};
use crate::model::{Trace, TraceId};
use crate::query::TraceQuery;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// File-backed trace store
#[derive(Debug)]
pub struct JsonlTraceStore {
    path: PathBuf,
    inner: MemoryTraceStore,
}

impl JsonlTraceStore {
    /// Load all traces from `path`
    pub async fn open(path: impl AsRef<Path>, shallow_search: bool) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = tokio::fs::File::open(&path).await?;
        let mut lines = BufReader::new(file).lines();

        let inner = MemoryTraceStore::new().shallow_search(shallow_search);
        let mut line_number = 0usize;
        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let trace: Trace = serde_json::from_str(line).map_err(|source| {
                StoreError::InvalidRecord {
                    line: line_number,
                    source,
                }
            })?;
            inner.insert(trace);
        }

        info!("Loaded {} traces from {}", inner.len(), path.display());
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl TraceStore for JsonlTraceStore {
    async fn find_traces(&self, query: &TraceQuery) -> StoreResult<Vec<Trace>> {
        self.inner.find_traces(query).await
    }

    async fn get_trace(&self, trace_id: &TraceId) -> StoreResult<Trace> {
        self.inner.get_trace(trace_id).await
    }
}
