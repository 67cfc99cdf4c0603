use crate::schema::{AnalysisResponse, ChannelSize, Platform, VideoType};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tokio::sync::Mutex;

/// One persisted analysis: the validated request fields plus the validated
/// model output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub platform: Platform,
    pub niche: String,
    pub channel_size: ChannelSize,
    pub video_type: VideoType,
    pub idea: Option<String>,
    pub transcript: Option<String>,
    pub youtube_url: Option<String>,
    pub analysis: AnalysisResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    #[serde(flatten)]
    pub record: AnalysisRecord,
    pub created_at: DateTime<Utc>,
}

/// Persistence collaborator. Failures here must never fail a primary
/// request; callers log and move on.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn record_viewer(&self, ip_hash: &str) -> Result<()>;
    async fn viewer_count(&self) -> Result<usize>;
    async fn save_analysis(&self, record: AnalysisRecord) -> Result<()>;
    async fn history(&self) -> Result<Vec<HistoryEntry>>;
}

#[derive(Default)]
struct MemoryInner {
    viewers: HashSet<String>,
    analyses: Vec<HistoryEntry>,
    next_id: u64,
}

/// In-memory stand-in for a real database-backed store.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<MemoryInner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn record_viewer(&self, ip_hash: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.viewers.insert(ip_hash.to_string());
        Ok(())
    }

    async fn viewer_count(&self) -> Result<usize> {
        let inner = self.inner.lock().await;
        Ok(inner.viewers.len())
    }

    async fn save_analysis(&self, record: AnalysisRecord) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let entry = HistoryEntry {
            id: inner.next_id,
            record,
            created_at: Utc::now(),
        };
        inner.analyses.push(entry);
        Ok(())
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let inner = self.inner.lock().await;
        let mut entries = inner.analyses.clone();
        entries.reverse();
        Ok(entries)
    }
}
