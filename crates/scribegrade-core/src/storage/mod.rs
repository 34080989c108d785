//! Usage-record store boundary.
//!
//! The grading pipeline writes one grading outcome per usage record; the
//! metrics layer reads historical records back. Time-window and tenant
//! filtering happen here via [`UsageQuery`], not in the metrics layer.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryUsageStore;
pub use sqlite::SqliteUsageStore;

use crate::model::{UsageRecord, UsageUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Filter for historical usage queries.
#[derive(Debug, Clone, Default)]
pub struct UsageQuery {
    pub since: Option<DateTime<Utc>>,
    pub tenant_id: Option<String>,
}

/// Durable record store for usage and quality data. No delete/undo
/// operation is required by the pipeline.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Write the grading outcome onto a usage record. Written once at
    /// grading completion or on error; never mutated again afterwards.
    async fn update(&self, usage_id: &str, update: &UsageUpdate) -> anyhow::Result<()>;

    /// Fetch records matching the filter, oldest first.
    async fn query(&self, filter: &UsageQuery) -> anyhow::Result<Vec<UsageRecord>>;
}
