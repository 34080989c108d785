//! In-memory usage store for tests and single-process tooling.

use super::{UsageQuery, UsageStore};
use crate::model::{UsageRecord, UsageUpdate};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    records: Mutex<BTreeMap<String, UsageRecord>>,
    /// Usage ids in the order updates were applied; lets tests assert
    /// worker processing order.
    update_order: Mutex<Vec<String>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record, as the upstream producer would.
    pub fn seed(&self, record: UsageRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.usage_id.clone(), record);
    }

    pub fn get(&self, usage_id: &str) -> Option<UsageRecord> {
        self.records.lock().unwrap().get(usage_id).cloned()
    }

    pub fn update_order(&self) -> Vec<String> {
        self.update_order.lock().unwrap().clone()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn update(&self, usage_id: &str, update: &UsageUpdate) -> anyhow::Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(usage_id.to_string())
            .or_insert_with(|| UsageRecord {
                usage_id: usage_id.to_string(),
                tenant_id: None,
                quality_score: None,
                grading_notes: None,
                graded_at: None,
                graded_by: None,
                created_at: update.graded_at,
            });
        record.quality_score = update.quality_score;
        record.grading_notes = Some(update.grading_notes.clone());
        record.graded_at = Some(update.graded_at);
        record.graded_by = Some(update.graded_by.clone());
        self.update_order.lock().unwrap().push(usage_id.to_string());
        Ok(())
    }

    async fn query(&self, filter: &UsageQuery) -> anyhow::Result<Vec<UsageRecord>> {
        let records = self.records.lock().unwrap();
        let mut out: Vec<UsageRecord> = records
            .values()
            .filter(|r| matches_filter(r, filter))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }
}

fn matches_filter(record: &UsageRecord, filter: &UsageQuery) -> bool {
    let since_ok = match filter.since {
        Some(since) => record.created_at >= since,
        None => true,
    };
    let tenant_ok = match &filter.tenant_id {
        Some(tenant) => record.tenant_id.as_deref() == Some(tenant.as_str()),
        None => true,
    };
    since_ok && tenant_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QualityGradingNotes, Recommendation};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, tenant: Option<&str>, day: u32) -> UsageRecord {
        UsageRecord {
            usage_id: id.to_string(),
            tenant_id: tenant.map(str::to_string),
            quality_score: None,
            grading_notes: None,
            graded_at: None,
            graded_by: None,
            created_at: Utc.with_ymd_and_hms(2026, 8, day, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn query_filters_by_since_and_tenant() {
        let store = MemoryUsageStore::new();
        store.seed(record("old", Some("t1"), 1));
        store.seed(record("recent-t1", Some("t1"), 20));
        store.seed(record("recent-t2", Some("t2"), 21));

        let filter = UsageQuery {
            since: Some(Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap()),
            tenant_id: Some("t1".to_string()),
        };
        let rows = store.query(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].usage_id, "recent-t1");
    }

    #[tokio::test]
    async fn update_writes_notes_once() {
        let store = MemoryUsageStore::new();
        store.seed(record("u1", None, 5));
        let update = UsageUpdate {
            quality_score: Some(82),
            grading_notes: QualityGradingNotes {
                hallucinations: vec![],
                critical_issues: vec![],
                recommendation: Recommendation::Pass,
                dimensions: vec![],
                error: None,
            },
            graded_at: Utc::now(),
            graded_by: "fake:test".to_string(),
        };
        store.update("u1", &update).await.unwrap();

        let row = store.get("u1").unwrap();
        assert_eq!(row.quality_score, Some(82));
        assert_eq!(row.graded_by.as_deref(), Some("fake:test"));
        assert_eq!(
            row.grading_notes.unwrap().recommendation,
            Recommendation::Pass
        );
        assert_eq!(store.update_order(), vec!["u1".to_string()]);
    }
}
