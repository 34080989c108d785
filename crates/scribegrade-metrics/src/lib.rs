//! Quality dashboard metrics over graded usage records.
//!
//! Read-only and independent of the grading queue: callers pre-filter
//! records by time window and tenant through the store's `UsageQuery` and
//! hand the slice here. Nothing computed in this crate is persisted.

use scribegrade_core::model::{Recommendation, UsageRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fixed score histogram buckets, inclusive on both ends.
const SCORE_BUCKETS: [(u32, u32, &str); 6] = [
    (0, 50, "0-50"),
    (51, 60, "51-60"),
    (61, 70, "61-70"),
    (71, 80, "71-80"),
    (81, 90, "81-90"),
    (91, 100, "91-100"),
];

/// Keyword buckets for hallucination categorization. First match wins;
/// anything unmatched lands in "Other".
const HALLUCINATION_CATEGORIES: [&str; 4] = ["medication", "vital", "symptom", "diagnosis"];

#[derive(Debug, Clone, Serialize)]
pub struct BucketCount {
    pub range: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyScore {
    /// Calendar day, `YYYY-MM-DD`, from the record's creation date.
    pub date: String,
    pub average_score: u32,
    pub graded: u64,
}

/// Derived, non-persistent dashboard statistics, computed fresh per query.
///
/// The three rate fields are rounded independently, so they need not sum to
/// exactly 100. Accepted approximation, not a bug.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub average_score: u32,
    pub score_distribution: Vec<BucketCount>,
    pub pass_rate: u32,
    pub review_rate: u32,
    pub fail_rate: u32,
    pub top_hallucinations: Vec<CategoryCount>,
    pub trend: Vec<DailyScore>,
}

/// Compute dashboard metrics over a pre-filtered record set.
pub fn compute_metrics(records: &[UsageRecord]) -> DashboardMetrics {
    tracing::debug!(records = records.len(), "computing dashboard metrics");
    let scores: Vec<u32> = records.iter().filter_map(|r| r.quality_score).collect();

    let average_score = if scores.is_empty() {
        0
    } else {
        (scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64).round() as u32
    };

    let score_distribution = SCORE_BUCKETS
        .iter()
        .map(|&(lo, hi, range)| BucketCount {
            range,
            count: scores.iter().filter(|&&s| s >= lo && s <= hi).count() as u64,
        })
        .collect();

    let total = records.len() as f64;
    let rate = |recommendation: Recommendation| -> u32 {
        if records.is_empty() {
            return 0;
        }
        let count = records
            .iter()
            .filter_map(|r| r.grading_notes.as_ref())
            .filter(|n| n.recommendation == recommendation)
            .count() as f64;
        (count * 100.0 / total).round() as u32
    };

    DashboardMetrics {
        average_score,
        score_distribution,
        pass_rate: rate(Recommendation::Pass),
        review_rate: rate(Recommendation::ReviewRequired),
        fail_rate: rate(Recommendation::Fail),
        top_hallucinations: top_hallucinations(records),
        trend: daily_trend(records),
    }
}

/// Bucket a single hallucination string by keyword.
fn categorize(hallucination: &str) -> &'static str {
    let lowered = hallucination.to_lowercase();
    HALLUCINATION_CATEGORIES
        .iter()
        .find(|k| lowered.contains(**k))
        .copied()
        .unwrap_or("Other")
}

/// Category counts over every hallucination in every record, descending by
/// count (label-ascending on ties for deterministic output), top 5.
fn top_hallucinations(records: &[UsageRecord]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for record in records {
        let Some(notes) = &record.grading_notes else {
            continue;
        };
        for hallucination in &notes.hallucinations {
            *counts.entry(categorize(hallucination)).or_insert(0) += 1;
        }
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(b.category)));
    out.truncate(5);
    out
}

/// Per-day average score, ascending by date string. Records without a score
/// do not contribute.
fn daily_trend(records: &[UsageRecord]) -> Vec<DailyScore> {
    let mut days: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for record in records {
        let Some(score) = record.quality_score else {
            continue;
        };
        let day = record.created_at.date_naive().to_string();
        let entry = days.entry(day).or_insert((0.0, 0));
        entry.0 += score as f64;
        entry.1 += 1;
    }
    days.into_iter()
        .map(|(date, (sum, n))| DailyScore {
            date,
            average_score: (sum / n as f64).round() as u32,
            graded: n,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use scribegrade_core::model::QualityGradingNotes;

    fn record(
        id: &str,
        score: Option<u32>,
        recommendation: Option<Recommendation>,
        hallucinations: Vec<&str>,
        day: u32,
    ) -> UsageRecord {
        UsageRecord {
            usage_id: id.to_string(),
            tenant_id: None,
            quality_score: score,
            grading_notes: recommendation.map(|r| QualityGradingNotes {
                hallucinations: hallucinations.iter().map(|s| s.to_string()).collect(),
                critical_issues: vec![],
                recommendation: r,
                dimensions: vec![],
                error: None,
            }),
            graded_at: None,
            graded_by: None,
            created_at: Utc.with_ymd_and_hms(2026, 8, day, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_record_set_yields_zeroes_and_empty_trend() {
        let metrics = compute_metrics(&[]);
        assert_eq!(metrics.average_score, 0);
        assert_eq!(metrics.pass_rate, 0);
        assert_eq!(metrics.review_rate, 0);
        assert_eq!(metrics.fail_rate, 0);
        assert!(metrics.trend.is_empty());
        assert!(metrics.top_hallucinations.is_empty());
        assert!(metrics.score_distribution.iter().all(|b| b.count == 0));
    }

    #[test]
    fn score_buckets_are_inclusive_and_exact() {
        let records = vec![
            record("a", Some(95), Some(Recommendation::Pass), vec![], 1),
            record("b", Some(85), Some(Recommendation::Pass), vec![], 1),
            record("c", Some(75), Some(Recommendation::Pass), vec![], 2),
            record("d", Some(65), Some(Recommendation::ReviewRequired), vec![], 2),
            record("e", Some(45), Some(Recommendation::Fail), vec![], 3),
        ];
        let metrics = compute_metrics(&records);
        let by_range: BTreeMap<&str, u64> = metrics
            .score_distribution
            .iter()
            .map(|b| (b.range, b.count))
            .collect();
        assert_eq!(by_range["91-100"], 1);
        assert_eq!(by_range["81-90"], 1);
        assert_eq!(by_range["71-80"], 1);
        assert_eq!(by_range["61-70"], 1);
        assert_eq!(by_range["51-60"], 0);
        assert_eq!(by_range["0-50"], 1);
        assert_eq!(metrics.average_score, 73); // (95+85+75+65+45)/5
    }

    #[test]
    fn rates_are_rounded_independently() {
        let records = vec![
            record("a", Some(90), Some(Recommendation::Pass), vec![], 1),
            record("b", Some(60), Some(Recommendation::ReviewRequired), vec![], 1),
            record("c", Some(30), Some(Recommendation::Fail), vec![], 1),
        ];
        let metrics = compute_metrics(&records);
        // 1/3 each, rounded independently; deliberately does not sum to 100.
        assert_eq!(metrics.pass_rate, 33);
        assert_eq!(metrics.review_rate, 33);
        assert_eq!(metrics.fail_rate, 33);
    }

    #[test]
    fn ungraded_records_count_toward_rate_denominators() {
        let records = vec![
            record("a", Some(90), Some(Recommendation::Pass), vec![], 1),
            record("b", None, None, vec![], 1),
        ];
        let metrics = compute_metrics(&records);
        assert_eq!(metrics.pass_rate, 50);
        assert_eq!(metrics.average_score, 90);
    }

    #[test]
    fn hallucinations_bucket_by_keyword_and_sort_by_count() {
        let records = vec![
            record(
                "a",
                Some(70),
                Some(Recommendation::ReviewRequired),
                vec![
                    "fabricated medication lisinopril",
                    "medication dose invented",
                    "vital signs not in transcript",
                ],
                1,
            ),
            record(
                "b",
                Some(65),
                Some(Recommendation::ReviewRequired),
                vec!["unsupported diagnosis of COPD", "made-up follow-up appointment"],
                2,
            ),
        ];
        let metrics = compute_metrics(&records);
        assert_eq!(metrics.top_hallucinations[0].category, "medication");
        assert_eq!(metrics.top_hallucinations[0].count, 2);
        let categories: Vec<&str> = metrics
            .top_hallucinations
            .iter()
            .map(|c| c.category)
            .collect();
        assert!(categories.contains(&"vital"));
        assert!(categories.contains(&"diagnosis"));
        assert!(categories.contains(&"Other"));
    }

    #[test]
    fn metrics_serialize_for_dashboard_consumers() {
        let records = vec![record("a", Some(95), Some(Recommendation::Pass), vec![], 1)];
        let json = serde_json::to_value(compute_metrics(&records)).unwrap();
        assert_eq!(json["average_score"], 95);
        assert_eq!(json["pass_rate"], 100);
        assert_eq!(json["score_distribution"][5]["range"], "91-100");
        assert_eq!(json["score_distribution"][5]["count"], 1);
    }

    #[test]
    fn trend_groups_by_day_ascending() {
        let records = vec![
            record("late", Some(80), Some(Recommendation::Pass), vec![], 20),
            record("early-1", Some(90), Some(Recommendation::Pass), vec![], 5),
            record("early-2", Some(70), Some(Recommendation::Pass), vec![], 5),
            record("ungraded", None, None, vec![], 5),
        ];
        let metrics = compute_metrics(&records);
        assert_eq!(metrics.trend.len(), 2);
        assert_eq!(metrics.trend[0].date, "2026-08-05");
        assert_eq!(metrics.trend[0].average_score, 80);
        assert_eq!(metrics.trend[0].graded, 2);
        assert_eq!(metrics.trend[1].date, "2026-08-20");
        assert_eq!(metrics.trend[1].average_score, 80);
    }
}
