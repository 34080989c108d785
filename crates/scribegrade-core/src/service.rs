//! Grading queue and worker.
//!
//! A single dedicated worker task owns the dequeue side of the queue: at
//! most one job is processed per tick, end to end, which throttles
//! throughput to one in-flight judge call at a time. Producers enqueue from
//! any task; high-priority jobs go to the front, everything else appends
//! (FIFO within a priority band).
//!
//! Known limitations, by design at this stage: queue state lives only in
//! memory (no job survives a process restart) and failed jobs are not
//! retried. Both are documented in DESIGN.md rather than silently papered
//! over.

use crate::config::GradingConfig;
use crate::errors::GradeError;
use crate::escalation::EscalationHook;
use crate::model::{
    ContentType, GradingJob, Priority, QualityGradingNotes, QualityGradingResult, Recommendation,
    UsageUpdate,
};
use crate::providers::judge::JudgeClient;
use crate::rubric::RubricRegistry;
use crate::storage::UsageStore;
use crate::{parser, prompt};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

struct ServiceInner {
    config: GradingConfig,
    judge: Arc<dyn JudgeClient>,
    store: Arc<dyn UsageStore>,
    escalation: Option<Arc<dyn EscalationHook>>,
    queue: Mutex<VecDeque<GradingJob>>,
    /// `<provider>:<model>`, recorded on every successful grading write.
    graded_by: String,
}

/// The grading service. Construct one per host process and hand it to
/// producers by reference; there is no global singleton.
pub struct GradingService {
    inner: Arc<ServiceInner>,
    shutdown: watch::Sender<bool>,
}

impl GradingService {
    /// Build the service and spawn its worker task.
    pub fn start(
        config: GradingConfig,
        judge: Arc<dyn JudgeClient>,
        store: Arc<dyn UsageStore>,
        escalation: Option<Arc<dyn EscalationHook>>,
    ) -> Self {
        let graded_by = format!("{}:{}", judge.provider_name(), config.model);
        let inner = Arc::new(ServiceInner {
            config,
            judge,
            store,
            escalation,
            queue: Mutex::new(VecDeque::new()),
            graded_by,
        });
        let (shutdown, shutdown_rx) = watch::channel(false);
        tokio::spawn(worker_loop(inner.clone(), shutdown_rx));
        Self { inner, shutdown }
    }

    /// Queue a generated document for grading. Non-blocking, fire-and-forget.
    pub fn queue_for_grading(
        &self,
        usage_id: impl Into<String>,
        transcript: impl Into<String>,
        generated_content: impl Into<String>,
        content_type: ContentType,
        priority: Priority,
    ) {
        let job = GradingJob {
            usage_id: usage_id.into(),
            transcript: transcript.into(),
            generated_content: generated_content.into(),
            content_type,
            priority,
        };
        let depth = {
            let mut queue = self.inner.queue.lock().unwrap();
            match job.priority {
                Priority::High => {
                    tracing::debug!(usage_id = %job.usage_id, "high-priority job jumps the queue");
                    queue.push_front(job);
                }
                Priority::Normal | Priority::Low => queue.push_back(job),
            }
            queue.len()
        };
        tracing::debug!(depth, "job queued for grading");
    }

    /// Current queue depth.
    pub fn queue_len(&self) -> usize {
        self.inner.queue.lock().unwrap().len()
    }

    /// Grade synchronously, bypassing the queue. Used for manual grading and
    /// test harnesses; nothing is persisted and no escalation fires.
    pub async fn grade_directly(
        &self,
        transcript: &str,
        generated_content: &str,
        content_type: ContentType,
    ) -> Result<QualityGradingResult, GradeError> {
        grade(&self.inner, transcript, generated_content, content_type).await
    }

    /// Suppress future ticks. In-flight work is not cancelled. Idempotent.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for GradingService {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn worker_loop(inner: Arc<ServiceInner>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(inner.config.tick_interval);
    // A slow judge call must not cause a burst of catch-up ticks.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let job = inner.queue.lock().unwrap().pop_front();
                if let Some(job) = job {
                    process_job(&inner, job).await;
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::debug!("grading worker stopped");
}

/// Render, call the judge, parse. Shared by the worker and `grade_directly`.
async fn grade(
    inner: &ServiceInner,
    transcript: &str,
    generated_content: &str,
    content_type: ContentType,
) -> Result<QualityGradingResult, GradeError> {
    let rubric = RubricRegistry::get(content_type);
    let rendered = prompt::render(rubric, transcript, generated_content);
    let response = inner
        .judge
        .generate(&rendered, &inner.config.judge_options())
        .await
        .map_err(|e| GradeError::Judge(e.to_string()))?;
    if !response.success {
        return Err(GradeError::Judge("judge provider reported failure".to_string()));
    }
    let content = response
        .content
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| GradeError::Judge("judge returned empty content".to_string()))?;
    Ok(parser::parse(content, rubric)?)
}

/// One worker tick: grade the job, persist the outcome, escalate non-pass
/// results. Failures are isolated to this job; the loop keeps going.
async fn process_job(inner: &ServiceInner, job: GradingJob) {
    match grade(inner, &job.transcript, &job.generated_content, job.content_type).await {
        Ok(result) => {
            let update = UsageUpdate {
                quality_score: Some(result.overall_score),
                grading_notes: QualityGradingNotes::from(&result),
                graded_at: Utc::now(),
                graded_by: inner.graded_by.clone(),
            };
            if let Err(e) = inner.store.update(&job.usage_id, &update).await {
                // Not retried at this stage; the record stays ungraded.
                tracing::error!(usage_id = %job.usage_id, error = %e, "failed to persist grading result");
            } else {
                tracing::info!(
                    usage_id = %job.usage_id,
                    score = result.overall_score,
                    recommendation = %result.recommendation,
                    "grading complete"
                );
            }
            // Escalate even when the persist failed, so a non-pass verdict
            // still reaches a human through at least one channel.
            if result.recommendation != Recommendation::Pass {
                if let Some(hook) = &inner.escalation {
                    hook.escalate(&job.usage_id, &result);
                }
            }
        }
        Err(e) => {
            // Fail safe toward human oversight: no verdict is persisted as a
            // forced review_required, never silently dropped.
            tracing::warn!(usage_id = %job.usage_id, error = %e, "grading failed; forcing review_required");
            let update = UsageUpdate {
                quality_score: None,
                grading_notes: QualityGradingNotes::from_error(e.to_string()),
                graded_at: Utc::now(),
                graded_by: "error".to_string(),
            };
            if let Err(e) = inner.store.update(&job.usage_id, &update).await {
                tracing::error!(usage_id = %job.usage_id, error = %e, "failed to persist grading error");
            }
        }
    }
}
