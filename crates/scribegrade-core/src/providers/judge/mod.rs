//! Judge-model client boundary.
//!
//! The pipeline always requests low-temperature output so verdicts are
//! near-deterministic. `success == false` or empty `content` is treated as a
//! judge-call failure by the caller; no timeout is imposed here beyond what
//! the concrete client applies.

pub mod fake;
pub mod openai;

pub use fake::FakeJudge;
pub use openai::OpenAiJudge;

use async_trait::async_trait;

/// Request options for one grading call.
#[derive(Debug, Clone)]
pub struct JudgeOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Raw outcome of one judge call.
#[derive(Debug, Clone)]
pub struct JudgeResponse {
    pub success: bool,
    pub content: Option<String>,
}

/// A judge-model client. `Err` covers transport-level problems; provider-side
/// refusals surface as `success = false`.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn generate(&self, prompt: &str, options: &JudgeOptions) -> anyhow::Result<JudgeResponse>;

    fn provider_name(&self) -> &'static str;
}
