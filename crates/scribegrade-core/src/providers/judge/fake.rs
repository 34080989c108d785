//! Canned-response judge for tests and offline runs.

use super::{JudgeClient, JudgeOptions, JudgeResponse};
use async_trait::async_trait;
use std::sync::Mutex;

/// Replays a queue of canned responses, then falls back to a fixed response
/// if one is set. `unavailable()` builds a judge that always reports
/// `success = false` for failure-path tests.
#[derive(Debug, Default)]
pub struct FakeJudge {
    responses: Mutex<Vec<String>>,
    fixed_response: Option<String>,
    unavailable: bool,
}

impl FakeJudge {
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            fixed_response: None,
            unavailable: false,
        }
    }

    pub fn with_fixed_response(response: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fixed_response: Some(response.into()),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fixed_response: None,
            unavailable: true,
        }
    }
}

#[async_trait]
impl JudgeClient for FakeJudge {
    async fn generate(
        &self,
        _prompt: &str,
        _options: &JudgeOptions,
    ) -> anyhow::Result<JudgeResponse> {
        if self.unavailable {
            return Ok(JudgeResponse {
                success: false,
                content: None,
            });
        }
        let mut queued = self.responses.lock().unwrap();
        let text = if queued.is_empty() {
            match &self.fixed_response {
                Some(fixed) => fixed.clone(),
                None => anyhow::bail!("no more fake judge responses"),
            }
        } else {
            queued.remove(0)
        };
        Ok(JudgeResponse {
            success: true,
            content: Some(text),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
