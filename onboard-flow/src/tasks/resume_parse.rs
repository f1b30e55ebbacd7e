use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::{
    backend::OnboardingBackend,
    context::HandoffContext,
    error::Result,
    route::Route,
    session::TriggerMode,
    task::{NextAction, StepResult, UploadTask},
    validation::DroppedFile,
};

/// Step 1: send the resume to the parser and carry its output forward.
pub struct ResumeParseTask {
    backend: Arc<dyn OnboardingBackend>,
    advance_delay: Duration,
}

impl ResumeParseTask {
    pub fn new(backend: Arc<dyn OnboardingBackend>, advance_delay: Duration) -> Self {
        Self {
            backend,
            advance_delay,
        }
    }
}

#[async_trait]
impl UploadTask for ResumeParseTask {
    fn route(&self) -> Route {
        Route::ResumeParser
    }

    fn trigger(&self) -> TriggerMode {
        TriggerMode::Manual
    }

    async fn run(&self, file: &DroppedFile, _context: HandoffContext) -> Result<StepResult> {
        info!("Parsing resume {}", file.name);

        let parsed = self.backend.parse_resume(file).await?;

        Ok(StepResult {
            handoff: Some(parsed.clone()),
            parsed,
            next_action: NextAction::AdvanceAfter(self.advance_delay),
        })
    }
}
