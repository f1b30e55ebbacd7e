use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    context::{HandoffContext, RESUME_DATA_KEY},
    error::Result,
    route::Route,
    session::TriggerMode,
    task::{NextAction, StepResult, UploadTask},
    validation::DroppedFile,
};

/// Step 2: the job description upload.
///
/// There is no job-description endpoint yet, so the upload completes after a
/// fixed delay and nothing is handed to the next step.
// TODO: post to the job-description parser once the backend exposes one, with
// the same multipart contract as the resume upload.
pub struct JobDescriptionTask {
    delay: Duration,
}

impl JobDescriptionTask {
    pub fn simulated(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl UploadTask for JobDescriptionTask {
    fn route(&self) -> Route {
        Route::JobDescriptionParser
    }

    fn trigger(&self) -> TriggerMode {
        TriggerMode::Automatic
    }

    async fn run(&self, file: &DroppedFile, context: HandoffContext) -> Result<StepResult> {
        if !context.contains(RESUME_DATA_KEY) {
            warn!("No parsed resume in context; job description will be analysed alone");
        }

        info!(
            "Simulating job description upload of {} ({:?})",
            file.name, self.delay
        );
        tokio::time::sleep(self.delay).await;

        Ok(StepResult {
            parsed: json!({
                "file_name": file.name,
                "size": file.size(),
                "simulated": true,
            }),
            handoff: None,
            next_action: NextAction::WaitForConfirmation,
        })
    }
}
