use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::{
    context::HandoffContext,
    error::Result,
    route::Route,
    session::TriggerMode,
    validation::DroppedFile,
};

/// What a step produced for an accepted file.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Kept on the session as its parsed result.
    pub parsed: Value,
    /// Written under the step's handoff key once the session accepts the result.
    pub handoff: Option<Value>,
    pub next_action: NextAction,
}

/// Defines what should happen after a step's upload succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Move to the next step on its own once the delay has passed
    AdvanceAfter(Duration),
    /// Stay until the user asks to continue
    WaitForConfirmation,
}

/// One wizard step's upload behaviour.
#[async_trait]
pub trait UploadTask: Send + Sync {
    /// The page this step lives on
    fn route(&self) -> Route;

    /// Whether an accepted file uploads right away
    fn trigger(&self) -> TriggerMode;

    /// Upload (or pretend to upload) `file`
    async fn run(&self, file: &DroppedFile, context: HandoffContext) -> Result<StepResult>;
}
