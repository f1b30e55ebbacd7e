//! Lifecycle of one uploaded document.
//!
//! ```text
//! Idle ──submit──▶ Rejected                     (policy said no)
//! Idle ──submit──▶ Staged ──begin_upload──▶ Uploading      (manual steps)
//! Idle ──submit──▶ Uploading                    (automatic steps)
//! Uploading ──on_backend_success──▶ Succeeded
//! Uploading ──on_backend_failure──▶ Rejected
//! any ──clear──▶ Idle
//! ```
//!
//! `Rejected` accepts a fresh `submit` the same way `Idle` does. Every
//! upload start and every `clear` bumps the session generation; a backend
//! response carrying an older generation is refused with
//! [`FlowError::StaleResponse`] instead of being applied.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{FlowError, Result},
    route::Route,
    validation::{DroppedFile, Rejection, ValidationPolicy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Idle,
    Staged,
    Rejected,
    Uploading,
    Succeeded,
}

/// Whether an accepted file uploads on its own or waits for "process".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    Manual,
    Automatic,
}

#[derive(Debug, Clone)]
enum SessionState {
    Idle,
    Staged { file: Arc<DroppedFile> },
    Rejected { reason: Rejection },
    Uploading { file: Arc<DroppedFile> },
    Succeeded { file: Arc<DroppedFile>, parsed: Value },
}

/// Identifies one in-flight upload. Hand it back with the backend's answer.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub session_id: Uuid,
    pub generation: u64,
    pub file: Arc<DroppedFile>,
}

/// Result of a `submit` call.
#[derive(Debug, Clone)]
pub enum Submission {
    Rejected(Rejection),
    Staged,
    Started(UploadTicket),
}

#[derive(Debug, Clone)]
pub struct UploadSession {
    id: Uuid,
    route: Route,
    trigger: TriggerMode,
    policy: ValidationPolicy,
    state: SessionState,
    generation: u64,
}

impl UploadSession {
    pub fn new(route: Route, trigger: TriggerMode, policy: ValidationPolicy) -> Self {
        let id = Uuid::new_v4();
        debug!(session_id = %id, step = route.path(), "Created upload session");
        Self {
            id,
            route,
            trigger,
            policy,
            state: SessionState::Idle,
            generation: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn trigger(&self) -> TriggerMode {
        self.trigger
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> UploadStatus {
        match self.state {
            SessionState::Idle => UploadStatus::Idle,
            SessionState::Staged { .. } => UploadStatus::Staged,
            SessionState::Rejected { .. } => UploadStatus::Rejected,
            SessionState::Uploading { .. } => UploadStatus::Uploading,
            SessionState::Succeeded { .. } => UploadStatus::Succeeded,
        }
    }

    pub fn file(&self) -> Option<&DroppedFile> {
        match &self.state {
            SessionState::Staged { file }
            | SessionState::Uploading { file }
            | SessionState::Succeeded { file, .. } => Some(file.as_ref()),
            SessionState::Idle | SessionState::Rejected { .. } => None,
        }
    }

    pub fn parsed_result(&self) -> Option<&Value> {
        match &self.state {
            SessionState::Succeeded { parsed, .. } => Some(parsed),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self.state {
            SessionState::Rejected { reason } => Some(reason),
            _ => None,
        }
    }

    /// Status line for the current state, if the page shows one.
    pub fn display_message(&self) -> Option<String> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Staged { file } => {
                Some(format!("{} ({}) ready to process", file.name, file.display_size()))
            }
            SessionState::Rejected { reason } => Some(reason.message().to_string()),
            SessionState::Uploading { .. } => Some("Processing...".to_string()),
            SessionState::Succeeded { .. } => Some(match self.route {
                Route::JobDescriptionParser => "Job description uploaded successfully".to_string(),
                _ => "Resume uploaded successfully".to_string(),
            }),
        }
    }

    /// Apply the validation policy to a drop gesture.
    pub fn submit(&mut self, files: Vec<DroppedFile>) -> Result<Submission> {
        if !matches!(
            self.state,
            SessionState::Idle | SessionState::Rejected { .. }
        ) {
            return Err(self.invalid("submit a file"));
        }

        let file = match self.policy.accept_drop(files) {
            Ok(file) => Arc::new(file),
            Err(err) => {
                warn!(session_id = %self.id, reason = ?err.kind, "Rejected drop: {}", err.message);
                self.state = SessionState::Rejected { reason: err.kind };
                return Ok(Submission::Rejected(err.kind));
            }
        };

        info!(
            session_id = %self.id,
            file = %file.name,
            size = file.size(),
            "Accepted file"
        );

        match self.trigger {
            TriggerMode::Manual => {
                self.state = SessionState::Staged { file };
                Ok(Submission::Staged)
            }
            TriggerMode::Automatic => Ok(Submission::Started(self.start_upload(file))),
        }
    }

    /// The explicit "process" action of manual steps.
    pub fn begin_upload(&mut self) -> Result<UploadTicket> {
        let file = match &self.state {
            SessionState::Staged { file } => file.clone(),
            _ => return Err(self.invalid("begin an upload")),
        };
        Ok(self.start_upload(file))
    }

    pub fn on_backend_success(&mut self, ticket: &UploadTicket, parsed: Value) -> Result<()> {
        self.check_ticket(ticket)?;
        let file = match &self.state {
            SessionState::Uploading { file } => file.clone(),
            _ => return Err(self.invalid("complete an upload")),
        };

        info!(session_id = %self.id, generation = ticket.generation, "Upload succeeded");
        self.state = SessionState::Succeeded { file, parsed };
        Ok(())
    }

    pub fn on_backend_failure(&mut self, ticket: &UploadTicket, cause: &str) -> Result<()> {
        self.check_ticket(ticket)?;
        if !matches!(self.state, SessionState::Uploading { .. }) {
            return Err(self.invalid("fail an upload"));
        }

        warn!(session_id = %self.id, generation = ticket.generation, "Upload failed: {}", cause);
        self.state = SessionState::Rejected {
            reason: Rejection::UploadFailed,
        };
        Ok(())
    }

    /// Back to `Idle` from anywhere. Any outstanding response is detached.
    pub fn clear(&mut self) {
        self.generation += 1;
        if !matches!(self.state, SessionState::Idle) {
            debug!(session_id = %self.id, from = ?self.status(), "Cleared upload session");
        }
        self.state = SessionState::Idle;
    }

    fn start_upload(&mut self, file: Arc<DroppedFile>) -> UploadTicket {
        self.generation += 1;
        self.state = SessionState::Uploading { file: file.clone() };
        info!(session_id = %self.id, generation = self.generation, "Upload started");

        UploadTicket {
            session_id: self.id,
            generation: self.generation,
            file,
        }
    }

    fn check_ticket(&self, ticket: &UploadTicket) -> Result<()> {
        if ticket.session_id != self.id || ticket.generation != self.generation {
            debug!(
                session_id = %self.id,
                expected = self.generation,
                got = ticket.generation,
                "Dropping stale backend response"
            );
            return Err(FlowError::StaleResponse {
                expected: self.generation,
                got: ticket.generation,
            });
        }
        Ok(())
    }

    fn invalid(&self, operation: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            from: self.status(),
            operation,
        }
    }
}
