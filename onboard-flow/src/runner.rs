//! StepRunner – ties one wizard step's [`UploadSession`] to its [`UploadTask`].
//!
//! The session sits behind a shared async mutex so the page (or any other
//! caller) can read it or `clear()` it while an upload is in flight. The lock
//! is never held across the upload itself; the result is applied afterwards
//! through the session's ticket check, so an upload that finishes after a
//! clear is reported as [`StepOutcome::Detached`] and changes nothing.
//!
//! Navigation is left to the caller: a successful step that wants to move on
//! returns a [`ReadySignal`] naming the destination and the delay, and the
//! caller decides when to act on it.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    context::HandoffContext,
    error::{FlowError, Result},
    handoff,
    route::{Navigator, Route},
    session::{Submission, UploadSession, UploadStatus, UploadTicket},
    task::{NextAction, UploadTask},
    validation::{DroppedFile, Rejection, ValidationPolicy},
};

/// The step is done and would like to move to `to` once `after` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadySignal {
    pub to: Route,
    pub after: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The drop gesture failed validation
    Rejected(Rejection),
    /// The file is held until `process()` is called
    Staged,
    Succeeded {
        parsed: Value,
        ready: Option<ReadySignal>,
    },
    /// The upload itself failed
    Failed(Rejection),
    /// The session was cleared before the upload finished
    Detached,
}

#[derive(Clone)]
pub struct StepRunner {
    session: Arc<Mutex<UploadSession>>,
    task: Arc<dyn UploadTask>,
    context: HandoffContext,
}

impl StepRunner {
    pub fn new(task: Arc<dyn UploadTask>, policy: ValidationPolicy, context: HandoffContext) -> Self {
        let session = UploadSession::new(task.route(), task.trigger(), policy);
        Self {
            session: Arc::new(Mutex::new(session)),
            task,
            context,
        }
    }

    pub fn route(&self) -> Route {
        self.task.route()
    }

    pub fn context(&self) -> &HandoffContext {
        &self.context
    }

    /// Copy of the session as it is right now.
    pub async fn snapshot(&self) -> UploadSession {
        self.session.lock().await.clone()
    }

    pub async fn status(&self) -> UploadStatus {
        self.session.lock().await.status()
    }

    /// A drop gesture on the step's drop target.
    pub async fn drop_files(&self, files: Vec<DroppedFile>) -> Result<StepOutcome> {
        let submission = self.session.lock().await.submit(files)?;

        match submission {
            Submission::Rejected(reason) => Ok(StepOutcome::Rejected(reason)),
            Submission::Staged => Ok(StepOutcome::Staged),
            Submission::Started(ticket) => self.run_upload(ticket).await,
        }
    }

    /// The "process" button of manual steps.
    pub async fn process(&self) -> Result<StepOutcome> {
        let ticket = self.session.lock().await.begin_upload()?;
        self.run_upload(ticket).await
    }

    pub async fn clear(&self) {
        self.session.lock().await.clear();
    }

    /// The "continue to next step" button. Only valid once the upload succeeded.
    pub async fn confirm(&self, navigator: &mut Navigator) -> Result<Route> {
        let status = self.session.lock().await.status();
        if status != UploadStatus::Succeeded {
            return Err(FlowError::InvalidTransition {
                from: status,
                operation: "continue to the next step",
            });
        }
        handoff::advance(&self.context, navigator, self.route(), None)
    }

    async fn run_upload(&self, ticket: UploadTicket) -> Result<StepOutcome> {
        let result = self.task.run(&ticket.file, self.context.clone()).await;

        let mut session = self.session.lock().await;
        match result {
            Ok(step) => {
                match session.on_backend_success(&ticket, step.parsed.clone()) {
                    Ok(()) => {}
                    Err(FlowError::StaleResponse { .. }) => return Ok(StepOutcome::Detached),
                    Err(e) => return Err(e),
                }

                if let Some(payload) = step.handoff {
                    let key = self.route().handoff_key().ok_or_else(|| {
                        FlowError::Context(format!("{} has no handoff key", self.route().path()))
                    })?;
                    self.context.set(key, payload)?;
                    info!(session_id = %ticket.session_id, key, "Stored handoff payload");
                }

                let ready = match step.next_action {
                    NextAction::AdvanceAfter(after) => {
                        self.route().next().map(|to| ReadySignal { to, after })
                    }
                    NextAction::WaitForConfirmation => None,
                };

                Ok(StepOutcome::Succeeded {
                    parsed: step.parsed,
                    ready,
                })
            }
            Err(err) => match session.on_backend_failure(&ticket, &err.to_string()) {
                Ok(()) => Ok(StepOutcome::Failed(Rejection::UploadFailed)),
                Err(FlowError::StaleResponse { .. }) => {
                    warn!(session_id = %ticket.session_id, "Upload failed after the session was cleared: {}", err);
                    Ok(StepOutcome::Detached)
                }
                Err(e) => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OnboardingBackend;
    use crate::context::RESUME_DATA_KEY;
    use crate::models::ChatEntry;
    use crate::tasks::{JobDescriptionTask, ResumeParseTask};
    use crate::validation::PDF_MIME;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    /// Answers resume uploads with a fixed payload, optionally waiting for a
    /// signal first so tests can act while the upload is in flight.
    struct StubBackend {
        reply: Option<Value>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl OnboardingBackend for StubBackend {
        async fn parse_resume(&self, _file: &DroppedFile) -> Result<Value> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.reply
                .clone()
                .ok_or_else(|| FlowError::Transport("status 500".to_string()))
        }

        async fn send_message(&self, _text: &str) -> Result<Vec<ChatEntry>> {
            Ok(Vec::new())
        }
    }

    fn resume_runner(backend: StubBackend) -> StepRunner {
        let task = ResumeParseTask::new(Arc::new(backend), Duration::from_millis(1500));
        StepRunner::new(
            Arc::new(task),
            ValidationPolicy::default(),
            HandoffContext::new(),
        )
    }

    fn pdf(size: usize) -> DroppedFile {
        DroppedFile::new("resume.pdf", PDF_MIME, vec![0u8; size])
    }

    #[tokio::test]
    async fn test_resume_step_success_hands_off_and_signals() {
        let runner = resume_runner(StubBackend {
            reply: Some(json!({"name": "Jane Doe"})),
            gate: None,
        });

        assert_eq!(
            runner.drop_files(vec![pdf(5 * 1024 * 1024)]).await.unwrap(),
            StepOutcome::Staged
        );
        assert!(!runner.context().contains(RESUME_DATA_KEY));

        let outcome = runner.process().await.unwrap();

        assert_eq!(
            outcome,
            StepOutcome::Succeeded {
                parsed: json!({"name": "Jane Doe"}),
                ready: Some(ReadySignal {
                    to: Route::JobDescriptionParser,
                    after: Duration::from_millis(1500),
                }),
            }
        );
        assert_eq!(runner.status().await, UploadStatus::Succeeded);
        assert_eq!(
            runner.context().get_value(RESUME_DATA_KEY),
            Some(json!({"name": "Jane Doe"}))
        );
    }

    #[tokio::test]
    async fn test_resume_step_failure_rejects_and_keeps_context_empty() {
        let runner = resume_runner(StubBackend {
            reply: None,
            gate: None,
        });

        runner.drop_files(vec![pdf(1024)]).await.unwrap();
        let outcome = runner.process().await.unwrap();

        assert_eq!(outcome, StepOutcome::Failed(Rejection::UploadFailed));
        let session = runner.snapshot().await;
        assert_eq!(session.status(), UploadStatus::Rejected);
        assert!(session.parsed_result().is_none());
        assert!(runner.context().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_process_without_staged_file_is_invalid() {
        let runner = resume_runner(StubBackend {
            reply: Some(json!({})),
            gate: None,
        });

        let err = runner.process().await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidTransition {
                from: UploadStatus::Idle,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_clear_while_uploading_detaches_response() {
        let gate = Arc::new(Notify::new());
        let runner = resume_runner(StubBackend {
            reply: Some(json!({"name": "Jane Doe"})),
            gate: Some(gate.clone()),
        });
        runner.drop_files(vec![pdf(1024)]).await.unwrap();

        let in_flight = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.process().await })
        };

        while runner.status().await != UploadStatus::Uploading {
            tokio::task::yield_now().await;
        }
        runner.clear().await;
        gate.notify_one();

        let outcome = in_flight.await.unwrap().unwrap();
        assert_eq!(outcome, StepOutcome::Detached);

        let session = runner.snapshot().await;
        assert_eq!(session.status(), UploadStatus::Idle);
        assert!(session.file().is_none());
        assert!(session.parsed_result().is_none());
        assert!(!runner.context().contains(RESUME_DATA_KEY));
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_description_uploads_on_drop_and_waits_for_confirmation() {
        let context = HandoffContext::new();
        let runner = StepRunner::new(
            Arc::new(JobDescriptionTask::simulated(Duration::from_secs(2))),
            ValidationPolicy::default(),
            context.clone(),
        );
        let mut navigator = Navigator::new(Route::JobDescriptionParser);

        let outcome = runner
            .drop_files(vec![DroppedFile::new("jd.pdf", PDF_MIME, vec![1; 64])])
            .await
            .unwrap();

        let StepOutcome::Succeeded { parsed, ready } = outcome else {
            panic!("expected the simulated upload to succeed");
        };
        assert_eq!(parsed["simulated"], json!(true));
        assert!(ready.is_none());
        assert!(context.snapshot().is_empty());

        let next = runner.confirm(&mut navigator).await.unwrap();
        assert_eq!(next, Route::Analysis);
        assert_eq!(navigator.current(), Route::Analysis);
    }

    #[tokio::test]
    async fn test_confirm_before_success_is_invalid() {
        let runner = resume_runner(StubBackend {
            reply: Some(json!({})),
            gate: None,
        });
        let mut navigator = Navigator::new(Route::ResumeParser);

        assert!(runner.confirm(&mut navigator).await.is_err());
        assert_eq!(navigator.current(), Route::ResumeParser);
    }

    #[tokio::test]
    async fn test_rejected_drop_never_reaches_backend() {
        let runner = resume_runner(StubBackend {
            reply: None,
            gate: Some(Arc::new(Notify::new())),
        });

        let outcome = runner
            .drop_files(vec![DroppedFile::new("photo.png", "image/png", vec![0; 8])])
            .await
            .unwrap();

        assert_eq!(outcome, StepOutcome::Rejected(Rejection::WrongType));
        assert_eq!(
            runner.snapshot().await.display_message().as_deref(),
            Some("Please upload a valid PDF file")
        );
    }
}
