//! Upload-and-handoff workflow behind the onboarding wizard.
//!
//! A wizard step is an [`UploadTask`] driven by a [`StepRunner`], which owns
//! the step's [`UploadSession`] state machine. Steps pass data forward through
//! an injected [`HandoffContext`]; [`Route`] fixes the step order. The
//! [`ChatLoop`] is independent of the wizard.

pub mod backend;
pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod handoff;
pub mod models;
pub mod route;
pub mod runner;
pub mod session;
pub mod task;
pub mod tasks;
pub mod validation;

// Re-export commonly used types
pub use backend::{HttpBackend, OnboardingBackend};
pub use chat::{ChatLoop, IgnoreReason, SendOutcome};
pub use config::FlowConfig;
pub use context::{HandoffContext, JOB_DESCRIPTION_DATA_KEY, RESUME_DATA_KEY};
pub use error::{FlowError, Result};
pub use handoff::advance;
pub use models::ChatEntry;
pub use route::{Navigator, Route};
pub use runner::{ReadySignal, StepOutcome, StepRunner};
pub use session::{Submission, TriggerMode, UploadSession, UploadStatus, UploadTicket};
pub use task::{NextAction, StepResult, UploadTask};
pub use tasks::{JobDescriptionTask, ResumeParseTask};
pub use validation::{DroppedFile, Rejection, ValidationOutcome, ValidationPolicy};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    struct JaneDoeBackend;

    #[async_trait]
    impl OnboardingBackend for JaneDoeBackend {
        async fn parse_resume(&self, _file: &DroppedFile) -> Result<Value> {
            Ok(json!({"name": "Jane Doe"}))
        }

        async fn send_message(&self, text: &str) -> Result<Vec<ChatEntry>> {
            Ok(vec![ChatEntry::user(text), ChatEntry::bot("Hi!")])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_wizard_walk() {
        let config = FlowConfig::default();
        let backend: Arc<dyn OnboardingBackend> = Arc::new(JaneDoeBackend);
        let context = HandoffContext::new();
        let mut navigator = Navigator::default();

        navigator.navigate(Route::Landing.next().unwrap());
        assert_eq!(navigator.current(), Route::ResumeParser);

        let resume = StepRunner::new(
            Arc::new(ResumeParseTask::new(backend.clone(), config.advance_delay())),
            config.validation_policy(),
            context.clone(),
        );
        resume
            .drop_files(vec![DroppedFile::new(
                "resume.pdf",
                "application/pdf",
                vec![0; 5 * 1024 * 1024],
            )])
            .await
            .unwrap();

        let StepOutcome::Succeeded {
            ready: Some(signal),
            ..
        } = resume.process().await.unwrap()
        else {
            panic!("resume step should succeed with a ready signal");
        };
        assert_eq!(signal.to, Route::JobDescriptionParser);
        assert_eq!(signal.after, Duration::from_millis(1500));

        tokio::time::sleep(signal.after).await;
        navigator.navigate(signal.to);

        let job_description = StepRunner::new(
            Arc::new(JobDescriptionTask::simulated(config.simulated_upload_delay())),
            config.validation_policy(),
            context.clone(),
        );
        let outcome = job_description
            .drop_files(vec![DroppedFile::new("jd.pdf", "application/pdf", vec![0; 1024])])
            .await
            .unwrap();
        assert!(matches!(outcome, StepOutcome::Succeeded { ready: None, .. }));

        job_description.confirm(&mut navigator).await.unwrap();

        assert_eq!(navigator.current(), Route::Analysis);
        assert_eq!(
            context.get_value(RESUME_DATA_KEY),
            Some(json!({"name": "Jane Doe"}))
        );
        assert!(!context.contains(JOB_DESCRIPTION_DATA_KEY));
    }

    #[tokio::test]
    async fn test_chat_is_independent_of_wizard() {
        let chat = ChatLoop::new(Arc::new(JaneDoeBackend));

        let outcome = chat.send("Hello").await;

        assert_eq!(outcome, SendOutcome::Replied(ChatEntry::bot("Hi!")));
        assert_eq!(chat.transcript().await.len(), 3);
    }
}
