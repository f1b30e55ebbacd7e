//! The remote side of the wizard and the chat: resume parsing and chat replies.

use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    config::FlowConfig,
    error::{FlowError, Result},
    models::{ChatEntry, MessageRequest, ParseResumeResponse},
    validation::DroppedFile,
};

pub const PARSE_RESUME_PATH: &str = "/api/parse-resume/";
pub const MESSAGES_PATH: &str = "/api/messages/";

/// Multipart field the resume travels in.
pub const RESUME_FIELD: &str = "resume";

#[async_trait]
pub trait OnboardingBackend: Send + Sync {
    /// Upload a resume and return the parsed `data` payload.
    async fn parse_resume(&self, file: &DroppedFile) -> Result<Value>;

    /// Send one chat message and return every entry the backend answered with.
    async fn send_message(&self, text: &str) -> Result<Vec<ChatEntry>>;
}

/// [`OnboardingBackend`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &FlowConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl OnboardingBackend for HttpBackend {
    async fn parse_resume(&self, file: &DroppedFile) -> Result<Value> {
        let url = self.url(PARSE_RESUME_PATH);
        info!(file = %file.name, size = file.size(), "Uploading resume to {}", url);

        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = multipart::Form::new().part(RESUME_FIELD, part);

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Resume parsing failed with status {}: {}", status, body);
            return Err(FlowError::Transport(format!(
                "Failed to parse resume (status {})",
                status.as_u16()
            )));
        }

        let parsed: ParseResumeResponse = response.json().await?;
        if let Some(message) = &parsed.message {
            debug!("Backend says: {}", message);
        }
        Ok(parsed.data)
    }

    async fn send_message(&self, text: &str) -> Result<Vec<ChatEntry>> {
        let url = self.url(MESSAGES_PATH);
        debug!("Posting chat message to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&MessageRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Chat exchange failed with status {}", status);
            return Err(FlowError::Transport(format!(
                "Chat request failed (status {})",
                status.as_u16()
            )));
        }

        Ok(response.json::<Vec<ChatEntry>>().await?)
    }
}
