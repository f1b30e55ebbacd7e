use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub text: String,
    #[serde(rename = "isBot", alias = "is_bot", default)]
    pub is_bot: bool,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_bot: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_bot: true,
        }
    }
}

/// Body of `POST /api/messages/`.
#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub text: &'a str,
}

/// Body returned by `POST /api/parse-resume/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResumeResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub data: Value,
}
