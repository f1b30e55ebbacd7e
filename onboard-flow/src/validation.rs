//! File acceptance rules shared by both wizard steps.
//!
//! The declared MIME type is authoritative; a `.pdf` extension on a file that
//! declares another type is still rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Only MIME type the wizard accepts out of the box.
pub const PDF_MIME: &str = "application/pdf";

/// 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A single file from a drop gesture, as the drop target reported it.
#[derive(Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Size in MiB with two decimals, the way the upload card shows it.
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size() as f64 / (1024.0 * 1024.0))
    }
}

impl fmt::Debug for DroppedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DroppedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size())
            .finish()
    }
}

/// Why a file (or a whole gesture, or an upload) was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rejection {
    WrongType,
    TooLarge,
    MultipleFiles,
    UploadFailed,
}

impl Rejection {
    /// Message shown under the drop target.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::WrongType => "Please upload a valid PDF file",
            Rejection::TooLarge => "File size exceeds 10MB limit",
            Rejection::MultipleFiles => "Please upload a single PDF file",
            Rejection::UploadFailed => "Failed to process the file. Please try again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct ValidationError {
    pub kind: Rejection,
    pub message: String,
}

impl ValidationError {
    fn new(kind: Rejection, message: String) -> Self {
        Self { kind, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accept,
    Reject(ValidationError),
}

impl ValidationOutcome {
    pub fn is_accept(&self) -> bool {
        matches!(self, ValidationOutcome::Accept)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    pub allowed_types: BTreeSet<String>,
    pub max_bytes: u64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allowed_types: BTreeSet::from([PDF_MIME.to_string()]),
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ValidationPolicy {
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Evaluate one file. Type is checked before size.
    pub fn evaluate(&self, mime_type: &str, size: u64) -> ValidationOutcome {
        if !self.allowed_types.contains(mime_type) {
            return ValidationOutcome::Reject(ValidationError::new(
                Rejection::WrongType,
                format!("MIME type '{}' is not allowed", mime_type),
            ));
        }

        if size > self.max_bytes {
            return ValidationOutcome::Reject(ValidationError::new(
                Rejection::TooLarge,
                format!(
                    "File size {} bytes exceeds maximum allowed {} bytes",
                    size, self.max_bytes
                ),
            ));
        }

        ValidationOutcome::Accept
    }

    /// Evaluate a whole drop gesture. Exactly one acceptable file passes and
    /// is handed back; anything else rejects the entire gesture.
    pub fn accept_drop(
        &self,
        files: Vec<DroppedFile>,
    ) -> std::result::Result<DroppedFile, ValidationError> {
        let count = files.len();
        let mut files = files.into_iter();

        match (files.next(), files.next()) {
            (Some(file), None) => match self.evaluate(&file.mime_type, file.size()) {
                ValidationOutcome::Accept => Ok(file),
                ValidationOutcome::Reject(err) => Err(err),
            },
            _ => Err(ValidationError::new(
                Rejection::MultipleFiles,
                format!("Expected exactly one file, got {}", count),
            )),
        }
    }
}
