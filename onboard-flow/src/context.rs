use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;

/// Key under which the resume step leaves the parsed resume.
pub const RESUME_DATA_KEY: &str = "resumeData";

/// Reserved for the job-description step once it talks to a real backend.
pub const JOB_DESCRIPTION_DATA_KEY: &str = "jobDescriptionData";

/// Handoff context carried from one wizard step to the next.
///
/// Cloning is cheap and every clone sees the same entries. Values are only
/// ever replaced by a later write under the same key; there is no expiry.
#[derive(Clone, Debug)]
pub struct HandoffContext {
    data: Arc<DashMap<String, Value>>,
}

impl HandoffContext {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl serde::Serialize) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.data.insert(key.into(), value);
        Ok(())
    }

    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Raw JSON stored under `key`.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.data.get(key).map(|v| v.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    /// Ordered copy of every entry, for display.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for HandoffContext {
    fn default() -> Self {
        Self::new()
    }
}
