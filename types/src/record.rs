use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{InputRotate, WorkflowStatus, keys};

/// A video's workflow record.
///
/// The record is an open JSON object: keys this crate does not know about
/// are carried through untouched, so upstream and downstream steps can add
/// their own fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoRecord(Map<String, Value>);

impl VideoRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a stored record into an incoming one.
    ///
    /// Keys already present on `incoming` keep their value; keys that only
    /// exist in `stored` are copied over. Key order is `incoming` first.
    #[must_use]
    pub fn merge(incoming: Self, stored: Self) -> Self {
        let mut merged = incoming.0;
        for (key, value) in stored.0 {
            merged.entry(key).or_insert(value);
        }
        Self(merged)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Flags are only set when the stored value is the JSON `true`.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Bool(true)))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn remove_all(&mut self, keys: &[&str]) {
        for key in keys {
            self.0.remove(*key);
        }
    }

    #[must_use]
    pub fn guid(&self) -> Option<&str> {
        self.get_str(keys::GUID)
    }

    #[must_use]
    pub fn src_video(&self) -> Option<&str> {
        self.get_str(keys::SRC_VIDEO)
    }

    /// The caller-supplied job template, ignoring empty strings.
    #[must_use]
    pub fn job_template(&self) -> Option<&str> {
        self.get_str(keys::JOB_TEMPLATE).filter(|t| !t.is_empty())
    }

    /// Unknown or missing values read as `None`.
    #[must_use]
    pub fn input_rotate(&self) -> Option<InputRotate> {
        self.get_str(keys::INPUT_ROTATE)
            .and_then(|value| value.parse().ok())
    }

    #[must_use]
    pub fn workflow_status(&self) -> Option<WorkflowStatus> {
        self.get_str(keys::WORKFLOW_STATUS).map(WorkflowStatus::from)
    }
}

impl From<Map<String, Value>> for VideoRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<VideoRecord> for Value {
    fn from(record: VideoRecord) -> Self {
        Self::Object(record.0)
    }
}
