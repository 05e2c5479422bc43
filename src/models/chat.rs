use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// Appended locally, reply not yet received.
    Pending,
    Delivered,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub segment_index: u32,
    pub from_assistant: bool,
    pub content: String,
    pub attachment_paths: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub delivery: Delivery,
}

impl Message {
    pub fn user(segment_index: u32, content: impl Into<String>, attachment_paths: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            segment_index,
            from_assistant: false,
            content: content.into(),
            attachment_paths,
            timestamp: Utc::now(),
            delivery: Delivery::Pending,
        }
    }

    pub fn assistant(segment_index: u32, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            segment_index,
            from_assistant: true,
            content: content.into(),
            attachment_paths: Vec::new(),
            timestamp: Utc::now(),
            delivery: Delivery::Delivered,
        }
    }
}
