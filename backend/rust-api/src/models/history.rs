use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Persistable form of a course's undo/redo history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub past: Vec<Value>,
    pub present: Option<Value>,
    pub future: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct PushVersionRequest {
    pub state: Value,
}

#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub course_id: String,
    pub current: Option<Value>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
}
