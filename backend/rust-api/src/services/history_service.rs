use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::HistoryError;
use crate::metrics::HISTORY_OPERATIONS_TOTAL;
use crate::models::history::{HistorySnapshot, HistoryView};
use crate::utils::version_history::VersionHistory;

lazy_static! {
    static ref COURSE_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap();
}

/// Durable storage for per-course history snapshots.
#[async_trait]
pub trait HistoryPersister: Send + Sync {
    async fn load(&self, course_id: &str) -> Result<Option<HistorySnapshot>, HistoryError>;
    async fn save(&self, course_id: &str, snapshot: &HistorySnapshot) -> Result<(), HistoryError>;
}

#[derive(Default)]
pub struct MemoryPersister {
    snapshots: std::sync::Mutex<HashMap<String, HistorySnapshot>>,
}

impl MemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryPersister for MemoryPersister {
    async fn load(&self, course_id: &str) -> Result<Option<HistorySnapshot>, HistoryError> {
        let snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(snapshots.get(course_id).cloned())
    }

    async fn save(&self, course_id: &str, snapshot: &HistorySnapshot) -> Result<(), HistoryError> {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        snapshots.insert(course_id.to_string(), snapshot.clone());
        Ok(())
    }
}

/// One `<course_id>.json` file per course under `dir`.
pub struct JsonFilePersister {
    dir: PathBuf,
}

impl JsonFilePersister {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, course_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", course_id))
    }
}

#[async_trait]
impl HistoryPersister for JsonFilePersister {
    async fn load(&self, course_id: &str) -> Result<Option<HistorySnapshot>, HistoryError> {
        let path = self.path_for(course_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, course_id: &str, snapshot: &HistorySnapshot) -> Result<(), HistoryError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(course_id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Undo/redo histories for course editor states, loaded lazily and written
/// through to the persister. A change is applied in memory only once it has
/// been saved.
pub struct HistoryService {
    persister: Arc<dyn HistoryPersister>,
    max_entries: usize,
    histories: Mutex<HashMap<String, VersionHistory<Value>>>,
}

impl HistoryService {
    pub fn new(persister: Arc<dyn HistoryPersister>, max_entries: usize) -> Self {
        Self {
            persister,
            max_entries,
            histories: Mutex::new(HashMap::new()),
        }
    }

    pub async fn view(&self, course_id: &str) -> Result<HistoryView, HistoryError> {
        validate_course_id(course_id)?;
        let mut histories = self.histories.lock().await;
        let history = self.entry(&mut histories, course_id).await?;
        Ok(view_of(course_id, history))
    }

    pub async fn push(&self, course_id: &str, state: Value) -> Result<HistoryView, HistoryError> {
        validate_course_id(course_id)?;
        let mut histories = self.histories.lock().await;
        let history = self.entry(&mut histories, course_id).await?;
        let mut next = history.clone();
        next.push(state);
        self.persist(course_id, &next, "push").await?;
        *history = next;
        Ok(view_of(course_id, history))
    }

    pub async fn undo(&self, course_id: &str) -> Result<HistoryView, HistoryError> {
        validate_course_id(course_id)?;
        let mut histories = self.histories.lock().await;
        let history = self.entry(&mut histories, course_id).await?;
        let mut next = history.clone();
        if next.undo().is_none() {
            HISTORY_OPERATIONS_TOTAL
                .with_label_values(&["undo", "empty"])
                .inc();
            return Err(HistoryError::NothingToUndo(course_id.to_string()));
        }
        self.persist(course_id, &next, "undo").await?;
        *history = next;
        Ok(view_of(course_id, history))
    }

    pub async fn redo(&self, course_id: &str) -> Result<HistoryView, HistoryError> {
        validate_course_id(course_id)?;
        let mut histories = self.histories.lock().await;
        let history = self.entry(&mut histories, course_id).await?;
        let mut next = history.clone();
        if next.redo().is_none() {
            HISTORY_OPERATIONS_TOTAL
                .with_label_values(&["redo", "empty"])
                .inc();
            return Err(HistoryError::NothingToRedo(course_id.to_string()));
        }
        self.persist(course_id, &next, "redo").await?;
        *history = next;
        Ok(view_of(course_id, history))
    }

    async fn entry<'a>(
        &self,
        histories: &'a mut HashMap<String, VersionHistory<Value>>,
        course_id: &str,
    ) -> Result<&'a mut VersionHistory<Value>, HistoryError> {
        if !histories.contains_key(course_id) {
            let history = match self.persister.load(course_id).await? {
                Some(snapshot) => {
                    tracing::debug!("Loaded history for course={}", course_id);
                    VersionHistory::from_parts(
                        snapshot.past,
                        snapshot.present,
                        snapshot.future,
                        self.max_entries,
                    )
                }
                None => VersionHistory::new(self.max_entries),
            };
            histories.insert(course_id.to_string(), history);
        }
        histories
            .get_mut(course_id)
            .ok_or_else(|| HistoryError::InvalidCourseId(course_id.to_string()))
    }

    async fn persist(
        &self,
        course_id: &str,
        history: &VersionHistory<Value>,
        operation: &str,
    ) -> Result<(), HistoryError> {
        let (past, present, future) = history.parts();
        let snapshot = HistorySnapshot {
            past,
            present,
            future,
        };
        match self.persister.save(course_id, &snapshot).await {
            Ok(()) => {
                HISTORY_OPERATIONS_TOTAL
                    .with_label_values(&[operation, "success"])
                    .inc();
                Ok(())
            }
            Err(e) => {
                HISTORY_OPERATIONS_TOTAL
                    .with_label_values(&[operation, "error"])
                    .inc();
                tracing::error!("Failed to persist history for course={}: {}", course_id, e);
                Err(e)
            }
        }
    }
}

fn validate_course_id(course_id: &str) -> Result<(), HistoryError> {
    if COURSE_ID_REGEX.is_match(course_id) {
        Ok(())
    } else {
        Err(HistoryError::InvalidCourseId(course_id.to_string()))
    }
}

fn view_of(course_id: &str, history: &VersionHistory<Value>) -> HistoryView {
    HistoryView {
        course_id: course_id.to_string(),
        current: history.current().cloned(),
        can_undo: history.can_undo(),
        can_redo: history.can_redo(),
        undo_depth: history.undo_depth(),
        redo_depth: history.redo_depth(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory_service() -> HistoryService {
        HistoryService::new(Arc::new(MemoryPersister::new()), 5)
    }

    /// Accepts writes until `fail` is flipped, then rejects them.
    #[derive(Default)]
    struct FlakyPersister {
        inner: MemoryPersister,
        fail: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl HistoryPersister for FlakyPersister {
        async fn load(&self, course_id: &str) -> Result<Option<HistorySnapshot>, HistoryError> {
            self.inner.load(course_id).await
        }

        async fn save(&self, course_id: &str, snapshot: &HistorySnapshot) -> Result<(), HistoryError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.save(course_id, snapshot).await
        }
    }

    #[tokio::test]
    async fn push_undo_redo_round_trip() {
        let service = memory_service();
        service.push("course-1", json!({"title": "v1"})).await.unwrap();
        service.push("course-1", json!({"title": "v2"})).await.unwrap();

        let view = service.undo("course-1").await.unwrap();
        assert_eq!(view.current, Some(json!({"title": "v1"})));
        assert!(view.can_redo);

        let view = service.redo("course-1").await.unwrap();
        assert_eq!(view.current, Some(json!({"title": "v2"})));
        assert!(!view.can_redo);
    }

    #[tokio::test]
    async fn undo_on_fresh_course_is_error() {
        let service = memory_service();
        let err = service.undo("course-1").await.unwrap_err();
        assert!(matches!(err, HistoryError::NothingToUndo(_)));
    }

    #[tokio::test]
    async fn courses_are_isolated() {
        let service = memory_service();
        service.push("a", json!(1)).await.unwrap();
        service.push("a", json!(2)).await.unwrap();
        service.push("b", json!(10)).await.unwrap();

        let b = service.view("b").await.unwrap();
        assert_eq!(b.undo_depth, 0);
        assert_eq!(b.current, Some(json!(10)));
    }

    #[tokio::test]
    async fn rejects_path_like_course_ids() {
        let service = memory_service();
        let err = service.push("../etc", json!(1)).await.unwrap_err();
        assert!(matches!(err, HistoryError::InvalidCourseId(_)));
    }

    #[tokio::test]
    async fn history_survives_restart_via_json_files() {
        let dir = tempfile::tempdir().unwrap();

        let service = HistoryService::new(Arc::new(JsonFilePersister::new(dir.path())), 5);
        for i in 0..8 {
            service.push("course-1", json!({ "rev": i })).await.unwrap();
        }
        service.undo("course-1").await.unwrap();

        let restarted = HistoryService::new(Arc::new(JsonFilePersister::new(dir.path())), 5);
        let view = restarted.view("course-1").await.unwrap();
        assert_eq!(view.current, Some(json!({ "rev": 6 })));
        assert_eq!(view.undo_depth, 4);
        assert_eq!(view.redo_depth, 1);
    }

    #[tokio::test]
    async fn failed_save_leaves_history_unchanged() {
        let persister = Arc::new(FlakyPersister::default());
        let service = HistoryService::new(persister.clone(), 5);
        service.push("course-1", json!({"title": "v1"})).await.unwrap();
        service.push("course-1", json!({"title": "v2"})).await.unwrap();
        service.undo("course-1").await.unwrap();

        persister
            .fail
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let err = service.push("course-1", json!({"title": "v3"})).await.unwrap_err();
        assert!(matches!(err, HistoryError::Storage(_)));
        assert!(service.undo("course-1").await.is_err());
        assert!(service.redo("course-1").await.is_err());

        let view = service.view("course-1").await.unwrap();
        assert_eq!(view.current, Some(json!({"title": "v1"})));
        assert_eq!(view.undo_depth, 0);
        assert_eq!(view.redo_depth, 1);

        persister
            .fail
            .store(false, std::sync::atomic::Ordering::SeqCst);
        let view = service.redo("course-1").await.unwrap();
        assert_eq!(view.current, Some(json!({"title": "v2"})));
    }

    #[tokio::test]
    async fn failed_first_push_leaves_course_empty() {
        let persister = Arc::new(FlakyPersister::default());
        persister
            .fail
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let service = HistoryService::new(persister, 5);

        assert!(service.push("course-1", json!(1)).await.is_err());

        let view = service.view("course-1").await.unwrap();
        assert_eq!(view.current, None);
        assert!(!view.can_undo);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("course-1.json"), b"not json").unwrap();

        let service = HistoryService::new(Arc::new(JsonFilePersister::new(dir.path())), 5);
        let err = service.view("course-1").await.unwrap_err();
        assert!(matches!(err, HistoryError::Corrupt(_)));
    }
}
