use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::api::{ApiClient, ApiError, item_body};
use crate::io::recovery;
use crate::ops::reorder::ParentChange;

/// The only boundary between the hierarchy and the backend: tell the
/// backend that a leaf item now belongs to another container.
pub trait PersistenceAdapter: Send + Sync {
    fn update_parent(&self, change: &ParentChange) -> Result<(), ApiError>;
}

/// Persists parent changes with `PUT /tasks/{id}` or `PUT /stories/{id}`.
pub struct HttpPersistence {
    client: ApiClient,
}

impl HttpPersistence {
    pub fn new(client: ApiClient) -> Self {
        HttpPersistence { client }
    }
}

impl PersistenceAdapter for HttpPersistence {
    fn update_parent(&self, change: &ParentChange) -> Result<(), ApiError> {
        self.client.update_item(change.to, &change.item)
    }
}

/// In-memory adapter that records every call. Optionally fails them all.
#[derive(Default)]
pub struct MemoryPersistence {
    calls: Mutex<Vec<ParentChange>>,
    fail_with: Option<String>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// An adapter whose every call fails with a transport error.
    pub fn failing(message: impl Into<String>) -> Self {
        MemoryPersistence {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    pub fn calls(&self) -> Vec<ParentChange> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl PersistenceAdapter for MemoryPersistence {
    fn update_parent(&self, change: &ParentChange) -> Result<(), ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(change.clone());
        }
        match &self.fail_with {
            Some(message) => Err(ApiError::Transport {
                url: "memory://".to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// How a background parent update ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    Failed(String),
}

/// Handle on a detached parent update. Dropping it leaves the update
/// running; `wait` blocks until it has finished.
pub struct PendingSync {
    handle: JoinHandle<SyncOutcome>,
}

impl PendingSync {
    pub fn wait(self) -> SyncOutcome {
        self.handle
            .join()
            .unwrap_or_else(|_| SyncOutcome::Failed("persistence thread panicked".to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Fire the parent update on its own thread. Failures are logged and, when
/// `failure_log` names a board directory, appended to its recovery log.
/// Nothing is retried and local state is never rolled back.
pub fn spawn_parent_update(
    adapter: Arc<dyn PersistenceAdapter>,
    change: ParentChange,
    failure_log: Option<PathBuf>,
) -> PendingSync {
    let handle = thread::spawn(move || match adapter.update_parent(&change) {
        Ok(()) => {
            tracing::debug!(item = change.item.id, to = %change.to, "parent change persisted");
            SyncOutcome::Synced
        }
        Err(e) => {
            tracing::warn!(
                item = change.item.id,
                from = %change.from,
                to = %change.to,
                error = %e,
                "parent change not persisted"
            );
            if let Some(board_dir) = failure_log {
                let body = item_body(change.to, &change.item);
                recovery::log_sync_failure(&board_dir, &change, &e.to_string(), &body);
            }
            SyncOutcome::Failed(e.to_string())
        }
    });
    PendingSync { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::container::ContainerRef;
    use crate::model::item::LeafItem;
    use crate::sync::session::Session;
    use crate::sync::test_server::serve_once;
    use std::time::Duration;
    use tempfile::TempDir;

    fn change() -> ParentChange {
        ParentChange {
            item: LeafItem::new(2, "API", 3.0),
            from: ContainerRef::Phase(10),
            to: ContainerRef::Phase(20),
            index: 0,
        }
    }

    #[test]
    fn memory_adapter_records_calls() {
        let adapter = Arc::new(MemoryPersistence::new());
        let outcome = spawn_parent_update(adapter.clone(), change(), None).wait();
        assert_eq!(outcome, SyncOutcome::Synced);
        assert_eq!(adapter.calls(), vec![change()]);
    }

    #[test]
    fn failure_is_logged_not_raised() {
        let dir = TempDir::new().unwrap();
        let adapter = Arc::new(MemoryPersistence::failing("connection refused"));
        let outcome =
            spawn_parent_update(adapter.clone(), change(), Some(dir.path().to_path_buf())).wait();
        assert!(matches!(outcome, SyncOutcome::Failed(ref m) if m.contains("connection refused")));

        let entries = recovery::read_recovery_entries(dir.path(), None);
        assert_eq!(entries.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&entries[0].body).unwrap();
        assert_eq!(body["phase_id"], 20);
    }

    #[test]
    fn http_adapter_puts_task() {
        let server = serve_once("200 OK", "{}");
        let client = ApiClient::new(
            Session::new(&server.base_url, Some("t".into())),
            Duration::from_secs(5),
        );
        let adapter: Arc<dyn PersistenceAdapter> = Arc::new(HttpPersistence::new(client));
        assert_eq!(
            spawn_parent_update(adapter, change(), None).wait(),
            SyncOutcome::Synced
        );
        let request = server.request();
        assert!(request.starts_with("PUT /tasks/2 "), "{request}");
        assert!(request.contains("\"phase_id\":20"));
    }
}
