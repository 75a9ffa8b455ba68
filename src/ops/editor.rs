use std::path::PathBuf;
use std::sync::Arc;

use crate::model::config::DropOutsidePolicy;
use crate::model::drag::DragEnd;
use crate::model::project::Project;
use crate::ops::reorder::{DragChange, ReorderError, reorder};
use crate::sync::persistence::{PendingSync, PersistenceAdapter, spawn_parent_update};

/// Result of one drag-end event
pub struct DragOutcome {
    pub change: DragChange,
    /// Background parent update, present only for cross-container moves
    /// made while an adapter is attached
    pub pending: Option<PendingSync>,
}

/// The project editor: holds the hierarchy, applies drags optimistically
/// and hands parent changes to the persistence adapter.
pub struct Editor {
    project: Project,
    adapter: Option<Arc<dyn PersistenceAdapter>>,
    drop_outside: DropOutsidePolicy,
    failure_log: Option<PathBuf>,
}

impl Editor {
    pub fn new(project: Project, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Editor {
            project,
            adapter: Some(adapter),
            drop_outside: DropOutsidePolicy::default(),
            failure_log: None,
        }
    }

    /// An editor that never talks to the backend
    pub fn offline(project: Project) -> Self {
        Editor {
            project,
            adapter: None,
            drop_outside: DropOutsidePolicy::default(),
            failure_log: None,
        }
    }

    pub fn with_drop_outside(mut self, policy: DropOutsidePolicy) -> Self {
        self.drop_outside = policy;
        self
    }

    /// Record failed parent updates in this board directory's recovery log.
    pub fn with_failure_log(mut self, board_dir: PathBuf) -> Self {
        self.failure_log = Some(board_dir);
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    /// Apply a drag-end event. The new hierarchy is in place before this
    /// returns; persistence runs detached and its result never feeds back.
    pub fn on_drag_end(&mut self, drag: &DragEnd) -> Result<DragOutcome, ReorderError> {
        let next = reorder(&self.project, drag, self.drop_outside)?;
        self.project = next.project;

        let pending = match (next.change.parent_change(), &self.adapter) {
            (Some(change), Some(adapter)) => Some(spawn_parent_update(
                Arc::clone(adapter),
                change.clone(),
                self.failure_log.clone(),
            )),
            _ => None,
        };

        Ok(DragOutcome {
            change: next.change,
            pending,
        })
    }
}
