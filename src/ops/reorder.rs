use crate::model::config::DropOutsidePolicy;
use crate::model::container::{ContainerKind, ContainerRef};
use crate::model::drag::{DragEnd, DropLocation, DroppableId};
use crate::model::item::{EntityId, LeafItem};
use crate::model::project::Project;
use crate::ops::budget::recompute_budget_hours;

/// Error type for drag replay. Destination indices are clamped, never
/// rejected; everything else that can't be resolved against the current
/// hierarchy lands here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReorderError {
    #[error("{0} not found")]
    ContainerNotFound(ContainerRef),
    #[error("source index {index} out of range for {droppable} ({len} entries)")]
    SourceOutOfRange {
        droppable: DroppableId,
        index: usize,
        len: usize,
    },
    #[error("cannot drop from {from} onto {to}")]
    KindMismatch { from: DroppableId, to: DroppableId },
}

/// A leaf item that changed parent and must be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ParentChange {
    /// The item as it now sits in its new container
    pub item: LeafItem,
    pub from: ContainerRef,
    pub to: ContainerRef,
    /// Final index inside `to`
    pub index: usize,
}

/// What a drag did to the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub enum DragChange {
    /// Nothing moved (dropped in place, or a leaf dropped outside)
    Unchanged,
    /// A phase or sprint changed position in its list
    ContainerMoved {
        container: ContainerRef,
        from: usize,
        to: usize,
    },
    /// A phase or sprint was dropped outside and removed
    ContainerRemoved { container: ContainerRef, index: usize },
    /// A leaf item changed position inside its container
    ItemReordered {
        container: ContainerRef,
        item_id: EntityId,
        from: usize,
        to: usize,
    },
    /// A leaf item moved to another container
    ItemMoved(ParentChange),
}

impl DragChange {
    pub fn parent_change(&self) -> Option<&ParentChange> {
        match self {
            DragChange::ItemMoved(change) => Some(change),
            _ => None,
        }
    }
}

/// The hierarchy after a drag, plus what changed
#[derive(Debug, Clone, PartialEq)]
pub struct Reordered {
    pub project: Project,
    pub change: DragChange,
}

/// Replay a drag-end event against `project` without touching it.
pub fn reorder(
    project: &Project,
    drag: &DragEnd,
    policy: DropOutsidePolicy,
) -> Result<Reordered, ReorderError> {
    let mut next = project.clone();
    let change = apply_drag(&mut next, drag, policy)?;
    Ok(Reordered {
        project: next,
        change,
    })
}

/// Replay a drag-end event in place. The project is left untouched when an
/// error is returned.
pub fn apply_drag(
    project: &mut Project,
    drag: &DragEnd,
    policy: DropOutsidePolicy,
) -> Result<DragChange, ReorderError> {
    let source = drag.source;
    let Some(destination) = drag.destination else {
        return drop_outside(project, source, policy);
    };

    let mismatch = || ReorderError::KindMismatch {
        from: source.droppable,
        to: destination.droppable,
    };
    if source.droppable.kind() != destination.droppable.kind() {
        return Err(mismatch());
    }

    match (source.droppable.container(), destination.droppable.container()) {
        (None, None) => move_container(
            project,
            source.droppable.kind(),
            source.index,
            destination.index,
        ),
        (Some(from), Some(to)) if from == to => {
            reorder_items(project, from, source.index, destination.index)
        }
        (Some(from), Some(to)) => move_item(project, from, source.index, to, destination.index),
        _ => Err(mismatch()),
    }
}

fn drop_outside(
    project: &mut Project,
    source: DropLocation,
    policy: DropOutsidePolicy,
) -> Result<DragChange, ReorderError> {
    if source.droppable.container().is_some() || policy == DropOutsidePolicy::Ignore {
        return Ok(DragChange::Unchanged);
    }
    let kind = source.droppable.kind();
    let list = project.containers_mut(kind);
    check_source(source.droppable, source.index, list.len())?;
    let removed = list.remove(source.index);
    Ok(DragChange::ContainerRemoved {
        container: ContainerRef::new(kind, removed.id),
        index: source.index,
    })
}

fn move_container(
    project: &mut Project,
    kind: ContainerKind,
    from: usize,
    to: usize,
) -> Result<DragChange, ReorderError> {
    let list = project.containers_mut(kind);
    check_source(DroppableId::container_list(kind), from, list.len())?;
    let id = list[from].id;
    let to = move_within(list, from, to);
    if to == from {
        return Ok(DragChange::Unchanged);
    }
    Ok(DragChange::ContainerMoved {
        container: ContainerRef::new(kind, id),
        from,
        to,
    })
}

fn reorder_items(
    project: &mut Project,
    container: ContainerRef,
    from: usize,
    to: usize,
) -> Result<DragChange, ReorderError> {
    let target = project
        .find_container_mut(container)
        .ok_or(ReorderError::ContainerNotFound(container))?;
    check_source(DroppableId::items_of(container), from, target.items.len())?;
    let item_id = target.items[from].id;
    let to = move_within(&mut target.items, from, to);
    recompute_budget_hours(target);
    if to == from {
        return Ok(DragChange::Unchanged);
    }
    Ok(DragChange::ItemReordered {
        container,
        item_id,
        from,
        to,
    })
}

fn move_item(
    project: &mut Project,
    from: ContainerRef,
    from_index: usize,
    to: ContainerRef,
    to_index: usize,
) -> Result<DragChange, ReorderError> {
    // Resolve both ends before mutating anything.
    let source_pos = project
        .container_index(from)
        .ok_or(ReorderError::ContainerNotFound(from))?;
    let dest_pos = project
        .container_index(to)
        .ok_or(ReorderError::ContainerNotFound(to))?;

    let list = project.containers_mut(from.kind());
    check_source(
        DroppableId::items_of(from),
        from_index,
        list[source_pos].items.len(),
    )?;

    let item = list[source_pos].items.remove(from_index);
    recompute_budget_hours(&mut list[source_pos]);

    let dest = &mut list[dest_pos];
    let index = to_index.min(dest.items.len());
    dest.items.insert(index, item.clone());
    recompute_budget_hours(dest);

    Ok(DragChange::ItemMoved(ParentChange {
        item,
        from,
        to,
        index,
    }))
}

fn check_source(droppable: DroppableId, index: usize, len: usize) -> Result<(), ReorderError> {
    if index >= len {
        return Err(ReorderError::SourceOutOfRange {
            droppable,
            index,
            len,
        });
    }
    Ok(())
}

/// Remove `list[from]` and reinsert it at `to`, clamped to the list bounds.
/// Returns the index the element ended up at.
fn move_within<T>(list: &mut Vec<T>, from: usize, to: usize) -> usize {
    let element = list.remove(from);
    let to = to.min(list.len());
    list.insert(to, element);
    to
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
