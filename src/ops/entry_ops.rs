use crate::model::container::{Container, ContainerKind, ContainerRef};
use crate::model::item::{EntityId, LeafItem};
use crate::model::project::Project;
use crate::ops::budget::recompute_budget_hours;

/// Error type for appending server-created entities
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    #[error("{0} not found")]
    ContainerNotFound(ContainerRef),
    #[error("{kind} {id} already exists")]
    DuplicateContainer { kind: ContainerKind, id: EntityId },
    #[error("{label} {id} already exists in {owner}")]
    DuplicateItem {
        label: &'static str,
        id: EntityId,
        owner: ContainerRef,
    },
}

/// Append a container the backend just created to the end of its list.
pub fn append_container(
    project: &mut Project,
    kind: ContainerKind,
    mut container: Container,
) -> Result<ContainerRef, EntryError> {
    let reference = ContainerRef::new(kind, container.id);
    if project.find_container(reference).is_some() {
        return Err(EntryError::DuplicateContainer {
            kind,
            id: container.id,
        });
    }
    recompute_budget_hours(&mut container);
    project.containers_mut(kind).push(container);
    Ok(reference)
}

/// Append an item the backend just created to the end of `parent`'s items.
pub fn append_item(
    project: &mut Project,
    parent: ContainerRef,
    item: LeafItem,
) -> Result<(), EntryError> {
    if let Some((owner, _)) = project.locate_item(parent.kind(), item.id) {
        return Err(EntryError::DuplicateItem {
            label: parent.kind().item_label(),
            id: item.id,
            owner,
        });
    }
    let container = project
        .find_container_mut(parent)
        .ok_or(EntryError::ContainerNotFound(parent))?;
    container.items.push(item);
    recompute_budget_hours(container);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::Methodology;

    fn project() -> Project {
        let mut p = Project::new(1, "p", Methodology::Waterfall);
        p.phases.push(Container::new(10, "A").with_items(vec![LeafItem::new(1, "x", 2.0)]));
        p
    }

    #[test]
    fn append_item_updates_hours() {
        let mut p = project();
        append_item(&mut p, ContainerRef::Phase(10), LeafItem::new(2, "y", 4.5)).unwrap();
        assert_eq!(p.phases[0].item_ids(), vec![1, 2]);
        assert_eq!(p.phases[0].budget_hours, 6.5);
    }

    #[test]
    fn append_item_to_missing_container() {
        let mut p = project();
        let err = append_item(&mut p, ContainerRef::Phase(99), LeafItem::new(2, "y", 1.0))
            .unwrap_err();
        assert_eq!(err, EntryError::ContainerNotFound(ContainerRef::Phase(99)));
    }

    #[test]
    fn append_item_rejects_duplicates() {
        let mut p = project();
        p.phases.push(Container::new(11, "B"));
        let err = append_item(&mut p, ContainerRef::Phase(11), LeafItem::new(1, "x", 2.0))
            .unwrap_err();
        assert!(matches!(err, EntryError::DuplicateItem { id: 1, .. }));
        assert!(p.phases[1].items.is_empty());
    }

    #[test]
    fn append_container_goes_last() {
        let mut p = project();
        let created = Container::new(11, "B").with_items(vec![LeafItem::new(5, "z", 1.0)]);
        let r = append_container(&mut p, ContainerKind::Phase, created).unwrap();
        assert_eq!(r, ContainerRef::Phase(11));
        assert_eq!(p.phases.last().unwrap().budget_hours, 1.0);

        let err = append_container(&mut p, ContainerKind::Phase, Container::new(11, "again"))
            .unwrap_err();
        assert!(matches!(err, EntryError::DuplicateContainer { id: 11, .. }));
    }
}
