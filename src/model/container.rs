use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::item::{EntityId, LeafItem, lenient_date, lenient_hours};

/// Whether a container is a phase (waterfall) or a sprint (agile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Phase,
    Sprint,
}

impl ContainerKind {
    /// REST collection for the containers themselves
    pub fn endpoint(self) -> &'static str {
        match self {
            ContainerKind::Phase => "phases",
            ContainerKind::Sprint => "sprints",
        }
    }

    /// REST collection (and wire field name) for the leaf items
    pub fn items_endpoint(self) -> &'static str {
        match self {
            ContainerKind::Phase => "tasks",
            ContainerKind::Sprint => "stories",
        }
    }

    /// Parent key carried by a leaf item body
    pub fn parent_field(self) -> &'static str {
        match self {
            ContainerKind::Phase => "phase_id",
            ContainerKind::Sprint => "sprint_id",
        }
    }

    /// Singular label of a leaf item of this kind
    pub fn item_label(self) -> &'static str {
        match self {
            ContainerKind::Phase => "task",
            ContainerKind::Sprint => "story",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::Phase => write!(f, "phase"),
            ContainerKind::Sprint => write!(f, "sprint"),
        }
    }
}

/// A reference to one container, parsed once at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ContainerRef {
    Phase(EntityId),
    Sprint(EntityId),
}

impl ContainerRef {
    pub fn new(kind: ContainerKind, id: EntityId) -> Self {
        match kind {
            ContainerKind::Phase => ContainerRef::Phase(id),
            ContainerKind::Sprint => ContainerRef::Sprint(id),
        }
    }

    pub fn kind(self) -> ContainerKind {
        match self {
            ContainerRef::Phase(_) => ContainerKind::Phase,
            ContainerRef::Sprint(_) => ContainerKind::Sprint,
        }
    }

    pub fn id(self) -> EntityId {
        match self {
            ContainerRef::Phase(id) | ContainerRef::Sprint(id) => id,
        }
    }
}

impl std::fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// A phase or sprint and the leaf items it owns, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: EntityId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    /// Derived total of the items' hours; whatever the server sent is
    /// overwritten on load and after every mutation.
    #[serde(default, deserialize_with = "lenient_hours")]
    pub budget_hours: f64,
    /// `tasks` for a phase, `stories` for a sprint
    #[serde(default, alias = "tasks", alias = "stories")]
    pub items: Vec<LeafItem>,
}

impl Container {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Container {
            id,
            name: name.into(),
            start_date: None,
            end_date: None,
            budget_hours: 0.0,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<LeafItem>) -> Self {
        self.items = items;
        self
    }

    pub fn item_ids(&self) -> Vec<EntityId> {
        self.items.iter().map(|i| i.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_reads_tasks_field() {
        let phase: Container = serde_json::from_str(
            r#"{"id":1,"name":"Build","budget_hours":99,"tasks":[{"id":7,"name":"x","budget_hours":3}]}"#,
        )
        .unwrap();
        assert_eq!(phase.item_ids(), vec![7]);
        // Stored hours are not trusted; recomputation happens on load.
        assert_eq!(phase.budget_hours, 99.0);
    }

    #[test]
    fn sprint_reads_stories_field() {
        let sprint: Container =
            serde_json::from_str(r#"{"id":2,"name":"S1","stories":[{"id":8,"name":"y"}]}"#)
                .unwrap();
        assert_eq!(sprint.item_ids(), vec![8]);
    }

    #[test]
    fn container_ref_accessors() {
        let r = ContainerRef::new(ContainerKind::Sprint, 12);
        assert_eq!(r, ContainerRef::Sprint(12));
        assert_eq!(r.kind(), ContainerKind::Sprint);
        assert_eq!(r.id(), 12);
        assert_eq!(r.to_string(), "sprint 12");
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(ContainerKind::Phase.items_endpoint(), "tasks");
        assert_eq!(ContainerKind::Sprint.parent_field(), "sprint_id");
        assert_eq!(ContainerKind::Sprint.endpoint(), "sprints");
    }
}
