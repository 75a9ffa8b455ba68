use serde::{Deserialize, Serialize};

use super::container::{Container, ContainerKind, ContainerRef};
use super::item::{EntityId, LeafItem};

/// Which container list of a project is in use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Methodology {
    #[default]
    Waterfall,
    Agile,
}

impl Methodology {
    pub fn container_kind(self) -> ContainerKind {
        match self {
            Methodology::Waterfall => ContainerKind::Phase,
            Methodology::Agile => ContainerKind::Sprint,
        }
    }
}

/// A project as held by the editor: the hierarchy store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub methodology: Methodology,
    #[serde(default)]
    pub phases: Vec<Container>,
    #[serde(default)]
    pub sprints: Vec<Container>,
}

impl Project {
    pub fn new(id: EntityId, name: impl Into<String>, methodology: Methodology) -> Self {
        Project {
            id,
            name: name.into(),
            description: None,
            methodology,
            phases: Vec::new(),
            sprints: Vec::new(),
        }
    }

    /// The container list selected by the methodology
    pub fn active_kind(&self) -> ContainerKind {
        self.methodology.container_kind()
    }

    pub fn active_containers(&self) -> &[Container] {
        self.containers(self.active_kind())
    }

    pub fn containers(&self, kind: ContainerKind) -> &[Container] {
        match kind {
            ContainerKind::Phase => &self.phases,
            ContainerKind::Sprint => &self.sprints,
        }
    }

    pub fn containers_mut(&mut self, kind: ContainerKind) -> &mut Vec<Container> {
        match kind {
            ContainerKind::Phase => &mut self.phases,
            ContainerKind::Sprint => &mut self.sprints,
        }
    }

    /// Position of a container within its list
    pub fn container_index(&self, container: ContainerRef) -> Option<usize> {
        self.containers(container.kind())
            .iter()
            .position(|c| c.id == container.id())
    }

    pub fn find_container(&self, container: ContainerRef) -> Option<&Container> {
        self.containers(container.kind())
            .iter()
            .find(|c| c.id == container.id())
    }

    pub fn find_container_mut(&mut self, container: ContainerRef) -> Option<&mut Container> {
        self.containers_mut(container.kind())
            .iter_mut()
            .find(|c| c.id == container.id())
    }

    /// Find a leaf item of the given kind and the container owning it.
    pub fn locate_item(&self, kind: ContainerKind, item_id: EntityId) -> Option<(ContainerRef, &LeafItem)> {
        self.containers(kind).iter().find_map(|c| {
            c.items
                .iter()
                .find(|i| i.id == item_id)
                .map(|i| (ContainerRef::new(kind, c.id), i))
        })
    }

    /// All leaf item ids under one container list, in display order
    pub fn item_ids(&self, kind: ContainerKind) -> Vec<EntityId> {
        self.containers(kind)
            .iter()
            .flat_map(|c| c.items.iter().map(|i| i.id))
            .collect()
    }
}
