use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::container::{ContainerKind, ContainerRef};
use super::item::EntityId;

/// Error for droppable ids and drop locations that don't parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropParseError {
    #[error("unknown droppable id: {0} (expected phases, sprints, tasks-<id> or stories-<id>)")]
    UnknownDroppable(String),
    #[error("invalid container id in {0}")]
    InvalidContainerId(String),
    #[error("invalid drop location {0} (expected <droppable>:<index>)")]
    InvalidLocation(String),
}

/// A drop target: either a whole container list or one container's items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DroppableId {
    Phases,
    Sprints,
    Tasks(EntityId),
    Stories(EntityId),
}

impl DroppableId {
    pub fn kind(self) -> ContainerKind {
        match self {
            DroppableId::Phases | DroppableId::Tasks(_) => ContainerKind::Phase,
            DroppableId::Sprints | DroppableId::Stories(_) => ContainerKind::Sprint,
        }
    }

    /// The container whose items this droppable shows, or `None` for a
    /// container list.
    pub fn container(self) -> Option<ContainerRef> {
        match self {
            DroppableId::Phases | DroppableId::Sprints => None,
            DroppableId::Tasks(id) => Some(ContainerRef::Phase(id)),
            DroppableId::Stories(id) => Some(ContainerRef::Sprint(id)),
        }
    }

    pub fn container_list(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Phase => DroppableId::Phases,
            ContainerKind::Sprint => DroppableId::Sprints,
        }
    }

    pub fn items_of(container: ContainerRef) -> Self {
        match container {
            ContainerRef::Phase(id) => DroppableId::Tasks(id),
            ContainerRef::Sprint(id) => DroppableId::Stories(id),
        }
    }
}

impl fmt::Display for DroppableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DroppableId::Phases => write!(f, "phases"),
            DroppableId::Sprints => write!(f, "sprints"),
            DroppableId::Tasks(id) => write!(f, "tasks-{}", id),
            DroppableId::Stories(id) => write!(f, "stories-{}", id),
        }
    }
}

impl FromStr for DroppableId {
    type Err = DropParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "phases" => return Ok(DroppableId::Phases),
            "sprints" => return Ok(DroppableId::Sprints),
            _ => {}
        }
        let (prefix, id) = s
            .split_once('-')
            .ok_or_else(|| DropParseError::UnknownDroppable(s.to_string()))?;
        let parse_id = || {
            id.parse::<EntityId>()
                .map_err(|_| DropParseError::InvalidContainerId(s.to_string()))
        };
        match prefix {
            "tasks" => Ok(DroppableId::Tasks(parse_id()?)),
            "stories" => Ok(DroppableId::Stories(parse_id()?)),
            _ => Err(DropParseError::UnknownDroppable(s.to_string())),
        }
    }
}

impl Serialize for DroppableId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DroppableId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One end of a drag: a droppable and an index into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropLocation {
    #[serde(rename = "droppableId")]
    pub droppable: DroppableId,
    pub index: usize,
}

impl DropLocation {
    pub fn new(droppable: DroppableId, index: usize) -> Self {
        DropLocation { droppable, index }
    }
}

impl fmt::Display for DropLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.droppable, self.index)
    }
}

/// Parses the command-line form `<droppable>:<index>`, e.g. `tasks-4:0`.
impl FromStr for DropLocation {
    type Err = DropParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (droppable, index) = s
            .rsplit_once(':')
            .ok_or_else(|| DropParseError::InvalidLocation(s.to_string()))?;
        let index = index
            .trim()
            .parse::<usize>()
            .map_err(|_| DropParseError::InvalidLocation(s.to_string()))?;
        Ok(DropLocation {
            droppable: droppable.parse()?,
            index,
        })
    }
}

/// The payload delivered when a drag gesture ends. `destination` is `None`
/// when the element was dropped outside every droppable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

impl DragEnd {
    pub fn new(source: DropLocation, destination: Option<DropLocation>) -> Self {
        DragEnd {
            source,
            destination,
        }
    }
}
