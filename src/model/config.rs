use serde::{Deserialize, Serialize};

use super::item::EntityId;

/// Configuration from board.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub api: ApiConfig,
    pub project: ProjectRefConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend root, e.g. `https://psa.example.com/api`
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRefConfig {
    pub id: EntityId,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub drop_outside: DropOutsidePolicy,
}

/// What happens to a phase or sprint dropped outside every droppable.
/// Leaf items dropped outside are never touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropOutsidePolicy {
    /// Remove the container from the list (the dashboard's historical behavior)
    #[default]
    Remove,
    /// Leave the list untouched
    Ignore,
}

/// Default: see src/cli/handlers/init.rs template
fn default_timeout_secs() -> u64 {
    30
}
