use std::path::PathBuf;

use super::config::BoardConfig;
use super::project::Project;

/// A fully loaded board workspace
#[derive(Debug)]
pub struct Board {
    /// Directory containing `planboard/`
    pub root: PathBuf,
    /// Path to the `planboard/` directory
    pub board_dir: PathBuf,
    /// Parsed board.toml
    pub config: BoardConfig,
    /// Last pulled project, if any
    pub project: Option<Project>,
}
