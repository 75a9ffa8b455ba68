use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::board::Board;
use crate::model::config::BoardConfig;
use crate::model::project::Project;
use crate::ops::budget::recompute_project;

/// Name of the workspace directory
pub const BOARD_DIR: &str = "planboard";
const CONFIG_FILE: &str = "board.toml";
const SNAPSHOT_FILE: &str = "project.json";

/// Error type for board I/O operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("not a planboard workspace: no planboard/ directory found (run `pb init`)")]
    NotABoard,
    #[error("no project pulled yet: run `pb pull`")]
    NoSnapshot,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse board.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit board.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("invalid config key {0} (expected <table>.<key>)")]
    InvalidConfigKey(String),
    #[error("could not parse {path}: {source}")]
    SnapshotParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the board by walking up from the given directory, looking for
/// a `planboard/` subdirectory holding a board.toml.
pub fn discover_board(start: &Path) -> Result<PathBuf, BoardError> {
    let mut current = start.to_path_buf();
    loop {
        let board_dir = current.join(BOARD_DIR);
        if board_dir.is_dir() && board_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(BoardError::NotABoard);
        }
    }
}

pub fn config_path(board_dir: &Path) -> PathBuf {
    board_dir.join(CONFIG_FILE)
}

pub fn snapshot_path(board_dir: &Path) -> PathBuf {
    board_dir.join(SNAPSHOT_FILE)
}

/// Load the board config and, if present, the project snapshot.
pub fn load_board(root: &Path) -> Result<Board, BoardError> {
    let board_dir = root.join(BOARD_DIR);
    if !board_dir.is_dir() {
        return Err(BoardError::NotABoard);
    }

    let config = load_config(&board_dir)?;
    let project = load_snapshot(&board_dir)?;

    Ok(Board {
        root: root.to_path_buf(),
        board_dir,
        config,
        project,
    })
}

/// Read board.toml alone. Commands that never look at the snapshot use
/// this, so a corrupt `project.json` can still be replaced by `pb pull`.
pub fn load_config(board_dir: &Path) -> Result<BoardConfig, BoardError> {
    let path = config_path(board_dir);
    let text = fs::read_to_string(&path).map_err(|e| BoardError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read `project.json`. Stored container totals are recomputed on load.
pub fn load_snapshot(board_dir: &Path) -> Result<Option<Project>, BoardError> {
    let path = snapshot_path(board_dir);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| BoardError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let mut project: Project =
        serde_json::from_str(&text).map_err(|e| BoardError::SnapshotParseError {
            path: path.clone(),
            source: e,
        })?;
    recompute_project(&mut project);
    Ok(Some(project))
}

/// Write `project.json` atomically. A failed write is kept in the recovery
/// log so the new order isn't lost.
pub fn save_snapshot(board_dir: &Path, project: &Project) -> Result<(), BoardError> {
    let path = snapshot_path(board_dir);
    let mut content = serde_json::to_string_pretty(project).map_err(|e| {
        BoardError::SnapshotParseError {
            path: path.clone(),
            source: e,
        }
    })?;
    content.push('\n');

    if let Err(e) = recovery::atomic_write(&path, content.as_bytes()) {
        recovery::log_recovery(
            board_dir,
            RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category: RecoveryCategory::Write,
                description: "snapshot write failed".to_string(),
                fields: vec![
                    ("Target".to_string(), SNAPSHOT_FILE.to_string()),
                    ("Error".to_string(), e.to_string()),
                ],
                body: content,
            },
        );
        return Err(BoardError::WriteError { path, source: e });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::container::Container;
    use crate::model::item::LeafItem;
    use crate::model::project::Methodology;
    use tempfile::TempDir;

    fn create_test_board(dir: &Path) {
        let board_dir = dir.join(BOARD_DIR);
        fs::create_dir_all(&board_dir).unwrap();
        fs::write(
            board_dir.join(CONFIG_FILE),
            r#"
[api]
base_url = "http://localhost:8000/api"

[project]
id = 7
"#,
        )
        .unwrap();
    }

    #[test]
    fn test_discover_board() {
        let tmp = TempDir::new().unwrap();
        create_test_board(tmp.path());

        let root = discover_board(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());

        let sub = tmp.path().join("planboard");
        assert_eq!(discover_board(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn test_discover_board_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover_board(tmp.path()),
            Err(BoardError::NotABoard)
        ));
    }

    #[test]
    fn test_load_board_without_snapshot() {
        let tmp = TempDir::new().unwrap();
        create_test_board(tmp.path());
        let board = load_board(tmp.path()).unwrap();
        assert_eq!(board.config.project.id, 7);
        assert!(board.project.is_none());
    }

    #[test]
    fn test_snapshot_round_trip_recomputes() {
        let tmp = TempDir::new().unwrap();
        create_test_board(tmp.path());
        let board_dir = tmp.path().join(BOARD_DIR);

        let mut project = Project::new(7, "Relaunch", Methodology::Waterfall);
        let mut phase = Container::new(1, "A").with_items(vec![
            LeafItem::new(1, "x", 5.0),
            LeafItem::new(2, "y", 3.0),
        ]);
        phase.budget_hours = 1.0;
        project.phases.push(phase);
        save_snapshot(&board_dir, &project).unwrap();

        let loaded = load_board(tmp.path()).unwrap().project.unwrap();
        assert_eq!(loaded.phases[0].item_ids(), vec![1, 2]);
        assert_eq!(loaded.phases[0].budget_hours, 8.0);
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        create_test_board(tmp.path());
        fs::write(tmp.path().join(BOARD_DIR).join(SNAPSHOT_FILE), "{ nope").unwrap();
        assert!(matches!(
            load_board(tmp.path()),
            Err(BoardError::SnapshotParseError { .. })
        ));
        let config = load_config(&tmp.path().join(BOARD_DIR)).unwrap();
        assert_eq!(config.project.id, 7);
    }
}
