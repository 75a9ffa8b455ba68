use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::io::recovery::atomic_write;
use crate::sync::session::Session;

/// Environment variable that overrides the stored token
pub const TOKEN_ENV: &str = "PLANBOARD_TOKEN";

/// Persisted login (written to .session.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

fn session_path(board_dir: &Path) -> PathBuf {
    board_dir.join(".session.json")
}

/// Read .session.json from the board directory. Missing or malformed files
/// read as logged out.
pub fn read_session(board_dir: &Path) -> Option<StoredSession> {
    let content = fs::read_to_string(session_path(board_dir)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .session.json to the board directory
pub fn write_session(board_dir: &Path, token: &str) -> Result<(), std::io::Error> {
    let stored = StoredSession {
        token: token.to_string(),
        saved_at: Utc::now(),
    };
    let content = serde_json::to_string_pretty(&stored)?;
    atomic_write(&session_path(board_dir), content.as_bytes())
}

/// Remove .session.json. Returns whether a session was stored.
pub fn clear_session(board_dir: &Path) -> Result<bool, std::io::Error> {
    match fs::remove_file(session_path(board_dir)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Build the session for a board: `PLANBOARD_TOKEN` wins over the stored
/// token.
pub fn load_session(board_dir: &Path, base_url: &str) -> Session {
    let token = std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| read_session(board_dir).map(|s| s.token));
    Session::new(base_url, token)
}
