use std::fs;
use std::path::Path;

use crate::io::board_io::{BoardError, config_path};
use crate::model::config::BoardConfig;

/// Read the board config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(board_dir: &Path) -> Result<(BoardConfig, toml_edit::DocumentMut), BoardError> {
    let path = config_path(board_dir);
    let text = fs::read_to_string(&path).map_err(|e| BoardError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(board_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), BoardError> {
    let path = config_path(board_dir);
    fs::write(&path, doc.to_string()).map_err(|e| BoardError::WriteError { path, source: e })
}

/// Set `<table>.<key>` in the document and check the result still parses
/// as a board config. Integers and booleans are stored as such, everything
/// else as a string. The document is left unchanged on error.
pub fn set_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    raw: &str,
) -> Result<BoardConfig, BoardError> {
    let (table, field) = key
        .split_once('.')
        .filter(|(t, f)| !t.is_empty() && !f.is_empty() && !f.contains('.'))
        .ok_or_else(|| BoardError::InvalidConfigKey(key.to_string()))?;

    let mut edited = doc.clone();
    if !edited.contains_key(table) {
        edited[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let target = edited[table]
        .as_table_like_mut()
        .ok_or_else(|| BoardError::InvalidConfigKey(key.to_string()))?;
    target.insert(field, typed_value(raw));

    let config: BoardConfig = toml::from_str(&edited.to_string())?;
    *doc = edited;
    Ok(config)
}

fn typed_value(raw: &str) -> toml_edit::Item {
    if let Ok(n) = raw.parse::<i64>() {
        return toml_edit::value(n);
    }
    match raw {
        "true" => toml_edit::value(true),
        "false" => toml_edit::value(false),
        _ => toml_edit::value(raw),
    }
}
