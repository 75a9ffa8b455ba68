use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::board_io::{self, BOARD_DIR};

const BOARD_TOML_TEMPLATE: &str = r#"# planboard board configuration

[api]
base_url = "{base_url}"
# Seconds before a backend request is abandoned
timeout_secs = 30

[project]
id = {project_id}

[editor]
# What a phase or sprint dropped outside every list does:
#   "remove" takes it off the list (locally only)
#   "ignore" leaves the list untouched
drop_outside = "remove"
"#;

const GITIGNORE_TEMPLATE: &str = ".session.json\n.lock\n";

fn render_board_toml(base_url: &str, project_id: u64) -> String {
    BOARD_TOML_TEMPLATE
        .replace("{base_url}", base_url.trim_end_matches('/'))
        .replace("{project_id}", &project_id.to_string())
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let board_dir = cwd.join(BOARD_DIR);

    if board_dir.is_dir() {
        return Err(format!("board already exists in ./{}/", BOARD_DIR).into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = board_io::discover_board(parent)
    {
        eprintln!(
            "Note: parent board found at {}/",
            parent_root.join(BOARD_DIR).display()
        );
        eprintln!("Creating new board in ./{}/", BOARD_DIR);
    }

    fs::create_dir_all(&board_dir)?;
    fs::write(
        board_io::config_path(&board_dir),
        render_board_toml(&args.api_url, args.project),
    )?;
    fs::write(board_dir.join(".gitignore"), GITIGNORE_TEMPLATE)?;

    tracing::debug!(board = %board_dir.display(), "board initialized");
    println!("Initialized board for project {}", args.project);
    println!("  backend: {}", args.api_url.trim_end_matches('/'));
    println!("Next: `pb login --token <token>` and `pb pull`");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::{BoardConfig, DropOutsidePolicy};

    #[test]
    fn rendered_template_parses() {
        let text = render_board_toml("https://psa.example.com/api/", 7);
        let config: BoardConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.api.base_url, "https://psa.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.project.id, 7);
        assert_eq!(config.editor.drop_outside, DropOutsidePolicy::Remove);
    }
}
