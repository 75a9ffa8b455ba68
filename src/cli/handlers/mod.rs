mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Global override for the board directory (set by -C flag)
static BOARD_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::board_io::{self, BoardError};
use crate::io::lock::FileLock;
use crate::io::{config_io, recovery, session_io};
use crate::model::board::Board;
use crate::model::config::BoardConfig;
use crate::model::container::{Container, ContainerKind};
use crate::model::drag::DragEnd;
use crate::model::item::LeafItem;
use crate::model::project::Project;
use crate::ops::budget::budget_totals;
use crate::ops::editor::Editor;
use crate::ops::entry_ops;
use crate::ops::reorder::DragChange;
use crate::sync::api::{ApiClient, ApiError, NewContainer, NewItem};
use crate::sync::persistence::{HttpPersistence, PendingSync, SyncOutcome};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    // Store -C override for board_root_cwd()
    if let Some(ref dir) = cli.board_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        if let Ok(mut guard) = BOARD_DIR_OVERRIDE.lock() {
            guard.replace(abs);
        }
    }

    match cli.command {
        // Init is handled in main.rs before board discovery
        Commands::Init(args) => cmd_init(args),

        // Session
        Commands::Login(args) => cmd_login(args),
        Commands::Logout => cmd_logout(),

        // Read commands
        Commands::Show(args) => cmd_show(args, json),
        Commands::Budget => cmd_budget(json),

        // Write commands
        Commands::Pull => cmd_pull(json),
        Commands::Drag(args) => cmd_drag(args, json),
        Commands::Add(args) => cmd_add(args, json),
        Commands::Config(args) => cmd_config(args, json),
        Commands::Recovery(args) => cmd_recovery(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn board_root_cwd() -> Result<PathBuf, BoardError> {
    let override_dir = BOARD_DIR_OVERRIDE
        .lock()
        .ok()
        .and_then(|guard| guard.clone());
    let start = match override_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    board_io::discover_board(&start)
}

fn load_board_cwd() -> Result<Board, BoardError> {
    board_io::load_board(&board_root_cwd()?)
}

/// Board directory and config, without reading the snapshot.
fn load_config_cwd() -> Result<(PathBuf, BoardConfig), BoardError> {
    let board_dir = board_root_cwd()?.join(board_io::BOARD_DIR);
    let config = board_io::load_config(&board_dir)?;
    Ok((board_dir, config))
}

/// Split a board into its directory, config and pulled project.
fn require_project(board: Board) -> Result<(PathBuf, BoardConfig, Project), BoardError> {
    let project = board.project.ok_or(BoardError::NoSnapshot)?;
    Ok((board.board_dir, board.config, project))
}

fn api_client(board_dir: &Path, config: &BoardConfig) -> ApiClient {
    let session = session_io::load_session(board_dir, &config.api.base_url);
    if !session.is_authenticated() {
        tracing::debug!("no session token; requests go out unauthenticated");
    }
    ApiClient::new(session, Duration::from_secs(config.api.timeout_secs))
}

/// A rejected token is forgotten so the next command asks for a new one.
fn api_failure(board_dir: &Path, err: ApiError) -> Box<dyn std::error::Error> {
    if matches!(err, ApiError::Unauthorized) {
        match session_io::clear_session(board_dir) {
            Ok(true) => tracing::info!("stored session token cleared"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "could not clear stored session"),
        }
    }
    err.into()
}

fn print_json(value: &impl serde::Serialize) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

fn cmd_login(args: LoginArgs) -> CmdResult {
    let (board_dir, config) = load_config_cwd()?;
    let token = args.token.trim();
    if token.is_empty() {
        return Err("token must not be empty".into());
    }
    session_io::write_session(&board_dir, token)?;
    println!("Logged in to {}", config.api.base_url);
    Ok(())
}

fn cmd_logout() -> CmdResult {
    let (board_dir, config) = load_config_cwd()?;
    if session_io::clear_session(&board_dir)? {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    let session = session_io::load_session(&board_dir, &config.api.base_url);
    if session.is_authenticated() {
        eprintln!(
            "Note: {} is still set and will be used for requests",
            session_io::TOKEN_ENV
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(args: ShowArgs, json: bool) -> CmdResult {
    let (_, _, project) = require_project(load_board_cwd()?)?;
    let kinds = if args.all {
        vec![ContainerKind::Phase, ContainerKind::Sprint]
    } else {
        vec![project.active_kind()]
    };

    if json {
        return print_json(&board_to_json(&project, &kinds));
    }
    for line in format_board(&project, &kinds) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_budget(json: bool) -> CmdResult {
    let (_, _, project) = require_project(load_board_cwd()?)?;
    let totals = budget_totals(&project);

    let entries: Vec<BudgetEntryJson> = totals
        .iter()
        .map(|(container, hours)| BudgetEntryJson {
            container: *container,
            name: project
                .find_container(*container)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            budget_hours: *hours,
        })
        .collect();
    let total: f64 = totals.values().sum();

    if json {
        return print_json(&BudgetJson {
            containers: entries,
            total,
        });
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in &entries {
        println!(
            "{:<12} {:<width$}  {}",
            entry.container.to_string(),
            entry.name,
            format_hours(entry.budget_hours),
            width = width
        );
    }
    println!("{:<12} {:<width$}  {}", "total", "", format_hours(total), width = width);
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_pull(json: bool) -> CmdResult {
    // The snapshot is replaced wholesale, so a corrupt one is never read
    let (board_dir, config) = load_config_cwd()?;
    let client = api_client(&board_dir, &config);
    let project = client
        .fetch_project(config.project.id)
        .map_err(|e| api_failure(&board_dir, e))?;

    let _lock = FileLock::acquire_default(&board_dir)?;
    board_io::save_snapshot(&board_dir, &project)?;

    let kind = project.active_kind();
    let containers = project.containers(kind);
    let items: usize = containers.iter().map(|c| c.items.len()).sum();
    if json {
        return print_json(&board_to_json(&project, &[kind]));
    }
    println!(
        "Pulled {}: {} {}, {} {}",
        project.name,
        containers.len(),
        kind.endpoint(),
        items,
        kind.items_endpoint()
    );
    Ok(())
}

fn cmd_drag(args: DragArgs, json: bool) -> CmdResult {
    let root = board_root_cwd()?;
    let lock = FileLock::acquire_default(&root.join(board_io::BOARD_DIR))?;
    // Read under the lock so the drag applies to the latest snapshot
    let (board_dir, config, project) = require_project(board_io::load_board(&root)?)?;

    let mut editor = if args.offline {
        Editor::offline(project)
    } else {
        let client = api_client(&board_dir, &config);
        Editor::new(project, Arc::new(HttpPersistence::new(client)))
    }
    .with_drop_outside(config.editor.drop_outside)
    .with_failure_log(board_dir.clone());

    let drag = DragEnd::new(args.source, args.destination);
    let outcome = editor.on_drag_end(&drag)?;
    if outcome.change != DragChange::Unchanged {
        board_io::save_snapshot(&board_dir, editor.project())?;
    }
    drop(lock);

    // The local snapshot is already written; only report how the backend fared.
    let sync = outcome.pending.map(PendingSync::wait);

    if json {
        return print_json(&serde_json::json!({
            "change": change_to_json(&outcome.change),
            "sync": sync_to_json(sync.as_ref()),
        }));
    }

    println!(
        "{}",
        format_change(args.source.droppable.kind(), &outcome.change)
    );
    match sync {
        Some(SyncOutcome::Synced) => println!("backend updated"),
        Some(SyncOutcome::Failed(error)) => eprintln!(
            "warning: backend not updated: {} (kept locally, see `pb recovery`)",
            error
        ),
        None => {}
    }
    Ok(())
}

fn cmd_add(cmd: AddCmd, json: bool) -> CmdResult {
    let board = load_board_cwd()?;
    let client = api_client(&board.board_dir, &board.config);

    match cmd.target {
        AddTarget::Phase(args) => add_container(&board, &client, ContainerKind::Phase, args, json),
        AddTarget::Sprint(args) => {
            add_container(&board, &client, ContainerKind::Sprint, args, json)
        }
        AddTarget::Item(args) => add_item(&board, &client, args, json),
    }
}

fn add_container(
    board: &Board,
    client: &ApiClient,
    kind: ContainerKind,
    args: AddContainerArgs,
    json: bool,
) -> CmdResult {
    if board.project.is_none() {
        return Err(BoardError::NoSnapshot.into());
    }
    let new = NewContainer {
        project_id: board.config.project.id,
        name: args.name,
        start_date: args.start,
        end_date: args.end,
    };
    let created: Container = client
        .create_container(kind, &new)
        .map_err(|e| api_failure(&board.board_dir, e))?;

    let _lock = FileLock::acquire_default(&board.board_dir)?;
    let mut project = board_io::load_snapshot(&board.board_dir)?.ok_or(BoardError::NoSnapshot)?;
    let reference = entry_ops::append_container(&mut project, kind, created)?;
    board_io::save_snapshot(&board.board_dir, &project)?;

    // Report the container as stored, with its hours rolled up
    let added = project
        .find_container(reference)
        .ok_or_else(|| format!("{} not found after append", reference))?;
    if json {
        return print_json(&container_to_json(kind, added));
    }
    println!("Added {} {}", reference, added.name);
    Ok(())
}

fn add_item(board: &Board, client: &ApiClient, args: AddItemArgs, json: bool) -> CmdResult {
    let parent = args.list.container().ok_or_else(|| {
        format!(
            "{} is a container list; items go into tasks-<id> or stories-<id>",
            args.list
        )
    })?;
    let project = board.project.as_ref().ok_or(BoardError::NoSnapshot)?;
    if project.find_container(parent).is_none() {
        return Err(format!("{} not found", parent).into());
    }

    let new = NewItem {
        name: args.name,
        start_date: args.start,
        end_date: args.end,
        budget_hours: args.hours,
    };
    let created: LeafItem = client
        .create_item(parent, &new)
        .map_err(|e| api_failure(&board.board_dir, e))?;

    let _lock = FileLock::acquire_default(&board.board_dir)?;
    let mut project = board_io::load_snapshot(&board.board_dir)?.ok_or(BoardError::NoSnapshot)?;
    let json_out = item_to_json(&created);
    entry_ops::append_item(&mut project, parent, created)?;
    board_io::save_snapshot(&board.board_dir, &project)?;

    if json {
        return print_json(&json_out);
    }
    let total = project
        .find_container(parent)
        .map(|c| c.budget_hours)
        .unwrap_or_default();
    println!(
        "Added {} {} to {} ({} total)",
        parent.kind().item_label(),
        json_out.id,
        parent,
        format_hours(total)
    );
    Ok(())
}

fn cmd_config(cmd: ConfigCmd, json: bool) -> CmdResult {
    let (board_dir, config) = load_config_cwd()?;
    match cmd.action {
        ConfigAction::Show => {
            if json {
                return print_json(&config);
            }
            print!("{}", toml::to_string(&config)?);
            Ok(())
        }
        ConfigAction::Set(args) => {
            let _lock = FileLock::acquire_default(&board_dir)?;
            let (_, mut doc) = config_io::read_config(&board_dir)?;
            config_io::set_value(&mut doc, &args.key, &args.value)?;
            config_io::write_config(&board_dir, &doc)?;
            println!("{} = {}", args.key, args.value);

            // A token issued by one backend means nothing to another
            if args.key == "api.base_url"
                && args.value.trim_end_matches('/')
                    != config.api.base_url.trim_end_matches('/')
                && session_io::clear_session(&board_dir)?
            {
                println!("Stored token cleared; run `pb login` for the new backend");
            }
            Ok(())
        }
    }
}

fn cmd_recovery(cmd: RecoveryCmd, json: bool) -> CmdResult {
    let (board_dir, _) = load_config_cwd()?;
    match cmd.action {
        Some(RecoveryAction::Clear) => {
            let _lock = FileLock::acquire_default(&board_dir)?;
            let removed = recovery::clear_recovery(&board_dir)?;
            println!("Cleared {} recovery entries", removed);
            Ok(())
        }
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(&board_dir).display());
            Ok(())
        }
        None => {
            let limit = cmd.limit.unwrap_or(10);
            let entries = recovery::read_recovery_entries(&board_dir, Some(limit));
            if json {
                let values: Vec<serde_json::Value> =
                    entries.iter().map(|e| e.to_json()).collect();
                return print_json(&values);
            }
            if entries.is_empty() {
                println!("No recovery entries");
                return Ok(());
            }
            for entry in &entries {
                print!("{}", entry.to_markdown());
            }
            Ok(())
        }
    }
}
