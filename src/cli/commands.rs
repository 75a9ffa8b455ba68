use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::model::drag::{DropLocation, DroppableId};
use crate::model::item::EntityId;

#[derive(Parser)]
#[command(name = "pb", about = concat!("planboard v", env!("CARGO_PKG_VERSION"), " - phases, sprints and the work inside them"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different board directory
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub board_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a board in the current directory
    Init(InitArgs),
    /// Store an API token for this board
    Login(LoginArgs),
    /// Forget the stored API token
    Logout,
    /// Fetch the project from the backend into the local snapshot
    Pull,
    /// Show the active containers and their items
    Show(ShowArgs),
    /// Recompute and print budget hours per container
    Budget,
    /// Replay a drag-end event against the snapshot
    Drag(DragArgs),
    /// Create a phase, sprint or leaf item
    Add(AddCmd),
    /// Read or edit board.toml
    Config(ConfigCmd),
    /// View or clear the recovery log
    Recovery(RecoveryCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Backend root URL
    #[arg(long = "api-url")]
    pub api_url: String,
    /// Project to edit
    #[arg(long)]
    pub project: EntityId,
}

#[derive(Args)]
pub struct LoginArgs {
    /// API token issued by the backend
    #[arg(long)]
    pub token: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Show phases and sprints regardless of methodology
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct DragArgs {
    /// Where the drag started, e.g. `tasks-10:1` or `phases:0`
    pub source: DropLocation,
    /// Where it was dropped; omit for a drop outside every list
    pub destination: Option<DropLocation>,
    /// Apply locally without telling the backend
    #[arg(long)]
    pub offline: bool,
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddCmd {
    #[command(subcommand)]
    pub target: AddTarget,
}

#[derive(Subcommand)]
pub enum AddTarget {
    /// Append a phase
    Phase(AddContainerArgs),
    /// Append a sprint
    Sprint(AddContainerArgs),
    /// Append a task or story to a container's list
    Item(AddItemArgs),
}

#[derive(Args)]
pub struct AddContainerArgs {
    /// Display name
    pub name: String,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Args)]
pub struct AddItemArgs {
    /// Item list to append to, e.g. `tasks-10` or `stories-4`
    pub list: DroppableId,
    /// Display name
    pub name: String,
    /// Budgeted hours
    #[arg(long, default_value_t = 0.0)]
    pub hours: f64,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set a value, e.g. `editor.drop_outside ignore`
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Dotted key: `<table>.<field>`
    pub key: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove every entry
    Clear,
    /// Print the absolute path to the recovery log
    Path,
}
