pub mod item;
pub mod container;
pub mod project;
pub mod drag;
pub mod config;
pub mod board;

pub use item::*;
pub use container::*;
pub use project::*;
pub use drag::*;
pub use config::*;
pub use board::*;
