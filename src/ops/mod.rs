pub mod budget;
pub mod editor;
pub mod entry_ops;
pub mod reorder;
