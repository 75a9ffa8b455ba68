pub mod board_io;
pub mod config_io;
pub mod lock;
pub mod recovery;
pub mod session_io;
