pub mod command;
pub mod room;
pub mod types;
