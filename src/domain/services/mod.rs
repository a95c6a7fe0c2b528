//! Domain services - Pure game rules with no I/O

pub mod combat;
pub mod command_parser;
pub mod naming;

pub use combat::resolve_attack;
pub use command_parser::{parse_command, Command, CommandError};
