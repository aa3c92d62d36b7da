//! Command-line interface module.

mod commands;
mod story;

pub use commands::{Cli, Commands};
pub use story::run_command;
