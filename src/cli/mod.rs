pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ItemArgs};
pub use commands::run;
