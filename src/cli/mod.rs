//! Command-line interface module.

mod args;
mod resolve;

pub use args::{Cli, Commands};
pub use resolve::run;
