//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Command, LoadArgs, ValidateArgs};
pub use parsers::parse_duration;
pub use types::PositiveUsize;
