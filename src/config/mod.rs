//! Configuration loading and application.
mod apply;
mod loader;
mod run;
pub mod types;


pub use apply::apply_config;
pub use loader::{load_config, load_config_file};
pub use run::build_run_config;
