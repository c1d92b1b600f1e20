//! extmove - move files into per-extension directories
//!
//! This library provides validated `extension → directory` rules, a parser
//! for `-m` style mappings, creation of destination directory trees with
//! rollback on failure, and the batch mover that applies the rules to a
//! working directory.

pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod logging;
pub mod mapping;
pub mod materializer;
pub mod output;
pub mod report;
pub mod rule;
pub mod scanner;

pub use cli::{Args, run_cli};
pub use config::{CompiledFilters, Config, ConfigError};
pub use file_organizer::{FileOrganizer, MoveError, RunError};
pub use mapping::{MappingError, parse_mapping};
pub use materializer::{Materialized, materialize};
pub use report::{Diagnostics, RunReport, Status};
pub use rule::{Rule, RuleSet, validate_directory, validate_extension};
