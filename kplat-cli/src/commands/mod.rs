//! Subcommand implementations

pub mod backend;
pub mod db;
pub mod frontend;
