//! Command-line front end for debrify.

pub mod commands;
pub mod parser;
pub mod presentation;

pub use parser::Cli;
