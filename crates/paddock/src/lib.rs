//! paddock CLI application
//!
//! Command-line tool for running and managing local virtual machines.
//! This library crate holds the CLI definition and command
//! implementations; the binary in `main.rs` is a thin wrapper around them.

pub mod cli;
pub mod commands;
