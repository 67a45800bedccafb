//! Internal modules for the bracket CLI.
//!
//! This library provides configuration, logging setup and the command
//! implementations used by the `bracket` binary.

pub mod commands;
pub mod config;
pub mod logging;
