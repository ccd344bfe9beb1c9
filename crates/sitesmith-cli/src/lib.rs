//! Library half of the `sitesmith` binary, split out so commands and config
//! loading can be exercised from integration tests.

pub mod builtin;
pub mod cli;
pub mod commands;
pub mod config;
pub mod manifest;
pub mod observability;
pub mod output;
pub mod state;
