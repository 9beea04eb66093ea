//! hostlog CLI library.
//!
//! Exposes the argument definitions, command handlers and output layer
//! so they can be exercised from integration tests. The `hostlog`
//! binary (main.rs) is a thin wrapper around [`commands::dispatch`].

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
