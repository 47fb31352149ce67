//! diffthread — pull request diffs with inline, remote-backed review
//! comments (library crate).
//!
//! Re-exports public modules for integration tests and external hosts.

pub mod activity;
pub mod bridge;
pub mod comments;
pub mod config;
pub mod constants;
pub mod env;
pub mod host;
pub mod markup;
pub mod models;
pub mod patch;
pub mod render;
pub mod store;
pub mod sync;
