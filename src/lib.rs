//! module-finder library: call-coupling analysis, hierarchical clustering and module recovery.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;
