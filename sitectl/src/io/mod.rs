//! Side-effecting helpers: config, processes, filesystem, HTTP.

pub mod config;
pub mod copy;
pub mod paths;
pub mod process;
pub mod server;
