//! Build, serve, and deploy orchestration for a wasm-powered static site.
//!
//! `sitectl` sequences external tools (`wasm-pack`, `rollup`, `rsync`,
//! `ssh`) and a few filesystem copies. The crate is split into:
//!
//! - **[`io`]**: Side-effecting operations (config, processes, copies, HTTP).
//!   Processes and the server sit behind traits so tests can script them.
//! - **Orchestration** ([`build`], [`serve`], [`deploy`]): fail-fast command
//!   sequences built on [`io`].
//! - **Dispatch** ([`cli`], [`app`]): argument handling and exit codes.

pub mod app;
pub mod build;
pub mod cli;
pub mod deploy;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod project;
pub mod serve;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
