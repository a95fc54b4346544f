//! Orchestration for `sitectl serve`: build, then serve the output directory.

use std::ffi::OsString;

use anyhow::{Context, Result};
use tracing::instrument;

use crate::build::run_build;
use crate::io::process::ProcessRunner;
use crate::io::server::SiteServer;
use crate::project::Project;

/// Build the site, then block serving it until interrupted.
///
/// The server is only started once the build has fully succeeded.
#[instrument(skip_all)]
pub fn run_serve<R: ProcessRunner, S: SiteServer>(
    project: &Project,
    runner: &R,
    server: &S,
    forwarded: &[OsString],
) -> Result<()> {
    run_build(project, runner, forwarded)?;
    server
        .serve(&project.paths.output_dir)
        .context("serve output directory")
}
