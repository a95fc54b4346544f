//! Top-level command execution and exit code mapping.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::build::run_build;
use crate::cli::{Command, parse_args};
use crate::deploy::run_deploy;
use crate::error::SiteError;
use crate::exit_codes;
use crate::io::process::SystemRunner;
use crate::io::server::HttpServer;
use crate::project::Project;
use crate::serve::run_serve;

/// Dispatch `args` and run the selected command in the current directory.
pub fn run<I>(args: I) -> Result<()>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let request = parse_args(args)?;
    let root = std::env::current_dir().context("resolve current directory")?;
    run_in(&root, request.command, &request.forwarded)
}

/// Run `command` for the project rooted at `root`.
pub fn run_in(root: &Path, command: Command, forwarded: &[OsString]) -> Result<()> {
    debug!(?command, forwarded = forwarded.len(), "dispatching");
    let project = Project::load(root)?;
    let runner = SystemRunner::new(project.root());
    match command {
        Command::Build => run_build(&project, &runner, forwarded).map(|_| ()),
        Command::Serve => {
            let server = HttpServer::from_config(&project.config.serve)?;
            run_serve(&project, &runner, &server, forwarded)
        }
        Command::Deploy => run_deploy(&project, &runner, forwarded),
    }
}

/// Whether `err` is a dispatch failure that should print usage.
pub fn is_usage_error(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SiteError>(),
        Some(SiteError::Usage { .. })
    )
}

/// Process exit code for a failed run.
///
/// A failing external tool's own exit code is passed through.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let code = err.chain().find_map(|cause| match cause.downcast_ref::<SiteError>() {
        Some(SiteError::ProcessFailed {
            code: Some(code), ..
        }) if *code != 0 => Some(*code),
        _ => None,
    });
    code.unwrap_or(exit_codes::FAILURE)
}
