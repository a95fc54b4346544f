//! Orchestration for `sitectl build`.
//!
//! Four fixed steps, each aborting the sequence on failure:
//! 1. compile with the packager (forwarded CLI args appended),
//! 2. copy the wasm binary into the output directory,
//! 3. bundle the JS entry point into the output directory,
//! 4. merge the static assets into the output directory.
//!
//! Nothing is cleaned up when a step fails; the output directory keeps
//! whatever the earlier steps wrote.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::io::copy::{copy_file, merge_dir_into};
use crate::io::process::{Invocation, ProcessRunner};
use crate::project::Project;

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub wasm: PathBuf,
    pub bundle: PathBuf,
    /// Number of files merged in from the static directory.
    pub static_files: usize,
}

/// `<packager> build --no-typescript --target web <forwarded...>`
pub fn packager_invocation(project: &Project, forwarded: &[OsString]) -> Invocation {
    Invocation::new(&project.config.tools.packager)
        .args(["build", "--no-typescript", "--target", "web"])
        .args(forwarded.iter().cloned())
}

/// `<bundler> <entry> --format iife --file <output>/<bundle>`
pub fn bundler_invocation(project: &Project) -> Invocation {
    let paths = &project.paths;
    Invocation::new(&project.config.tools.bundler)
        .arg(paths.relative(&paths.entry_script))
        .args(["--format", "iife", "--file"])
        .arg(paths.relative(&paths.bundle))
}

/// Run the full build sequence.
#[instrument(skip_all, fields(root = %project.root().display()))]
pub fn run_build<R: ProcessRunner>(
    project: &Project,
    runner: &R,
    forwarded: &[OsString],
) -> Result<BuildReport> {
    let paths = &project.paths;

    runner
        .run(&packager_invocation(project, forwarded))
        .context("compile step")?;

    fs::create_dir_all(&paths.output_dir)
        .with_context(|| format!("create output directory {}", paths.output_dir.display()))?;
    copy_file(&paths.wasm_source, &paths.wasm_target).context("copy wasm step")?;

    runner
        .run(&bundler_invocation(project))
        .context("bundle step")?;

    let static_files =
        merge_dir_into(&paths.static_dir, &paths.output_dir).context("static assets step")?;

    let report = BuildReport {
        wasm: paths.wasm_target.clone(),
        bundle: paths.bundle.clone(),
        static_files,
    };
    info!(
        wasm = %report.wasm.display(),
        bundle = %report.bundle.display(),
        static_files,
        "build complete"
    );
    Ok(report)
}
