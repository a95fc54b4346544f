//! Orchestration for `sitectl deploy`.
//!
//! After a full build the output directory is pushed to a staging directory
//! on the remote host, then a remote script swaps it into the live web root.
//! The remote script runs under `set -e`; a failure halfway leaves the web
//! root partially updated and nothing is rolled back.

use std::ffi::OsString;

use anyhow::{Context, Result, anyhow};
use tracing::{info, instrument};

use crate::build::run_build;
use crate::io::config::DeployConfig;
use crate::io::process::{Invocation, ProcessRunner};
use crate::project::Project;

/// Name of the output directory, which is also its name once staged remotely.
fn staged_name(project: &Project) -> Result<String> {
    project
        .paths
        .output_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            anyhow!(
                "output directory {} has no name",
                project.paths.output_dir.display()
            )
        })
}

fn remote_tmp(cfg: &DeployConfig) -> &str {
    cfg.remote_tmp.trim_end_matches('/')
}

/// `<sync> -rzz <output_dir> <host>:<remote_tmp>/`
pub fn sync_invocation(project: &Project) -> Invocation {
    let deploy = &project.config.deploy;
    let paths = &project.paths;
    Invocation::new(&project.config.tools.sync)
        .arg("-rzz")
        .arg(paths.relative(&paths.output_dir))
        .arg(format!("{}:{}/", deploy.host, remote_tmp(deploy)))
}

/// Remote script that moves the staged directory into the web root.
pub fn remote_script(cfg: &DeployConfig, staged_name: &str) -> String {
    let staged = format!("{}/{}", remote_tmp(cfg), staged_name);
    format!(
        "\nset -e\n\
         sudo chown {owner}: {staged}\n\
         sudo rsync -r --delete {staged}/* {web_root}\n\
         sudo rm -r {staged}\n",
        owner = cfg.owner,
        web_root = cfg.web_root,
    )
}

/// `<remote_shell> <host> <script>`
pub fn remote_shell_invocation(project: &Project) -> Result<Invocation> {
    let deploy = &project.config.deploy;
    let script = remote_script(deploy, &staged_name(project)?);
    Ok(Invocation::new(&project.config.tools.remote_shell)
        .arg(&deploy.host)
        .arg(script))
}

/// Build the site and publish it to the configured host.
#[instrument(skip_all, fields(host = %project.config.deploy.host))]
pub fn run_deploy<R: ProcessRunner>(
    project: &Project,
    runner: &R,
    forwarded: &[OsString],
) -> Result<()> {
    run_build(project, runner, forwarded)?;

    let remote_shell = remote_shell_invocation(project)?;
    runner
        .run(&sync_invocation(project))
        .context("sync output to remote host")?;
    runner
        .run(&remote_shell)
        .context("swap remote web root")?;

    info!(web_root = %project.config.deploy.web_root, "deploy complete");
    Ok(())
}
