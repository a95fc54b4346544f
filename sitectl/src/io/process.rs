//! Blocking child process execution with inherited stdio.
//!
//! Tool output goes straight to the terminal. The only thing inspected is the
//! exit status: anything but success aborts the caller.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument};

use crate::error::SiteError;

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program name as shown in logs and errors.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Space-joined command line, for logging only.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(OsStr::to_string_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external programs to completion.
pub trait ProcessRunner {
    /// Run `invocation`, failing unless it exits successfully.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Spawns real processes in a fixed working directory.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    workdir: PathBuf,
}

impl SystemRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl ProcessRunner for SystemRunner {
    #[instrument(skip_all, fields(program = %invocation.program_name()))]
    fn run(&self, invocation: &Invocation) -> Result<()> {
        info!(command = %invocation.display(), "running");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&self.workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                error!(err = %e, "failed to spawn command");
                return Err(SiteError::Spawn {
                    program: invocation.program_name(),
                    source: e,
                }
                .into());
            }
        };

        let status = child
            .wait()
            .with_context(|| format!("wait for `{}`", invocation.program_name()))?;

        debug!(exit_code = ?status.code(), "command finished");
        if !status.success() {
            let code = status.code();
            return Err(SiteError::process_failed(invocation.program_name(), code).into());
        }
        Ok(())
    }
}
