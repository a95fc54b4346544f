//! Command dispatch.
//!
//! Only the first argument is interpreted. Everything after the command name,
//! including `--` and whatever follows it, is forwarded to the packager as is.

use std::ffi::OsString;

use clap::ValueEnum;

use crate::error::SiteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// Compile, bundle, and assemble the output directory.
    Build,
    /// Build, then serve the output directory locally.
    Serve,
    /// Build, then publish the output directory to the remote host.
    Deploy,
}

/// A dispatched command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    /// Arguments after the command name, untouched.
    pub forwarded: Vec<OsString>,
}

/// Dispatch a full argument list (program name first).
pub fn parse_args<I>(args: I) -> Result<Request, SiteError>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::<OsString>::into).skip(1);
    let token = args
        .next()
        .ok_or_else(|| SiteError::usage("no command given"))?;
    let name = token
        .to_str()
        .ok_or_else(|| SiteError::usage("command is not valid UTF-8"))?;
    let command = <Command as ValueEnum>::from_str(name, false)
        .map_err(|_| SiteError::usage(format!("unknown command `{name}`")))?;
    Ok(Request {
        command,
        forwarded: args.collect(),
    })
}

/// Usage text printed for a missing or unknown command.
pub fn usage() -> String {
    let commands = Command::value_variants()
        .iter()
        .filter_map(ValueEnum::to_possible_value)
        .map(|value| value.get_name().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "
        usage: sitectl <command> [options...] [-- <extra_options>...]
            commands: {commands}
            options:
                --dev          Create a development build. Passed to wasm-pack.
                --profiling    Create a profiling build. Passed to wasm-pack.
                --release      Create a release build. Passed to wasm-pack.
            extra options will be passed to cargo build
        "
    )
}
