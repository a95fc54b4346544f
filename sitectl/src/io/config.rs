//! Site configuration stored in `sitectl.toml` at the project root.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SiteError;

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "sitectl.toml";
/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "SITECTL_CONFIG";

/// Site configuration (TOML).
///
/// Every section is optional. Missing fields default to the layout of the
/// caniuse.rs site, so a project with that layout needs no config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub paths: PathsConfig,
    pub artifacts: ArtifactsConfig,
    pub tools: ToolsConfig,
    pub serve: ServeConfig,
    pub deploy: DeployConfig,
}

/// Project-relative locations read and written by `build`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory the packager writes its output into.
    pub pkg_dir: PathBuf,
    /// Static assets merged into the output directory.
    pub static_dir: PathBuf,
    /// The deployable site.
    pub output_dir: PathBuf,
    /// Bundler entry point.
    pub entry_script: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pkg_dir: PathBuf::from("pkg"),
            static_dir: PathBuf::from("static"),
            output_dir: PathBuf::from("public"),
            entry_script: PathBuf::from("src/main.js"),
        }
    }
}

/// File names of the build products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactsConfig {
    /// Wasm binary name under `pkg_dir`.
    pub wasm_source: String,
    /// Name the wasm binary gets in `output_dir`.
    pub wasm_target: String,
    /// Bundle name in `output_dir`.
    pub bundle: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            wasm_source: "caniuse_rs_bg.wasm".to_string(),
            wasm_target: "caniuse_rs.wasm".to_string(),
            bundle: "caniuse_rs.js".to_string(),
        }
    }
}

/// External programs, looked up on `PATH` unless given as a path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub packager: String,
    pub bundler: String,
    pub sync: String,
    pub remote_shell: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            packager: "wasm-pack".to_string(),
            bundler: "rollup".to_string(),
            sync: "rsync".to_string(),
            remote_shell: "ssh".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Loopback address to bind.
    pub bind: String,
    /// Port to listen on (0 picks an ephemeral port).
    pub port: u16,
    /// Answer unknown paths with `index.html` instead of 404.
    pub index_fallback: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            index_fallback: true,
        }
    }
}

/// Remote target for `deploy`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub host: String,
    /// Staging directory on the remote host.
    pub remote_tmp: String,
    /// Live web root on the remote host.
    pub web_root: String,
    /// Account that ends up owning the deployed files.
    pub owner: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            host: "caniuse.rs".to_string(),
            remote_tmp: "/tmp/caniuse".to_string(),
            web_root: "/srv/http/caniuse.rs/".to_string(),
            owner: "root".to_string(),
        }
    }
}

impl ServeConfig {
    /// Parsed bind address. Only valid after [`SiteConfig::validate`].
    pub fn ip(&self) -> Result<IpAddr> {
        self.bind
            .parse()
            .with_context(|| format!("parse serve.bind `{}`", self.bind))
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("paths.pkg_dir", &self.paths.pkg_dir),
            ("paths.static_dir", &self.paths.static_dir),
            ("paths.output_dir", &self.paths.output_dir),
            ("paths.entry_script", &self.paths.entry_script),
        ];
        for (key, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(invalid(format!("{key} must not be empty")));
            }
        }
        if self.paths.output_dir.file_name().is_none() {
            return Err(invalid("paths.output_dir must end in a directory name"));
        }

        let artifacts = [
            ("artifacts.wasm_source", &self.artifacts.wasm_source),
            ("artifacts.wasm_target", &self.artifacts.wasm_target),
            ("artifacts.bundle", &self.artifacts.bundle),
        ];
        for (key, name) in artifacts {
            if !is_bare_file_name(name) {
                return Err(invalid(format!(
                    "{key} must be a plain file name, got `{name}`"
                )));
            }
        }

        let required = [
            ("tools.packager", &self.tools.packager),
            ("tools.bundler", &self.tools.bundler),
            ("tools.sync", &self.tools.sync),
            ("tools.remote_shell", &self.tools.remote_shell),
            ("deploy.host", &self.deploy.host),
            ("deploy.owner", &self.deploy.owner),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(invalid(format!("{key} must not be empty")));
            }
        }

        match self.serve.bind.parse::<IpAddr>() {
            Ok(ip) if ip.is_loopback() => {}
            Ok(ip) => {
                return Err(invalid(format!(
                    "serve.bind must be a loopback address, got {ip}"
                )));
            }
            Err(_) => {
                return Err(invalid(format!(
                    "serve.bind must be an IP address, got `{}`",
                    self.serve.bind
                )));
            }
        }

        for (key, value) in [
            ("deploy.remote_tmp", &self.deploy.remote_tmp),
            ("deploy.web_root", &self.deploy.web_root),
        ] {
            if !value.starts_with('/') || value.trim_end_matches('/').is_empty() {
                return Err(invalid(format!(
                    "{key} must be an absolute path below `/`, got `{value}`"
                )));
            }
        }

        // These are spliced unquoted into the remote shell script.
        for (key, value) in [
            ("deploy.host", &self.deploy.host),
            ("deploy.owner", &self.deploy.owner),
            ("deploy.remote_tmp", &self.deploy.remote_tmp),
            ("deploy.web_root", &self.deploy.web_root),
        ] {
            if !value.chars().all(is_remote_safe) {
                return Err(invalid(format!(
                    "{key} may only contain letters, digits and `._/:@-`, got `{value}`"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> anyhow::Error {
    SiteError::InvalidConfig(msg.into()).into()
}

fn is_remote_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "._/:@-".contains(c)
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Location of the config file and how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// Named through `$SITECTL_CONFIG`; such a file must exist.
    pub explicit: bool,
}

impl ConfigSource {
    /// `$SITECTL_CONFIG` if set, else `root/sitectl.toml`.
    pub fn locate(root: &Path) -> Self {
        Self::from_env_value(root, env::var_os(CONFIG_ENV_VAR))
    }

    fn from_env_value(root: &Path, value: Option<OsString>) -> Self {
        match value {
            Some(path) if !path.is_empty() => Self {
                path: root.join(path),
                explicit: true,
            },
            _ => Self {
                path: root.join(CONFIG_FILE_NAME),
                explicit: false,
            },
        }
    }

    /// Load the config, falling back to defaults only for the implicit file.
    pub fn load(&self) -> Result<SiteConfig> {
        if self.explicit && !self.path.exists() {
            return Err(invalid(format!(
                "{} named by ${CONFIG_ENV_VAR} does not exist",
                self.path.display()
            )));
        }
        load_config(&self.path)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SiteConfig::default()`.
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        let cfg = SiteConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SiteConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}
