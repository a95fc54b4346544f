//! Canonical project paths derived from the configuration.

use std::path::{Path, PathBuf};

use super::config::SiteConfig;

/// All paths `sitectl` touches, resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub root: PathBuf,
    pub pkg_dir: PathBuf,
    pub static_dir: PathBuf,
    pub output_dir: PathBuf,
    pub entry_script: PathBuf,
    /// Wasm binary as written by the packager.
    pub wasm_source: PathBuf,
    /// Wasm binary as served from the output directory.
    pub wasm_target: PathBuf,
    pub bundle: PathBuf,
}

impl SitePaths {
    pub fn new(root: impl Into<PathBuf>, cfg: &SiteConfig) -> Self {
        let root = root.into();
        let pkg_dir = root.join(&cfg.paths.pkg_dir);
        let output_dir = root.join(&cfg.paths.output_dir);
        Self {
            root: root.clone(),
            pkg_dir: pkg_dir.clone(),
            static_dir: root.join(&cfg.paths.static_dir),
            output_dir: output_dir.clone(),
            entry_script: root.join(&cfg.paths.entry_script),
            wasm_source: pkg_dir.join(&cfg.artifacts.wasm_source),
            wasm_target: output_dir.join(&cfg.artifacts.wasm_target),
            bundle: output_dir.join(&cfg.artifacts.bundle),
        }
    }

    /// `path` relative to the project root when it lies inside it.
    ///
    /// External tools run with the project root as working directory, so
    /// their arguments use the short relative form.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
