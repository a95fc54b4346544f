//! A loaded site project: configuration plus resolved paths.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::io::config::{ConfigSource, SiteConfig};
use crate::io::paths::SitePaths;

#[derive(Debug, Clone)]
pub struct Project {
    pub config: SiteConfig,
    pub paths: SitePaths,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        let paths = SitePaths::new(root, &config);
        Self { config, paths }
    }

    /// Load the project rooted at `root`, reading its config file if present.
    pub fn load(root: &Path) -> Result<Self> {
        let source = ConfigSource::locate(root);
        debug!(
            root = %root.display(),
            config = %source.path.display(),
            explicit = source.explicit,
            "loading project"
        );
        let config = source.load()?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }
}
