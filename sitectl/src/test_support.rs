//! Test-only fixtures: a scratch site on disk and scripted tools.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::SiteError;
use crate::io::config::SiteConfig;
use crate::io::process::{Invocation, ProcessRunner};
use crate::io::server::SiteServer;
use crate::project::Project;

/// Bytes the scripted packager writes as the wasm binary.
pub const FAKE_WASM: &[u8] = b"\0asm\x01\0\0\0";
/// Contents the scripted bundler writes as the bundle.
pub const FAKE_BUNDLE: &str = "(function () { run(); })();\n";

/// A temporary site project with the default layout.
///
/// Contains `src/main.js` and a small `static/` tree; no `pkg/` or `public/`.
pub struct TestSite {
    temp: tempfile::TempDir,
}

impl TestSite {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let root = temp.path();
        write(&root.join("src/main.js"), "import init from '../pkg/caniuse_rs.js';\n")?;
        write(&root.join("static/index.html"), "<!doctype html><title>caniuse</title>\n")?;
        write(&root.join("static/style.css"), "body { margin: 0; }\n")?;
        write(&root.join("static/img/logo.svg"), "<svg/>\n")?;
        Ok(Self { temp })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn project(&self) -> Project {
        Project::new(self.path(), SiteConfig::default())
    }

    /// Write `sitectl.toml` at the project root.
    pub fn write_config(&self, contents: &str) -> Result<()> {
        write(&self.path().join("sitectl.toml"), contents)
    }

    /// Relative path → contents of every file under `dir`, sorted.
    pub fn snapshot(&self, dir: &Path) -> Result<Vec<(PathBuf, Vec<u8>)>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.context("walk snapshot dir")?;
            if entry.file_type().is_file() {
                let rel = entry.path().strip_prefix(dir)?.to_path_buf();
                let bytes = fs::read(entry.path())
                    .with_context(|| format!("read {}", entry.path().display()))?;
                files.push((rel, bytes));
            }
        }
        Ok(files)
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

/// Process runner that records invocations and imitates the real tools.
///
/// The packager writes [`FAKE_WASM`]; the bundler writes [`FAKE_BUNDLE`];
/// anything else just succeeds. A program named with [`fail_on`] exits with
/// the given code instead, without side effects.
///
/// [`fail_on`]: ScriptedToolchain::fail_on
pub struct ScriptedToolchain {
    project: Project,
    failing: Option<(String, i32)>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedToolchain {
    pub fn new(project: &Project) -> Self {
        Self {
            project: project.clone(),
            failing: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn fail_on(mut self, program: &str, code: i32) -> Self {
        self.failing = Some((program.to_string(), code));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Program names in call order.
    pub fn programs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(Invocation::program_name)
            .collect()
    }
}

impl ProcessRunner for ScriptedToolchain {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls.borrow_mut().push(invocation.clone());
        let program = invocation.program_name();

        if let Some((failing, code)) = &self.failing
            && *failing == program
        {
            return Err(SiteError::process_failed(program, Some(*code)).into());
        }

        let tools = &self.project.config.tools;
        let paths = &self.project.paths;
        if program == tools.packager {
            let wasm = &paths.wasm_source;
            fs::create_dir_all(&paths.pkg_dir)?;
            fs::write(wasm, FAKE_WASM).with_context(|| format!("write {}", wasm.display()))?;
        } else if program == tools.bundler {
            fs::write(&paths.bundle, FAKE_BUNDLE)
                .with_context(|| format!("write {}", paths.bundle.display()))?;
        }
        Ok(())
    }
}

/// Server that records the directory it was asked to serve and returns.
#[derive(Default)]
pub struct RecordingServer {
    served: RefCell<Option<PathBuf>>,
    starts: Cell<usize>,
}

impl RecordingServer {
    pub fn served(&self) -> Option<PathBuf> {
        self.served.borrow().clone()
    }

    pub fn starts(&self) -> usize {
        self.starts.get()
    }
}

impl SiteServer for RecordingServer {
    fn serve(&self, root: &Path) -> Result<()> {
        self.starts.set(self.starts.get() + 1);
        *self.served.borrow_mut() = Some(root.to_path_buf());
        Ok(())
    }
}
