//! Local static file server for `sitectl serve`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use super::config::ServeConfig;

/// Serves a directory until the process is interrupted.
pub trait SiteServer {
    fn serve(&self, root: &Path) -> Result<()>;
}

/// axum/tower-http server on a single-threaded tokio runtime.
#[derive(Debug, Clone)]
pub struct HttpServer {
    addr: SocketAddr,
    index_fallback: bool,
}

impl HttpServer {
    pub fn from_config(cfg: &ServeConfig) -> Result<Self> {
        Ok(Self {
            addr: SocketAddr::new(cfg.ip()?, cfg.port),
            index_fallback: cfg.index_fallback,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl SiteServer for HttpServer {
    fn serve(&self, root: &Path) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("build tokio runtime")?;
        runtime.block_on(async {
            let listener = TcpListener::bind(self.addr)
                .await
                .with_context(|| format!("bind {}", self.addr))?;
            let local = listener.local_addr().context("read bound address")?;

            println!("Starting development server on http://{local}");
            info!(addr = %local, root = %root.display(), "listening");

            axum::serve(listener, router(root, self.index_fallback))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("serve http")?;

            info!("server stopped");
            Ok::<(), anyhow::Error>(())
        })
    }
}

/// Static file router rooted at `root`.
///
/// Directory requests answer with their `index.html`. With `index_fallback`,
/// paths that match no file answer with the root `index.html` so client-side
/// routes survive a reload.
pub fn router(root: &Path, index_fallback: bool) -> Router {
    let dir = ServeDir::new(root).append_index_html_on_directories(true);
    if index_fallback {
        let index: PathBuf = root.join("index.html");
        Router::new().fallback_service(dir.fallback(ServeFile::new(index)))
    } else {
        Router::new().fallback_service(dir)
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(err = %err, "failed to listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("interrupt received, shutting down");
}
