// src/server/mod.rs

//! Static file server for the output directory.
//!
//! Binding is separate from serving so that a busy port is reported to the
//! caller as [`BuildError::PortUnavailable`] before anything else starts.

pub mod content_type;
pub mod handler;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::errors::{BuildError, Result};

/// A bound, not yet serving, static file server.
#[derive(Debug)]
pub struct StaticServer {
    listener: TcpListener,
    root: Arc<PathBuf>,
    local_addr: SocketAddr,
}

impl StaticServer {
    /// Bind the listener described by `config`.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = config.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BuildError::PortUnavailable { addr, source })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            root: Arc::new(config.root.clone()),
            local_addr,
        })
    }

    /// Address actually bound (differs from the config when port 0 was asked).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start serving on a background task.
    pub fn spawn(self) -> ServerHandle {
        let addr = self.local_addr;
        let root = Arc::clone(&self.root);
        let task = tokio::spawn(self.run());
        ServerHandle { addr, root, task }
    }

    /// Accept connections forever.
    pub async fn run(self) {
        info!(addr = %self.local_addr, root = ?self.root, "static server listening");

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    continue;
                }
            };

            let root = Arc::clone(&self.root);
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let root = Arc::clone(&root);
                    async move { handler::handle(&root, req).await }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    debug!(%peer, error = %err, "connection closed with error");
                }
            });
        }
    }
}

/// Handle to a running server task.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    root: Arc<PathBuf>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Stop accepting connections.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Bind `config` and start serving in the background.
pub async fn serve_with(config: &ServerConfig) -> Result<ServerHandle> {
    Ok(StaticServer::bind(config).await?.spawn())
}

/// Serve `root` on `127.0.0.1:port` in the background.
pub async fn serve(root: impl Into<PathBuf>, port: u16) -> Result<ServerHandle> {
    serve_with(&ServerConfig::new(root, port)).await
}
