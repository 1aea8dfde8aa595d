//! Server Implementation
//!
//! TCP 服务器启动和管理

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::core::{Config, Result, ServerError, ServerState};
use crate::message::TcpServer;

/// Line-JSON TCP server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
    shutdown: CancellationToken,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancelling the token stops the accept loop and closes every session
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Bind `listen_addr`, serve until Ctrl-C or the shutdown token
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.config.listen_addr.clone(),
                source,
            })?;

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down...");
                shutdown.cancel();
            }
        });

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        tracing::info!("🍜 Feast server starting on {}", self.config.listen_addr);
        TcpServer::new(state, self.shutdown.clone())
            .serve(listener)
            .await;
        Ok(())
    }
}
