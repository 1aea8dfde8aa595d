//! TCP 服务器实现
//!
//! 负责处理客户端连接，包括：
//! - 监听连接
//! - 每个连接一个任务 (SessionDispatcher::run_session)
//! - 关闭信号时停止接受新连接并结束所有会话

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::dispatcher::SessionDispatcher;
use super::transport::{TcpTransport, Transport};
use crate::core::ServerState;

#[derive(Debug, Clone)]
pub struct TcpServer {
    dispatcher: SessionDispatcher,
    max_line_bytes: usize,
    shutdown: CancellationToken,
}

impl TcpServer {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self {
            max_line_bytes: state.config.max_line_bytes,
            dispatcher: SessionDispatcher::new(state),
            shutdown,
        }
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Main accept loop, returns once the shutdown token fires
    pub async fn serve(&self, listener: TcpListener) {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("TCP server listening on {}", addr);
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("TCP server shutting down");
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::debug!("Client connected: {}", addr);
                            self.spawn_client_handler(stream, addr);
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }
    }

    /// Spawn a new task to handle client connection
    fn spawn_client_handler(&self, stream: TcpStream, addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed for {}: {}", addr, e);
        }
        let transport: Arc<dyn Transport> =
            Arc::new(TcpTransport::from_stream(stream, self.max_line_bytes));
        let dispatcher = self.dispatcher.clone();
        let shutdown = self.shutdown.clone();

        let span = tracing::info_span!(
            "session",
            peer = %addr,
            connection_id = tracing::field::Empty
        );
        tokio::spawn(
            async move {
                dispatcher.run_session(transport, shutdown).await;
                tracing::debug!("Client {} disconnected", addr);
            }
            .instrument(span),
        );
    }
}
