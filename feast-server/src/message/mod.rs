//! 消息模块 - 行 JSON 协议的服务端
//!
//! ```text
//! TcpListener ──accept──▶ TcpTransport ──read_line──▶ SessionDispatcher ──▶ handlers::*
//!                              ▲                              │
//!                              └─────────write_line───────────┘
//! ```
//!
//! Every request line gets exactly one response line, in order.

pub mod dispatcher;
pub mod handlers;
pub mod tcp_server;
pub mod transport;

pub use dispatcher::{Session, SessionDispatcher};
pub use tcp_server::TcpServer;
pub use transport::{MemoryTransport, TcpTransport, Transport, TransportError};
