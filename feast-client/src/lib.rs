//! Feast Client - line-JSON client for the feast server
//!
//! UI code never touches the socket. It pushes requests into a
//! [`RequestQueue`] and reads answers from the paired [`ResponseStream`]:
//!
//! ```text
//!  UI ──enqueue/submit──▶ [request FIFO] ──▶ worker ──line──▶ server
//!  UI ◀──try_drain/recv── [response FIFO] ◀── worker ◀─line── server
//! ```
//!
//! One worker owns the connection, so request N's response is read before
//! request N+1 is written.

pub mod config;
pub mod connection;
pub mod error;
pub mod queue;

pub use config::ClientConfig;
pub use connection::Connection;
pub use error::{ClientError, ClientResult};
pub use queue::{RequestQueue, ResponseStream};

// Re-export shared protocol types for convenience
pub use shared::message::{Request, RequestKind, Response};
