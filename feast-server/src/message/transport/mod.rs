//! Transport 传输层抽象
//!
//! 一行一个 JSON 对象。可插拔的传输层：
//! ```text
//!         ┌────────────────────┐
//!         │   Transport Trait  │  ◄── 可插拔接口
//!         └────────┬───────────┘
//!                  │
//!         ┌────────┴────────┐
//!         ▼                 ▼
//!   TcpTransport      MemoryTransport
//!   (TCP 协议)        (同进程通信 / 测试)
//! ```

mod memory;
mod tcp;

pub use memory::MemoryTransport;
pub use tcp::TcpTransport;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, FramedRead, FramedWrite, LinesCodec, LinesCodecError};

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Line exceeded the configured maximum; the rest of it was discarded and
    /// the connection is still usable
    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport 传输层特征
///
/// 所有传输实现必须实现此特征，支持按行读写和连接关闭。
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// 读取一行 (不含换行符)；对端关闭时返回 `None`
    async fn read_line(&self) -> Result<Option<String>, TransportError>;

    /// 写入一行 (自动追加换行符)
    async fn write_line(&self, line: &str) -> Result<(), TransportError>;

    /// 关闭写方向
    async fn close(&self) -> Result<(), TransportError>;

    /// 获取对端地址
    fn peer_addr(&self) -> Option<String> {
        None
    }
}

// ========== 分帧 ==========

/// Decoded inbound frame
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    Line(String),
    /// A line over the cap; its bytes were discarded up to the next newline
    Oversized,
}

/// `LinesCodec` that reports oversized lines as a frame instead of an error
///
/// A decode error would end the `FramedRead` stream; the connection has to
/// stay usable after an oversized line.
#[derive(Debug)]
pub(crate) struct LineFrames {
    inner: LinesCodec,
}

impl LineFrames {
    pub(crate) fn new(max_line_bytes: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_line_bytes),
        }
    }
}

fn map_frame(result: Result<Option<String>, LinesCodecError>) -> Result<Option<Frame>, LinesCodecError> {
    match result {
        Ok(line) => Ok(line.map(Frame::Line)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Oversized)),
        Err(e) => Err(e),
    }
}

impl Decoder for LineFrames {
    type Item = Frame;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        map_frame(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        map_frame(self.inner.decode_eof(buf))
    }
}

// ========== 辅助函数 ==========

/// 从分帧流读取一行
pub(crate) async fn read_from_stream<R: AsyncRead + Unpin>(
    reader: &mut FramedRead<R, LineFrames>,
    max_line_bytes: usize,
) -> Result<Option<String>, TransportError> {
    match reader.next().await {
        Some(Ok(Frame::Line(line))) => Ok(Some(line)),
        Some(Ok(Frame::Oversized)) => Err(TransportError::LineTooLong(max_line_bytes)),
        Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
            Err(TransportError::LineTooLong(max_line_bytes))
        }
        Some(Err(LinesCodecError::Io(e))) => Err(TransportError::Io(e)),
        None => Ok(None),
    }
}

/// 向分帧流写入一行
pub(crate) async fn write_to_stream<W: AsyncWrite + Unpin>(
    writer: &mut FramedWrite<W, LinesCodec>,
    line: &str,
) -> Result<(), TransportError> {
    writer.send(line).await.map_err(|e| match e {
        LinesCodecError::Io(io) => TransportError::Io(io),
        LinesCodecError::MaxLineLengthExceeded => {
            TransportError::Io(std::io::Error::other("outgoing line too long"))
        }
    })
}

/// 关闭分帧流 (flush + shutdown)
pub(crate) async fn close_stream<W: AsyncWrite + Unpin>(
    writer: &mut FramedWrite<W, LinesCodec>,
) -> Result<(), TransportError> {
    SinkExt::<&str>::close(writer).await.map_err(|e| match e {
        LinesCodecError::Io(io) => TransportError::Io(io),
        LinesCodecError::MaxLineLengthExceeded => {
            TransportError::Io(std::io::Error::other("close failed"))
        }
    })
}

/// Outbound line codec with the given cap
pub(crate) fn codec(max_line_bytes: usize) -> LinesCodec {
    LinesCodec::new_with_max_length(max_line_bytes)
}
