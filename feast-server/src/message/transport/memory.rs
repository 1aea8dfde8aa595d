//! Memory 传输层实现 (同进程通信)

use async_trait::async_trait;
use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use super::{
    LineFrames, Transport, TransportError, close_stream, codec, read_from_stream, write_to_stream,
};

/// In-process transport over a `tokio::io::duplex` pipe
///
/// 用于测试或同进程客户端：same framing as TCP, no sockets.
#[derive(Debug)]
pub struct MemoryTransport {
    reader: Mutex<FramedRead<ReadHalf<DuplexStream>, LineFrames>>,
    writer: Mutex<FramedWrite<WriteHalf<DuplexStream>, LinesCodec>>,
    max_line_bytes: usize,
}

impl MemoryTransport {
    /// Two connected ends: (client, server)
    pub fn pair(max_line_bytes: usize) -> (Self, Self) {
        let (a, b) = tokio::io::duplex(max_line_bytes.max(1024) * 2);
        (
            Self::from_duplex(a, max_line_bytes),
            Self::from_duplex(b, max_line_bytes),
        )
    }

    fn from_duplex(stream: DuplexStream, max_line_bytes: usize) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader: Mutex::new(FramedRead::new(reader, LineFrames::new(max_line_bytes))),
            writer: Mutex::new(FramedWrite::new(writer, codec(max_line_bytes))),
            max_line_bytes,
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_line(&self) -> Result<Option<String>, TransportError> {
        let mut reader = self.reader.lock().await;
        read_from_stream(&mut reader, self.max_line_bytes).await
    }

    async fn write_line(&self, line: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        write_to_stream(&mut writer, line).await
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        close_stream(&mut writer).await
    }

    fn peer_addr(&self) -> Option<String> {
        Some("memory".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_pair_roundtrip_lines() {
        let (client, server) = MemoryTransport::pair(1024);
        client.write_line(r#"{"type":"logout"}"#).await.unwrap();
        assert_eq!(
            server.read_line().await.unwrap().as_deref(),
            Some(r#"{"type":"logout"}"#)
        );
        client.close().await.unwrap();
        assert!(server.read_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped() {
        let (client, server) = MemoryTransport::pair(16);
        // raw bytes, the client codec would refuse the long line
        let big = "x".repeat(64);
        {
            let mut writer = client.writer.lock().await;
            writer.get_mut().write_all(format!("{big}\nok\n").as_bytes()).await.unwrap();
        }
        assert!(matches!(
            server.read_line().await,
            Err(TransportError::LineTooLong(16))
        ));
        assert_eq!(server.read_line().await.unwrap().as_deref(), Some("ok"));
    }
}
