//! TCP 传输层实现

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use super::{
    LineFrames, Transport, TransportError, close_stream, codec, read_from_stream, write_to_stream,
};

/// TCP 传输实现
#[derive(Debug)]
pub struct TcpTransport {
    reader: Mutex<FramedRead<OwnedReadHalf, LineFrames>>,
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
    max_line_bytes: usize,
    addr: Option<String>,
}

impl TcpTransport {
    /// 连接到指定地址
    pub async fn connect(addr: &str, max_line_bytes: usize) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::from_stream(stream, max_line_bytes))
    }

    /// 从已有的 TcpStream 创建
    pub fn from_stream(stream: TcpStream, max_line_bytes: usize) -> Self {
        let peer_addr = stream.peer_addr().ok().map(|a| a.to_string());
        let (reader, writer) = stream.into_split();
        Self {
            reader: Mutex::new(FramedRead::new(reader, LineFrames::new(max_line_bytes))),
            writer: Mutex::new(FramedWrite::new(writer, codec(max_line_bytes))),
            max_line_bytes,
            addr: peer_addr,
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
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
        self.addr.clone()
    }
}
