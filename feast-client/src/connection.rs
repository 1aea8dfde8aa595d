//! One line-JSON connection to the server

use futures::{SinkExt, StreamExt};
use shared::message::{Request, Response};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};

use crate::error::{ClientError, ClientResult};

/// Request/response over a single TCP stream
///
/// Not shared: whoever owns it sends a request and reads the answer before
/// sending the next one.
#[derive(Debug)]
pub struct Connection {
    framed: Framed<TcpStream, LinesCodec>,
}

impl Connection {
    pub async fn connect(addr: &str, max_line_bytes: usize) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Connection(format!("{addr}: {e}")))?;
        stream.set_nodelay(true)?;
        Ok(Self {
            framed: Framed::new(stream, LinesCodec::new_with_max_length(max_line_bytes)),
        })
    }

    /// Send one request and wait for its response
    pub async fn round_trip(&mut self, request: &Request) -> ClientResult<Response> {
        let line = request.to_line()?;
        self.framed.send(line).await?;

        match self.framed.next().await {
            Some(Ok(line)) => Ok(serde_json::from_str(&line)?),
            Some(Err(e)) => Err(e.into()),
            None => Err(ClientError::Closed),
        }
    }

    pub async fn close(mut self) -> ClientResult<()> {
        SinkExt::<String>::close(&mut self.framed).await?;
        Ok(())
    }
}
