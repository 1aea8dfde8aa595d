//! RequestQueue - UI-facing request/response FIFOs over one worker
//!
//! The worker is the only owner of the [`Connection`]. On connection loss it
//! reconnects on a fixed delay (forever), replays the last successful
//! `login` so the new connection has the same identity, then retries the
//! request that was in flight. Queued requests are never dropped.
//!
//! A response that arrives but can not be read (over the line limit, or not
//! valid JSON) is not retried: the job gets a local `MalformedRequest`
//! failure and the queue moves on to the next request.

use shared::error::{AppError, ErrorCode};
use shared::message::{Request, RequestKind, Response};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};

struct Job {
    id: Uuid,
    request: Request,
    reply: Option<oneshot::Sender<Response>>,
}

/// Producer side, cheap to clone into every UI action
#[derive(Debug, Clone)]
pub struct RequestQueue {
    jobs: mpsc::UnboundedSender<Job>,
    shutdown: CancellationToken,
}

/// Consumer side of the response FIFO
#[derive(Debug)]
pub struct ResponseStream {
    responses: mpsc::UnboundedReceiver<Response>,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("kind", &self.request.kind())
            .finish()
    }
}

impl RequestQueue {
    /// Spawn the network worker; must be called inside a tokio runtime
    pub fn start(config: ClientConfig) -> (Self, ResponseStream, JoinHandle<()>) {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let worker = Worker {
            config,
            jobs: jobs_rx,
            responses: responses_tx,
            shutdown: shutdown.clone(),
            connection: None,
            last_login: None,
        };
        let handle = tokio::spawn(worker.run());

        (
            Self {
                jobs: jobs_tx,
                shutdown,
            },
            ResponseStream {
                responses: responses_rx,
            },
            handle,
        )
    }

    /// Queue a request; its response arrives on the [`ResponseStream`]
    pub fn enqueue(&self, request: Request) -> ClientResult<()> {
        self.push(request, None)
    }

    /// Queue a request and also wait for its response here
    ///
    /// The response is still published on the [`ResponseStream`].
    pub async fn submit(&self, request: Request) -> ClientResult<Response> {
        let (tx, rx) = oneshot::channel();
        self.push(request, Some(tx))?;
        rx.await.map_err(|_| ClientError::QueueClosed)
    }

    /// Stop the worker; queued requests are abandoned
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn push(&self, request: Request, reply: Option<oneshot::Sender<Response>>) -> ClientResult<()> {
        if self.shutdown.is_cancelled() {
            return Err(ClientError::QueueClosed);
        }
        let job = Job {
            id: Uuid::new_v4(),
            request,
            reply,
        };
        self.jobs.send(job).map_err(|_| ClientError::QueueClosed)
    }
}

impl ResponseStream {
    /// Every response received so far, without waiting
    pub fn try_drain(&mut self) -> Vec<Response> {
        let mut drained = Vec::new();
        while let Ok(response) = self.responses.try_recv() {
            drained.push(response);
        }
        drained
    }

    /// Next response; `None` once the worker has stopped and the FIFO is empty
    pub async fn recv(&mut self) -> Option<Response> {
        self.responses.recv().await
    }
}

// ========== Worker ==========

struct Worker {
    config: ClientConfig,
    jobs: mpsc::UnboundedReceiver<Job>,
    responses: mpsc::UnboundedSender<Response>,
    shutdown: CancellationToken,
    connection: Option<Connection>,
    last_login: Option<Request>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let job = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                job = self.jobs.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            let Some(response) = self.deliver(&job).await else {
                break;
            };
            self.remember_identity(&job.request, &response);

            let _ = self.responses.send(response.clone());
            if let Some(reply) = job.reply {
                let _ = reply.send(response);
            }
        }

        if let Some(connection) = self.connection.take() {
            let _ = connection.close().await;
        }
        tracing::debug!("request queue worker stopped");
    }

    /// Send until answered or the answer proves unreadable; `None` only on shutdown
    async fn deliver(&mut self, job: &Job) -> Option<Response> {
        loop {
            if self.connection.is_none() {
                self.connection = Some(self.reconnect().await?);
            }
            let connection = self.connection.as_mut()?;

            match connection.round_trip(&job.request).await {
                Ok(response) => return Some(response),
                Err(e) if !e.is_connection_lost() => {
                    // unreadable answer, not retried
                    tracing::warn!(
                        job_id = %job.id,
                        request_type = %job.request.kind(),
                        error = %e,
                        "unreadable response"
                    );
                    if e.breaks_framing() {
                        self.connection = None;
                    }
                    return Some(unreadable_response(&job.request, &e));
                }
                Err(e) => {
                    tracing::warn!(
                        job_id = %job.id,
                        request_type = %job.request.kind(),
                        error = %e,
                        "request failed, reconnecting"
                    );
                    self.connection = None;
                    if !self.pause().await {
                        return None;
                    }
                }
            }
        }
    }

    /// Connect, retrying on a fixed delay, and restore the logged-in identity
    async fn reconnect(&mut self) -> Option<Connection> {
        loop {
            match Connection::connect(&self.config.server_addr, self.config.max_line_bytes).await {
                Ok(mut connection) => {
                    let Some(login) = self.last_login.clone() else {
                        return Some(connection);
                    };
                    match connection.round_trip(&login).await {
                        Ok(response) if response.success => {
                            tracing::info!("session restored after reconnect");
                            return Some(connection);
                        }
                        Ok(response) => {
                            tracing::warn!(message = %response.message, "login replay rejected");
                            self.last_login = None;
                            return Some(connection);
                        }
                        Err(e) if e.is_connection_lost() => {
                            tracing::warn!(error = %e, "login replay failed");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "login replay unreadable, continuing logged out");
                            self.last_login = None;
                            if !e.breaks_framing() {
                                return Some(connection);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        addr = %self.config.server_addr,
                        error = %e,
                        delay_ms = self.config.reconnect_delay.as_millis() as u64,
                        "connect failed, retrying"
                    );
                }
            }
            if !self.pause().await {
                return None;
            }
        }
    }

    /// Sleep for the reconnect delay; false if shutdown fired meanwhile
    async fn pause(&self) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(self.config.reconnect_delay) => true,
        }
    }

    fn remember_identity(&mut self, request: &Request, response: &Response) {
        if !response.success {
            return;
        }
        match request.kind() {
            RequestKind::Login => self.last_login = Some(request.clone()),
            RequestKind::Logout | RequestKind::DeleteAccount => self.last_login = None,
            _ => {}
        }
    }
}

/// Local failure for a job whose response could not be read
fn unreadable_response(request: &Request, err: &ClientError) -> Response {
    Response::failure(
        request.kind().as_str(),
        &AppError::with_message(
            ErrorCode::MalformedRequest,
            format!("Response could not be read: {err}"),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_enqueue_after_shutdown_fails() {
        let config = ClientConfig::new("127.0.0.1:1").with_reconnect_delay(Duration::from_millis(10));
        let (queue, _responses, handle) = RequestQueue::start(config);
        queue.shutdown();
        handle.await.unwrap();
        assert!(matches!(
            queue.enqueue(Request::GetProfile),
            Err(ClientError::QueueClosed)
        ));
    }

    #[tokio::test]
    async fn test_try_drain_empty() {
        let config = ClientConfig::new("127.0.0.1:1");
        let (queue, mut responses, _handle) = RequestQueue::start(config);
        assert!(responses.try_drain().is_empty());
        queue.shutdown();
    }
}
