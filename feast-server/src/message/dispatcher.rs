//! SessionDispatcher - one request line in, one response line out
//!
//! A connection starts anonymous. `login` binds it to an account and
//! `logout` (or disconnect) unbinds it; only `signup` and `login` are
//! accepted on an anonymous connection.

use std::sync::Arc;

use shared::error::{AppError, AppResult};
use shared::message::{Request, RequestKind, Response};
use tokio_util::sync::CancellationToken;

use super::handlers::{account, admin, catalog, delivery, orders};
use super::transport::{Transport, TransportError};
use crate::core::ServerState;
use crate::sessions::ConnectionId;

/// Response `type` used when the request's own tag can not be read
pub const UNKNOWN_REQUEST_TYPE: &str = "unknown";

/// Sent in place of a response that can not be encoded, so the request still
/// gets exactly one line back
const ENCODE_FAILURE_LINE: &str =
    r#"{"type":"unknown","success":false,"message":"Response could not be encoded","code":9901}"#;

fn encode_line(response: &Response) -> String {
    response.to_line().unwrap_or_else(|e| {
        tracing::error!(response_type = %response.kind, error = %e, "response encode failed");
        ENCODE_FAILURE_LINE.to_string()
    })
}

/// Per-connection state
#[derive(Debug, Clone)]
pub struct Session {
    pub connection: ConnectionId,
    pub peer: Option<String>,
    user: Option<String>,
}

impl Session {
    pub fn new(connection: ConnectionId, peer: Option<String>) -> Self {
        Self {
            connection,
            peer,
            user: None,
        }
    }

    /// Account bound by the last successful login
    pub fn username(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub(crate) fn bind(&mut self, username: &str) {
        self.user = Some(username.to_string());
    }

    pub(crate) fn unbind(&mut self) -> Option<String> {
        self.user.take()
    }
}

#[derive(Debug, Clone)]
pub struct SessionDispatcher {
    state: ServerState,
}

impl SessionDispatcher {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Open a session for a freshly accepted connection
    pub fn open_session(&self, peer: Option<String>) -> Session {
        Session::new(self.state.next_connection_id(), peer)
    }

    /// Decode one request line, route it and build its response
    ///
    /// Never fails: every problem is reported as a failure response.
    pub async fn handle_line(&self, session: &mut Session, line: &str) -> Response {
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                return Response::failure(
                    UNKNOWN_REQUEST_TYPE,
                    &AppError::malformed(format!("invalid JSON: {e}")),
                );
            }
        };

        let Some(tag) = value.get("type").and_then(|t| t.as_str()) else {
            return Response::failure(
                UNKNOWN_REQUEST_TYPE,
                &AppError::malformed("missing string field `type`"),
            );
        };
        let Some(kind) = RequestKind::parse(tag) else {
            tracing::debug!(request_type = %tag, "unsupported request");
            return Response::failure(tag, &AppError::unsupported(tag));
        };

        let request: Request = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Response::failure(kind.as_str(), &AppError::malformed(e.to_string()));
            }
        };

        self.dispatch(session, request).await
    }

    /// Route an already decoded request
    pub async fn dispatch(&self, session: &mut Session, request: Request) -> Response {
        let kind = request.kind();
        if kind.requires_session() && !session.is_authenticated() {
            return Response::failure(kind.as_str(), &AppError::not_authenticated());
        }

        match self.route(session, request).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_server_error() {
                    tracing::error!(request_type = %kind, error = %e, "request failed");
                } else {
                    tracing::debug!(request_type = %kind, code = ?e.code, "request rejected");
                }
                Response::failure(kind.as_str(), &e)
            }
        }
    }

    async fn route(&self, session: &mut Session, request: Request) -> AppResult<Response> {
        let state = &self.state;
        match request {
            // ========== Account ==========
            Request::Signup(payload) => account::signup(state, payload).await,
            Request::Login(payload) => account::login(state, session, payload),
            Request::Logout => account::logout(state, session),
            Request::GetProfile => account::get_profile(state, session),
            Request::UpdateProfile(update) => account::update_profile(state, session, update).await,
            Request::DeleteAccount(payload) => account::delete_account(state, session, payload),
            Request::SavePayment(card) => account::save_payment(state, session, card).await,

            // ========== Catalog ==========
            Request::GetRestaurants(query) => catalog::get_restaurants(state, session, query),
            Request::GetMenu(target) => catalog::get_menu(state, session, target),
            Request::AddMenuItem(item) => catalog::add_menu_item(state, session, item),
            Request::UpdateMenuItem(update) => catalog::update_menu_item(state, session, update),
            Request::RemoveMenuItem(target) => catalog::remove_menu_item(state, session, target),

            // ========== Orders ==========
            Request::PlaceOrder(payload) => orders::place_order(state, session, payload).await,
            Request::GetOrders => orders::get_orders(state, session),
            Request::GetOrder(target) => orders::get_order(state, session, target),
            Request::GetNotifications => orders::get_notifications(state, session),
            Request::MarkReady(target) => orders::mark_ready(state, session, target),

            // ========== Delivery ==========
            Request::FindDeliveries(search) => delivery::find_deliveries(state, session, search).await,
            Request::PickUp(target) => delivery::pick_up(state, session, target),
            Request::MarkDelivered => delivery::mark_delivered(state, session),

            // ========== Admin ==========
            Request::CancelOrder(payload) => admin::cancel_order(state, session, payload),
            Request::ListUsers => admin::list_users(state, session),
            Request::DeleteUser(target) => admin::delete_user(state, session, target),
        }
    }

    /// Release everything the connection held
    pub fn on_disconnect(&self, session: &mut Session) {
        if let Some(username) = session.unbind() {
            self.state.sessions.on_logout(&username, session.connection);
        }
        tracing::debug!(connection = session.connection, "session closed");
    }

    /// Serve one connection until the peer hangs up or shutdown fires
    pub async fn run_session(&self, transport: Arc<dyn Transport>, shutdown: CancellationToken) {
        let mut session = self.open_session(transport.peer_addr());
        tracing::Span::current().record("connection_id", session.connection);
        tracing::debug!(connection = session.connection, peer = ?session.peer, "session opened");

        loop {
            let read = tokio::select! {
                _ = shutdown.cancelled() => break,
                read = transport.read_line() => read,
            };

            let response = match read {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => self.handle_line(&mut session, &line).await,
                Ok(None) => break,
                Err(TransportError::LineTooLong(max)) => {
                    tracing::warn!(connection = session.connection, max, "oversized request line");
                    Response::failure(
                        UNKNOWN_REQUEST_TYPE,
                        &AppError::malformed(format!("request line exceeds {max} bytes")),
                    )
                }
                Err(TransportError::Io(e)) => {
                    tracing::debug!(connection = session.connection, error = %e, "read failed");
                    break;
                }
            };

            let line = encode_line(&response);
            if let Err(e) = transport.write_line(&line).await {
                tracing::debug!(connection = session.connection, error = %e, "write failed");
                break;
            }
        }

        self.on_disconnect(&mut session);
        let _ = transport.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::db::Storage;
    use crate::services::{CardValidator, StaticGeocoder};
    use crate::users::PasswordHasher;
    use shared::error::ErrorCode;

    #[derive(Debug)]
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plaintext: &str) -> AppResult<String> {
            Ok(format!("plain:{plaintext}"))
        }

        fn verify(&self, plaintext: &str, digest: &str) -> bool {
            digest == format!("plain:{plaintext}")
        }
    }

    #[test]
    fn test_encode_failure_line_is_a_failure_response() {
        let response: Response = serde_json::from_str(ENCODE_FAILURE_LINE).unwrap();
        assert!(!response.success);
        assert_eq!(response.kind, UNKNOWN_REQUEST_TYPE);
        assert_eq!(response.code, Some(ErrorCode::InternalError));

        let ok = Response::ok("logout", "Logged out");
        assert_eq!(encode_line(&ok), ok.to_line().unwrap());
    }

    fn dispatcher() -> SessionDispatcher {
        let state = ServerState::new(
            Config::default(),
            Storage::open_in_memory().unwrap(),
            Arc::new(StaticGeocoder::new()),
            Arc::new(CardValidator),
            Arc::new(PlainHasher),
        );
        SessionDispatcher::new(state)
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let d = dispatcher();
        let mut session = d.open_session(None);
        let resp = d.handle_line(&mut session, "{not json").await;
        assert!(!resp.success);
        assert_eq!(resp.code, Some(ErrorCode::MalformedRequest));
        assert_eq!(resp.kind, UNKNOWN_REQUEST_TYPE);
    }

    #[tokio::test]
    async fn test_unknown_tag_is_unsupported() {
        let d = dispatcher();
        let mut session = d.open_session(None);
        let resp = d.handle_line(&mut session, r#"{"type":"teleport"}"#).await;
        assert_eq!(resp.code, Some(ErrorCode::UnsupportedRequest));
        assert_eq!(resp.kind, "teleport");
    }

    #[tokio::test]
    async fn test_missing_fields_are_malformed() {
        let d = dispatcher();
        let mut session = d.open_session(None);
        let resp = d.handle_line(&mut session, r#"{"type":"login","username":"a"}"#).await;
        assert_eq!(resp.code, Some(ErrorCode::MalformedRequest));
        assert_eq!(resp.kind, "login");
    }

    #[tokio::test]
    async fn test_anonymous_session_rejected() {
        let d = dispatcher();
        let mut session = d.open_session(None);
        let resp = d.handle_line(&mut session, r#"{"type":"get_orders"}"#).await;
        assert_eq!(resp.code, Some(ErrorCode::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_connection_ids_are_distinct() {
        let d = dispatcher();
        let a = d.open_session(None);
        let b = d.open_session(None);
        assert_ne!(a.connection, b.connection);
    }
}
