//! Real sockets: Server on an ephemeral port, feast-client on the other end

mod common;

use std::time::Duration;

use common::{Harness, signup};
use feast_client::Connection;
use feast_server::Server;
use shared::error::ErrorCode;
use shared::message::Request;
use shared::models::RoleKind;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_serve_and_shutdown() {
    let h = Harness::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = Server::with_state(h.state.config.clone(), h.state.clone());
    let shutdown = server.shutdown_token();
    let serving = tokio::spawn(async move { server.serve(listener).await });

    let mut conn = Connection::connect(&addr, 64 * 1024).await.unwrap();
    let resp = conn
        .round_trip(&signup("alice", RoleKind::Customer, "alice st"))
        .await
        .unwrap();
    assert!(resp.success);
    let resp = conn.round_trip(&Request::login("alice", "secret")).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.kind, "login");

    // a second connection has its own session
    let mut other = Connection::connect(&addr, 64 * 1024).await.unwrap();
    let resp = other.round_trip(&Request::GetProfile).await.unwrap();
    assert_eq!(resp.code, Some(ErrorCode::NotAuthenticated));

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
