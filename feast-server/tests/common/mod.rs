//! Shared fixtures: in-memory state, geocoder table, memory-transport clients

#![allow(dead_code)]

use std::sync::Arc;

use feast_server::message::{MemoryTransport, Transport};
use feast_server::services::{CardValidator, StaticGeocoder};
use feast_server::users::PasswordHasher;
use feast_server::{Config, ServerState, SessionDispatcher};
use feast_server::db::Storage;
use shared::error::AppResult;
use shared::message::{Request, Response, SignupPayload};
use shared::models::{GeoPoint, MenuItemCreate, PaymentCard, RoleKind};
use tokio_util::sync::CancellationToken;

pub const ORIGIN: GeoPoint = GeoPoint {
    lat: 40.0,
    lon: -86.0,
};

/// Fast stand-in so tests don't pay for argon2
#[derive(Debug)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        Ok(format!("plain:{plaintext}"))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        digest == format!("plain:{plaintext}")
    }
}

pub struct Harness {
    pub state: ServerState,
    pub dispatcher: SessionDispatcher,
    pub shutdown: CancellationToken,
}

impl Harness {
    pub fn new() -> Self {
        let geo = StaticGeocoder::new();
        geo.insert("bob st", ORIGIN);
        geo.insert("carl st", ORIGIN.offset_north_km(1.0));
        geo.insert("alice st", ORIGIN.offset_north_km(3.0));
        geo.insert("far away", ORIGIN.offset_north_km(50.0));

        let mut config = Config::default();
        config.max_service_radius_km = 20.0;
        config.delivery_fee = 5.0;
        config.default_search_radius_km = 5.0;

        let state = ServerState::new(
            config,
            Storage::open_in_memory().unwrap(),
            Arc::new(geo),
            Arc::new(CardValidator),
            Arc::new(PlainHasher),
        );
        state.seed_admin("root", "rootpw").unwrap();

        Self {
            dispatcher: SessionDispatcher::new(state.clone()),
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// A fresh connection served by its own session task
    pub fn connect(&self) -> TestClient {
        let (client, server) = MemoryTransport::pair(self.state.config.max_line_bytes);
        let dispatcher = self.dispatcher.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            dispatcher.run_session(Arc::new(server), shutdown).await;
        });
        TestClient { transport: client }
    }

    /// Signup + login on a new connection
    pub async fn login_as(&self, signup: Request, username: &str) -> TestClient {
        let client = self.connect();
        client.ok(signup).await;
        client.ok(Request::login(username, "secret")).await;
        client
    }

    /// bob's restaurant online with A (5.00) and B (3.00)
    pub async fn bob(&self) -> TestClient {
        let bob = self
            .login_as(signup("bob", RoleKind::Restaurant, "bob st"), "bob")
            .await;
        bob.ok(Request::AddMenuItem(menu_item("A", 5.0))).await;
        bob.ok(Request::AddMenuItem(menu_item("B", 3.0))).await;
        bob
    }
}

pub struct TestClient {
    transport: MemoryTransport,
}

impl TestClient {
    pub async fn send_raw(&self, line: &str) -> Response {
        self.transport.write_line(line).await.unwrap();
        let reply = self.transport.read_line().await.unwrap().expect("connection closed");
        serde_json::from_str(&reply).unwrap()
    }

    pub async fn call(&self, request: Request) -> Response {
        self.send_raw(&request.to_line().unwrap()).await
    }

    /// Call and insist on success
    pub async fn ok(&self, request: Request) -> Response {
        let kind = request.kind();
        let response = self.call(request).await;
        assert!(response.success, "{kind} failed: {}", response.message);
        response
    }

    pub async fn close(&self) {
        self.transport.close().await.unwrap();
    }
}

pub fn signup(username: &str, role: RoleKind, address: &str) -> Request {
    Request::Signup(SignupPayload {
        username: username.into(),
        password: "secret".into(),
        role,
        address: address.into(),
        phone: "555-0100".into(),
        email: format!("{username}@example.com"),
        cuisine: (role == RoleKind::Restaurant).then(|| "noodles".to_string()),
    })
}

pub fn menu_item(name: &str, price: f64) -> MenuItemCreate {
    MenuItemCreate {
        name: name.into(),
        price,
        description: String::new(),
        photo: None,
        available: None,
    }
}

pub fn card() -> PaymentCard {
    PaymentCard {
        card_number: "4111111111111111".into(),
        expiry: "12/99".into(),
        cvv: "123".into(),
    }
}
