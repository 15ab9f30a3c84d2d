//! In-process test server and HTTP helpers shared by the integration tests.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use kaimono_server::{
    config::ServerConfig,
    domain::{ProductId, ProductSummary},
    infrastructure::product::InMemoryProductCatalog,
    ui::{DISPLAY_NAME_HEADER, Server, USER_ID_HEADER},
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};

/// Server bound to an ephemeral port, stopped when the test runtime shuts down.
pub struct TestServer {
    pub addr: std::net::SocketAddr,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let catalog = InMemoryProductCatalog::new(vec![ProductSummary {
            id: ProductId::new("sku-100".to_string()).unwrap(),
            name: "Canvas tote".to_string(),
            price: 24.0,
            currency: "EUR".to_string(),
            image_url: Some("https://img.example/tote.png".to_string()),
        }]);
        let server = Server::from_config(&config, Arc::new(catalog));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Err(e) = server.run_until(listener, std::future::pending()).await {
                panic!("test server failed: {e}");
            }
        });

        Self {
            addr,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, room_id: &str) -> String {
        format!("ws://{}/api/rooms/{}/ws", self.addr, room_id)
    }

    pub fn get(&self, user: &str, path: &str) -> RequestBuilder {
        as_user(self.client.get(self.url(path)), user)
    }

    pub fn post(&self, user: &str, path: &str) -> RequestBuilder {
        as_user(self.client.post(self.url(path)), user)
    }

    pub fn anonymous_get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    /// Create a room and return `(room id, room code, password)`
    pub async fn create_room(
        &self,
        host: &str,
        capacity: u32,
        require_password: bool,
    ) -> (String, String, Option<String>) {
        let response = self
            .post(host, "/api/rooms")
            .json(&json!({
                "name": format!("{host}'s picks"),
                "capacity": capacity,
                "require_password": require_password,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        (
            body["room"]["id"].as_str().unwrap().to_string(),
            body["credentials"]["room_code"].as_str().unwrap().to_string(),
            body["credentials"]["password"].as_str().map(str::to_string),
        )
    }

    pub async fn join(&self, user: &str, room_id: &str) -> Response {
        self.post(user, &format!("/api/rooms/{room_id}/join"))
            .send()
            .await
            .unwrap()
    }

    pub async fn leave(&self, user: &str, room_id: &str) -> Response {
        self.post(user, &format!("/api/rooms/{room_id}/leave"))
            .send()
            .await
            .unwrap()
    }
}

/// Display name is the capitalized user id
pub fn display_name(user: &str) -> String {
    let mut chars = user.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn as_user(builder: RequestBuilder, user: &str) -> RequestBuilder {
    builder
        .header(USER_ID_HEADER, user)
        .header(DISPLAY_NAME_HEADER, display_name(user))
}

/// Error kind from the standard error body
pub async fn error_kind(response: Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["error"]["kind"].as_str().unwrap().to_string()
}
