//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::time::Duration;

use rot13_api::config::AppConfig;
use rot13_api::http::AppState;
use rot13_api::{HttpServer, Shutdown};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const TEST_SECRET: &str = "integration-test-secret";

/// A running server on an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub config_tx: mpsc::UnboundedSender<AppConfig>,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A reqwest client that ignores proxy environment variables.
#[allow(dead_code)]
pub fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// An SDK client for `url` that talks to it directly.
#[allow(dead_code)]
pub fn api_client(url: &str) -> rot13_sdk::ApiClient {
    rot13_sdk::ApiClient::new(url).with_http_client(http())
}

/// Default config with a fixed secret.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.auth.secret_key = TEST_SECRET.to_string();
    config
}

/// Start the server with `config` and wait until it accepts connections.
pub async fn start_server(config: AppConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_tx, config_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let state = server.state().clone();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_rx, server_shutdown).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        state,
        config_tx,
        shutdown,
    }
}
