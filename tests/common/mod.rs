//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

use basic_auth_gateway::config::{Config, ServerConfig, UserConfig};
use basic_auth_gateway::server::{AppState, Server};

/// The five demo users and their grants
pub const TEST_USERS: &[(&str, &str, &str)] = &[
    ("user1", "pass1", "/*"),
    ("user2", "pass2", "/index.html,/api"),
    ("user3", "pass3", "/api"),
    ("user4", "pass4", "/private1/index.html"),
    ("user5", "pass5", "/private1/*"),
];

/// Create a document root with a small site
pub fn create_test_document_root() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    write_file(root, "index.html", "<h1>home</h1>");
    write_file(root, "favicon.ico", "icon");
    write_file(root, "private1/index.html", "<h1>private1</h1>");
    write_file(root, "private1/secret.txt", "secret");
    write_file(root, "private2/index.html", "<h1>private2</h1>");
    write_file(root, "my file.html", "<p>spaced</p>");
    std::fs::create_dir_all(root.join("nolist")).expect("Failed to create dir");

    temp_dir
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create dir");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

/// Create a configuration serving `document_root` with the demo users
pub fn create_test_config(document_root: &Path) -> Config {
    let mut config = Config::default();
    config.resources.document_root = document_root.to_string_lossy().into_owned();
    config.auth.users = TEST_USERS
        .iter()
        .map(|(username, password, paths)| UserConfig {
            username: username.to_string(),
            password: password.to_string(),
            paths: paths.to_string(),
        })
        .collect();
    config
}

/// Create a test application state
pub fn create_test_state(document_root: &Path) -> AppState {
    AppState::from_config(&create_test_config(document_root))
        .expect("Failed to create test state")
}

/// Create a test server configuration with a random port
pub fn create_test_server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0, // Let OS assign a free port
    }
}

/// Create an HTTP client that does not follow redirects
pub fn create_test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Run a test server in the background and return the address
/// The server will be shut down when the returned shutdown sender is dropped or sent
pub async fn run_test_server(
    state: AppState,
) -> (std::net::SocketAddr, tokio::sync::oneshot::Sender<()>) {
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let server = Server::new(create_test_server_config(), state);
    tokio::spawn(async move {
        server
            .serve(listener, async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
    });

    // Give the server a moment to start (100ms is sufficient for slow CI systems)
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    (addr, shutdown_tx)
}
