mod common;

use apprentice::routes::GREETING;
use apprentice::startup::Server;
use common::spawn_server;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpStream;

#[tokio::test]
async fn integration_health_over_ephemeral_port() {
    let (server, base_url) = spawn_server().await;
    assert_ne!(server.local_addr().port(), 0);

    let response = reqwest::get(format!("{}/health", base_url))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let body: Value = response.json().await.expect("body should be JSON");
    assert_eq!(body, json!({ "status": "ok" }));

    server.close().await.expect("server should close cleanly");
}

#[tokio::test]
async fn integration_post_health_is_not_method_checked() {
    let (server, base_url) = spawn_server().await;

    let response = reqwest::Client::new()
        .post(format!("{}/health", base_url))
        .body("ignored")
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("body should be JSON");
    assert_eq!(body, json!({ "status": "ok" }));

    server.close().await.expect("server should close cleanly");
}

#[tokio::test]
async fn integration_unknown_path_returns_greeting() {
    let (server, base_url) = spawn_server().await;

    let response = reqwest::get(format!("{}/anything/else", base_url))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/plain"
    );
    assert_eq!(response.text().await.unwrap(), "Hello DevOps Apprentice 👋\n");

    server.close().await.expect("server should close cleanly");
}

#[tokio::test]
async fn integration_repeated_requests_are_identical() {
    let (server, base_url) = spawn_server().await;
    let client = reqwest::Client::new();

    for path in ["/health", "/"] {
        let mut bodies = Vec::new();
        for _ in 0..3 {
            let response = client
                .get(format!("{}{}", base_url, path))
                .send()
                .await
                .expect("request should succeed");
            assert_eq!(response.status(), StatusCode::OK);
            bodies.push(response.bytes().await.unwrap());
        }
        assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]), "path {}", path);
    }

    let greeting = client.get(&base_url).send().await.unwrap().bytes().await.unwrap();
    assert_eq!(greeting, GREETING.as_bytes());

    drop(client);
    server.close().await.expect("server should close cleanly");
}

#[tokio::test]
async fn integration_close_refuses_new_connections() {
    let (server, _base_url) = spawn_server().await;
    let addr = server.local_addr();

    TcpStream::connect(addr)
        .await
        .expect("server should accept connections while running");

    server.close().await.expect("server should close cleanly");

    assert!(
        TcpStream::connect(addr).await.is_err(),
        "connection to {} should be refused after close",
        addr
    );
}

#[tokio::test]
async fn integration_bind_conflict_is_an_error() {
    let (server, _base_url) = spawn_server().await;

    let result = Server::new().listen(server.local_addr()).await;
    assert!(result.is_err(), "binding an address in use should fail");

    server.close().await.expect("server should close cleanly");
}
