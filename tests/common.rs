#![allow(dead_code)]

use apprentice::startup::{RunningServer, Server};
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use axum::response::Response;

/// Binds a fresh server to an ephemeral loopback port.
pub async fn spawn_server() -> (RunningServer, String) {
    let server = Server::default()
        .listen("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let base_url = format!("http://{}", server.local_addr());
    (server, base_url)
}

pub fn build_request(path: &str, method: Method) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn content_type(response: &Response) -> &str {
    response
        .headers()
        .get("content-type")
        .expect("Content-Type header missing")
        .to_str()
        .expect("Content-Type header not valid UTF-8")
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body")
        .to_vec()
}
