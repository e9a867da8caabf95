//! Gateway served over TCP, talking to mock object store and function services.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use qi_gateway::config::{GatewayConfig, ObjectStoreConfig};
use qi_gateway::{Dispatcher, HttpServer, Shutdown};
use tokio::net::TcpListener;

const ROUTES: &str = r#"[
    {"url": "/hello/?", "name": "greet", "service": "demo"},
    {"url": "/fail", "name": "broken", "service": "demo"}
]"#;

/// Serve `app` on an ephemeral port.
async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Function service: `greet` echoes the event path, `broken` raises.
async fn mock_function_service() -> SocketAddr {
    async fn invoke(
        Path((version, service, function)): Path<(String, String, String)>,
        body: Bytes,
    ) -> impl IntoResponse {
        assert_eq!(version, "2016-08-15");
        assert_eq!(service, "demo");

        let event: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let mut headers = HeaderMap::new();
        if function == "broken" {
            headers.insert("x-fc-error-type", "UnhandledInvocationError".parse().unwrap());
            return (StatusCode::OK, headers, "{\"errorMessage\":\"boom\"}".to_string());
        }

        let greeting = format!("hello from {}", event["path"].as_str().unwrap());
        let reply = serde_json::json!({
            "code": 200,
            "headers": {"Content-Type": ["text/plain"], "X-Function": [function]},
            "data": greeting,
        });
        (StatusCode::OK, headers, reply.to_string())
    }

    spawn_app(Router::new().route(
        "/{version}/services/{service}/functions/{function}/invocations",
        post(invoke),
    ))
    .await
}

/// Object store serving the routing document under `/conf/qi/router.json`.
async fn mock_object_store() -> SocketAddr {
    spawn_app(Router::new().route("/conf/qi/router.json", get(|| async { ROUTES })))
        .await
}

async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let dispatcher = Dispatcher::from_config(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new(dispatcher).run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

async fn gateway_config() -> GatewayConfig {
    let functions = mock_function_service().await;
    let store = mock_object_store().await;

    let mut config = GatewayConfig::default();
    config.object_store = ObjectStoreConfig::Http {
        bucket: String::new(),
        endpoint: format!("http://{}/conf", store),
    };
    config.invoker.endpoint = format!("http://{}", functions);
    config.timeouts.invoke_secs = Some(5);
    config
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let (addr, shutdown) = start_gateway(gateway_config().await).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("http://{}/hello/world", addr))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-function"], "greet");
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "hello from /hello/world");

    shutdown.trigger();
}

#[tokio::test]
async fn test_function_error_is_500() {
    let (addr, shutdown) = start_gateway(gateway_config().await).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(format!("http://{}/fail", addr))
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);

    let res = client
        .get(format!("http://{}/nowhere", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_routes_from_local_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("qi")).unwrap();
    std::fs::write(dir.path().join("qi/router.json"), ROUTES).unwrap();

    let mut config = gateway_config().await;
    config.object_store = ObjectStoreConfig::Fs {
        root: dir.path().to_string_lossy().into_owned(),
    };
    let (addr, shutdown) = start_gateway(config).await;

    let res = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(format!("http://{}/hello/fs", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "hello from /hello/fs");

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test]
async fn test_missing_routing_document_is_500() {
    let mut config = gateway_config().await;
    config.routes.path = "qi/missing.json".into();
    let (addr, shutdown) = start_gateway(config).await;

    let res = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(format!("http://{}/hello/world", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "router compile failed");

    shutdown.trigger();
}
