// tests/client_retry_test.rs

use std::sync::Arc;
use uvd::{
    client::{ApiClient, StatusSource},
    config::AppConfig,
    error::AppError,
    models::api::StartDownloadRequest,
};

fn client_for(server_url: String, max_retries: u32) -> ApiClient {
    let config = AppConfig {
        server: server_url,
        max_retries,
        ..AppConfig::default()
    };
    ApiClient::new(Arc::new(config)).expect("client should build")
}

// retry count written to a fresh config.json
const SHIPPED_RETRIES: u32 = 2;

#[tokio::test(flavor = "multi_thread")]
async fn test_file_download_retries_transient_errors() {
    let mut server = mockito::Server::new_async().await;

    // first GET -> 503, the retry middleware should try again
    let unavailable = server
        .mock("GET", "/downloads/clip.mp4")
        .with_status(503)
        .with_body("warming up")
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/downloads/clip.mp4")
        .with_body("VIDEO")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(server.url(), 1);
    let res = client.fetch_file("clip.mp4").await.expect("second attempt should succeed");

    assert_eq!(res.text().await.unwrap(), "VIDEO");
    unavailable.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_start_download_is_sent_once() {
    let mut server = mockito::Server::new_async().await;
    let start = server
        .mock("POST", "/start_download")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(server.url(), SHIPPED_RETRIES);
    let request = StartDownloadRequest {
        url: "https://youtu.be/x".into(),
        quality: "best".into(),
        mode: "Video".into(),
        download_folder: String::new(),
        platform: "youtube".into(),
    };
    assert!(client.start_download(&request).await.is_err());
    start.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_actions_and_polls_are_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let pause = server
        .mock("POST", "/toggle_pause")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let status = server
        .mock("GET", "/get_status")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(server.url(), SHIPPED_RETRIES);
    assert!(client.toggle_pause().await.is_err());
    assert!(client.get_status().await.is_err());
    pause.assert_async().await;
    status.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_error_surfaces_without_retries() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", "/fetch_title")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(server.url(), 0);
    let err = client.fetch_title("https://youtu.be/x").await.unwrap_err();
    assert!(
        matches!(err, AppError::Network(_) | AppError::NetworkMiddleware(_)),
        "unexpected error: {err:?}"
    );
    failing.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_body_names_the_url() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/get_status")
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = client_for(server.url(), 0);
    match client.get_status().await {
        Err(AppError::ApiParseFailed { url, .. }) => assert!(url.ends_with("/get_status")),
        other => panic!("expected a parse failure, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_proxy_image_passes_encoded_url() {
    let mut server = mockito::Server::new_async().await;
    let image = server
        .mock("GET", "/proxy_image")
        .match_query(mockito::Matcher::UrlEncoded(
            "url".into(),
            "https://cdn.example/a b.jpg?x=1".into(),
        ))
        .with_body(vec![0xFF, 0xD8, 0xFF])
        .create_async()
        .await;

    let client = client_for(server.url(), 0);
    let bytes = client.proxy_image("https://cdn.example/a b.jpg?x=1").await.unwrap();
    assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    image.assert_async().await;
}
