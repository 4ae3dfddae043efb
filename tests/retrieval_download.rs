//! Retrieval behavior against a local mock server.

use fwmirror::retrieval::Fetcher;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn download_names_file_after_last_path_segment_and_preserves_bytes() {
    let server = MockServer::start().await;
    let body: Vec<u8> = (0u16..4096).map(|i| (i % 251) as u8).collect();

    Mock::given(method("GET"))
        .and(path("/fw/a/device-v1.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().expect("tempdir");
    let fetcher = Fetcher::new(5_000);
    let done = fetcher
        .download(&format!("{}/fw/a/device-v1.zip", server.uri()), out.path())
        .await
        .expect("download");

    assert_eq!(done.path, out.path().join("device-v1.zip"));
    assert_eq!(done.bytes, body.len() as u64);
    let written = std::fs::read(&done.path).expect("read back");
    assert_eq!(written, body);
}

#[tokio::test]
async fn repeated_download_overwrites_previous_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fw/device-v1.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"first revision".to_vec()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fw/device-v1.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"second".to_vec()))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().expect("tempdir");
    let fetcher = Fetcher::new(5_000);
    let url = format!("{}/fw/device-v1.zip", server.uri());

    let first = fetcher.download(&url, out.path()).await.expect("first");
    assert_eq!(std::fs::read(&first.path).unwrap(), b"first revision");

    let second = fetcher.download(&url, out.path()).await.expect("second");
    assert_eq!(second.path, first.path);
    assert_eq!(std::fs::read(&second.path).unwrap(), b"second");

    // One file, not two
    let entries: Vec<_> = std::fs::read_dir(out.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn non_2xx_status_is_an_error_and_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fw/missing.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().expect("tempdir");
    let fetcher = Fetcher::new(5_000);
    let err = fetcher
        .download(&format!("{}/fw/missing.zip", server.uri()), out.path())
        .await
        .expect_err("404 should fail");
    assert!(format!("{err:#}").contains("missing.zip"));
    assert!(!out.path().join("missing.zip").exists());
}

#[tokio::test]
async fn destination_directory_is_created_on_demand() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fw/device-v1.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().expect("tempdir");
    let nested = out.path().join("firmware_downloads");
    assert!(!nested.exists());

    let fetcher = Fetcher::new(5_000);
    fetcher
        .download(&format!("{}/fw/device-v1.zip", server.uri()), &nested)
        .await
        .expect("download");
    assert!(nested.join("device-v1.zip").exists());
}
