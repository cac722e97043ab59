mod common;

use common::{ServeProcess, run_command};

#[tokio::test]
async fn page_and_download_return_identical_bytes() {
    let server = ServeProcess::spawn(&[]).await;
    let client = reqwest::Client::new();

    let page = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(page.status(), 200);
    assert!(page.headers().get("content-disposition").is_none());
    let page = page.bytes().await.unwrap();

    let download = client.get(server.url("/download")).send().await.unwrap();
    assert_eq!(download.status(), 200);
    let download = download.bytes().await.unwrap();

    assert!(!page.is_empty());
    assert_eq!(page, download);
    server.kill().await;
}

#[tokio::test]
async fn download_is_named_html_attachment() {
    let server = ServeProcess::spawn(&[]).await;

    let resp = reqwest::get(server.url("/download")).await.unwrap();
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"swipe_simulator.html\""
    );
    assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");

    let body = resp.text().await.unwrap();
    assert!(body.contains("Status: Ready"));
    server.kill().await;
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = ServeProcess::spawn(&[]).await;
    let resp = reqwest::get(server.url("/swipe")).await.unwrap();
    assert_eq!(resp.status(), 404);
    server.kill().await;
}

#[tokio::test]
async fn served_pages_are_logged_as_events() {
    let dir = tempfile::tempdir().unwrap();
    let events_path = dir.path().join("events.jsonl");
    let server =
        ServeProcess::spawn(&["--events-file", events_path.to_str().unwrap()]).await;

    reqwest::get(server.url("/")).await.unwrap();
    reqwest::get(server.url("/download")).await.unwrap();

    let contents = std::fs::read_to_string(&events_path).unwrap();
    let events: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events[0]["type"], "ServerStarted");
    let routes: Vec<&str> = events
        .iter()
        .filter(|e| e["type"] == "AssetServed")
        .map(|e| e["route"].as_str().unwrap())
        .collect();
    assert_eq!(routes, ["/", "/download"]);
    server.kill().await;
}

#[test]
fn invalid_bind_address_exits_with_delivery_error() {
    let output = run_command(&["serve", "--bind", "not-an-address"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid bind address"));
}
