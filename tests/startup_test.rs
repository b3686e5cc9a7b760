//! End-to-end checks against the compiled binary.

mod common;

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

fn monitor() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_keepalive-monitor"));
    // Run from an empty directory so no stray .env is picked up.
    cmd.current_dir(std::env::temp_dir())
        .env_remove("RUST_LOG")
        .env_remove("METRICS_ADDRESS")
        .env("PING_ENDPOINT", "/api/health")
        .env("CRON_SCHEDULE", "* * * * *")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    cmd
}

#[tokio::test]
async fn empty_backend_list_exits_non_zero() {
    let status = tokio::time::timeout(
        Duration::from_secs(10),
        monitor().env("BACKEND_URLS", "").status(),
    )
    .await
    .expect("monitor did not exit")
    .unwrap();

    assert!(!status.success());
}

#[tokio::test]
async fn malformed_numeric_setting_exits_non_zero() {
    let status = tokio::time::timeout(
        Duration::from_secs(10),
        monitor()
            .env("BACKEND_URLS", "http://a.test")
            .env("PING_INTERVAL_MS", "soon")
            .status(),
    )
    .await
    .expect("monitor did not exit")
    .unwrap();

    assert!(!status.success());
}

#[tokio::test]
async fn invalid_cron_exits_non_zero() {
    let status = tokio::time::timeout(
        Duration::from_secs(10),
        monitor()
            .env("BACKEND_URLS", "http://a.test")
            .env("CRON_SCHEDULE", "every minute")
            .status(),
    )
    .await
    .expect("monitor did not exit")
    .unwrap();

    assert!(!status.success());
}

#[tokio::test]
async fn serves_status_and_manual_ping() {
    let backend = common::start_ok_backend().await;
    let port = common::closed_addr().await.port();

    let mut child = monitor()
        .env("BACKEND_URLS", backend.base_url())
        .env("PORT", port.to_string())
        .spawn()
        .unwrap();

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{port}");

    let mut up = false;
    for _ in 0..100 {
        if client.get(format!("{base}/health")).send().await.is_ok() {
            up = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(up, "status API never came up");

    let ack: serde_json::Value = client
        .get(format!("{base}/ping"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ack["message"], "Manual ping triggered");

    let mut total = 0;
    for _ in 0..50 {
        let status: serde_json::Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        total = status["stats"]["globalStats"]["totalPings"].as_u64().unwrap();
        if total >= 1 {
            assert_eq!(status["servers"], 1);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(total >= 1);
    assert!(backend.hits() >= 1);

    let missing = client.get(format!("{base}/nope")).send().await.unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    child.kill().await.unwrap();
}
