#![allow(clippy::unwrap_used)]
// Integration tests for `NetcontrolClient` against an in-process fake
// daemon listening on a real Unix socket.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

use markgate_netcontrol::{Error, NetcontrolClient, Request};

// ── Helpers ─────────────────────────────────────────────────────────

/// Spawn a fake daemon that answers every request with `reply(request)`.
/// Returns the tempdir (keeps the socket alive) and a connected client.
fn spawn_daemon<F>(reply: F) -> (tempfile::TempDir, NetcontrolClient)
where
    F: Fn(Request) -> String + Send + Sync + 'static,
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("netcontrol.sock");
    let listener = UnixListener::bind(&path).unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let (read_half, mut write_half) = stream.into_split();
            let mut line = String::new();
            BufReader::new(read_half).read_line(&mut line).await.unwrap();
            let request: Request = serde_json::from_str(&line).unwrap();
            let mut out = reply(request);
            out.push('\n');
            write_half.write_all(out.as_bytes()).await.unwrap();
        }
    });

    let client = NetcontrolClient::new(path).with_timeout(Duration::from_secs(2));
    (dir, client)
}

// ── Confirm ─────────────────────────────────────────────────────────

#[tokio::test]
async fn confirm_returns_daemon_metadata() {
    let (_dir, client) = spawn_daemon(|req| {
        assert_eq!(req, Request::Confirm { mac: "00:11:22:33:44:55".into() });
        r#"{"success":true,"mac":"00:11:22:33:44:55","area":"LAN"}"#.into()
    });

    let confirmation = client.confirm("00:11:22:33:44:55").await.unwrap();
    assert_eq!(confirmation.mac.as_deref(), Some("00:11:22:33:44:55"));
    assert_eq!(confirmation.area.as_deref(), Some("LAN"));
}

#[tokio::test]
async fn confirm_accepts_bare_acknowledgement() {
    let (_dir, client) = spawn_daemon(|_| r#"{"success":true}"#.into());

    let confirmation = client.confirm("00:11:22:33:44:55").await.unwrap();
    assert!(confirmation.mac.is_none());
    assert!(confirmation.area.is_none());
}

#[tokio::test]
async fn refused_request_surfaces_as_error() {
    let (_dir, client) = spawn_daemon(|_| r#"{"success":false}"#.into());

    let result = client.confirm("00:11:22:33:44:55").await;
    assert!(
        matches!(result, Err(Error::Refused { action: "confirm" })),
        "expected Refused error, got: {result:?}"
    );
}

// ── Register user ───────────────────────────────────────────────────

#[tokio::test]
async fn register_user_resolves_mac_and_area() {
    let (_dir, client) = spawn_daemon(|req| {
        assert_eq!(req, Request::RegisterUser { ip: "123.123.123.123".into() });
        r#"{"success":true,"mac":"00:11:22:33:44:55","area":"LAN"}"#.into()
    });

    let admission = client.register_user("123.123.123.123").await.unwrap();
    assert_eq!(admission.mac, "00:11:22:33:44:55");
    assert_eq!(admission.area, "LAN");
}

#[tokio::test]
async fn register_user_requires_resolved_identity() {
    let (_dir, client) = spawn_daemon(|_| r#"{"success":true,"mac":"00:11:22:33:44:55"}"#.into());

    let result = client.register_user("123.123.123.123").await;
    assert!(
        matches!(result, Err(Error::Malformed { .. })),
        "expected Malformed error, got: {result:?}"
    );
}

// ── Update / deregister ─────────────────────────────────────────────

#[tokio::test]
async fn update_returns_resulting_mac() {
    let (_dir, client) = spawn_daemon(|req| {
        let Request::Update { mac, new_mac, new_name } = req else {
            panic!("expected update request");
        };
        assert_eq!(mac, "00:11:22:33:44:55");
        assert_eq!(new_mac.as_deref(), Some("00:11:22:33:44:57"));
        assert!(new_name.is_none());
        r#"{"success":true,"mac":"00:11:22:33:44:57"}"#.into()
    });

    let mac = client
        .update("00:11:22:33:44:55", Some("00:11:22:33:44:57"), None)
        .await
        .unwrap();
    assert_eq!(mac, "00:11:22:33:44:57");
}

#[tokio::test]
async fn deregister_succeeds_on_bare_success() {
    let (_dir, client) = spawn_daemon(|req| {
        assert_eq!(req, Request::Deregister { mac: "00:11:22:33:44:55".into() });
        r#"{"success":true}"#.into()
    });

    client.deregister("00:11:22:33:44:55").await.unwrap();
}

// ── Failure modes ───────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_socket_is_a_connect_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = NetcontrolClient::new(dir.path().join("missing.sock"));

    let result = client.confirm("00:11:22:33:44:55").await;
    assert!(
        matches!(result, Err(Error::Connect { .. })),
        "expected Connect error, got: {result:?}"
    );
}

#[tokio::test]
async fn garbage_reply_is_malformed() {
    let (_dir, client) = spawn_daemon(|_| "not json at all".into());

    let result = client.confirm("00:11:22:33:44:55").await;
    match result {
        Err(Error::Malformed { body, .. }) => assert_eq!(body, "not json at all"),
        other => panic!("expected Malformed error, got: {other:?}"),
    }
}

#[tokio::test]
async fn silent_daemon_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("netcontrol.sock");
    let listener = UnixListener::bind(&path).unwrap();

    // Accept connections but never reply.
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            // Hold the connection open so the client keeps waiting.
            std::mem::forget(stream);
        }
    });

    let client = NetcontrolClient::new(path).with_timeout(Duration::from_millis(100));
    let result = client.confirm("00:11:22:33:44:55").await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout error, got: {result:?}"
    );
}
