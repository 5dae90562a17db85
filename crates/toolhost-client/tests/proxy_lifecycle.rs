//! Spawning the real `toolhostd` binary and driving it through the client.

use std::path::PathBuf;
use std::time::Duration;

use rstest::rstest;
use toolhost_client::{
    ClientError, ProxyServer, SERVER_BINARY_ENV_VAR, find_free_port, resolve_server_binary,
};

#[expect(
    deprecated,
    reason = "assert_cmd::cargo::cargo_bin resolves workspace binaries for e2e tests"
)]
fn workspace_server_binary() -> PathBuf {
    assert_cmd::cargo::cargo_bin("toolhostd")
}

fn server_binary() -> PathBuf {
    let binary = if std::env::var_os(SERVER_BINARY_ENV_VAR).is_some() {
        resolve_server_binary(None)
    } else {
        resolve_server_binary(Some(&workspace_server_binary()))
    };
    assert!(
        binary.exists(),
        "{} not found; build the workspace or set {SERVER_BINARY_ENV_VAR}",
        binary.display()
    );
    binary
}

#[rstest]
#[tokio::test]
async fn spawned_server_executes_commands_and_owns_its_port() {
    let binary = server_binary();
    let port = find_free_port().await.expect("free port");

    let server = ProxyServer::start(&binary, "127.0.0.1", port)
        .await
        .expect("start toolhostd");
    let response = server
        .client()
        .execute("artifact", ["selector", "main"])
        .await
        .expect("execute");

    assert_eq!(response.status_code, 0, "stderr: {}", response.stderr);
    assert!(response.stdout.starts_with("0x"), "stdout: {}", response.stdout);

    let occupied = ProxyServer::start(&binary, "127.0.0.1", port)
        .await
        .expect_err("port already serves a tool host");
    assert!(
        matches!(occupied, ClientError::AlreadyOccupied { .. }),
        "unexpected error: {occupied}"
    );
    assert!(occupied.to_string().ends_with("already occupied"));

    let client = server.client().clone();
    server.stop().await.expect("stop toolhostd");
    assert!(!client.is_alive().await);
}

#[cfg(unix)]
#[rstest]
#[tokio::test]
async fn a_server_that_never_answers_times_out() {
    use std::fs;
    use std::net::TcpListener;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().expect("temp dir");
    let script = dir.path().join("silent-host");
    fs::write(&script, "#!/bin/sh\nexec sleep 30\n").expect("write script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("make executable");
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    let error = ProxyServer::start_with(&script, "127.0.0.1", port, &[], Duration::from_secs(1))
        .await
        .expect_err("script never listens");

    assert!(
        matches!(error, ClientError::StartupTimedOut { waited } if waited == Duration::from_secs(1)),
        "unexpected error: {error}"
    );
}
