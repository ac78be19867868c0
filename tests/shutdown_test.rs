// Kept in its own test binary: it sends SIGTERM to the running process.
#![cfg(unix)]

use plugin_activator::cli::spawn_shutdown_listener;
use std::process::Command;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_sigterm_cancels_token() {
    let cancel = CancellationToken::new();
    let listener = spawn_shutdown_listener(cancel.clone()).expect("install signal handlers");
    assert!(!cancel.is_cancelled());

    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .expect("run kill");
    assert!(status.success());

    tokio::time::timeout(Duration::from_secs(5), cancel.cancelled())
        .await
        .expect("token cancelled after SIGTERM");
    listener.await.unwrap();
}
