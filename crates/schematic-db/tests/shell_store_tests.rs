//! Version store driven through real `sh` processes

use schematic_db::{DbError, ShellExecutor, VersionStore};

#[tokio::test]
async fn test_read_version_from_client_stdout() {
    let executor = ShellExecutor::database();
    let store = VersionStore::new(&executor, "cat >/dev/null; echo 7", "schema_version");

    store.ensure_table().await.unwrap();
    assert_eq!(store.read_version().await.unwrap(), 7);
}

#[tokio::test]
async fn test_client_sees_generated_sql_on_stdin() {
    let executor = ShellExecutor::database();
    // grep exits non-zero unless the UPDATE arrives on stdin.
    let store = VersionStore::new(&executor, "grep -c 'UPDATE tracker SET version = 5'", "tracker");
    store.write_version(5).await.unwrap();
}

#[tokio::test]
async fn test_noisy_client_is_rejected() {
    let executor = ShellExecutor::database();
    let store = VersionStore::new(
        &executor,
        "cat >/dev/null; echo 3; echo 'Warning: password on command line' >&2",
        "schema_version",
    );

    let err = store.read_version().await.unwrap_err();
    assert!(matches!(err, DbError::ExternalFailure { .. }));
}

#[tokio::test]
async fn test_failed_payload_reports_client_error() {
    let executor = ShellExecutor::database();
    let store = VersionStore::new(
        &executor,
        "cat >/dev/null; echo 'ERROR 1064 (42000): syntax error' >&2; exit 1",
        "schema_version",
    );

    let err = store
        .apply_with_version_bump("CREATE TABLE broken (", 1)
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("exit 1"));
    assert!(msg.contains("ERROR 1064"));
}
