use super::*;
use crate::testing::FakeDatabase;
use crate::traits::CommandOutput;
use async_trait::async_trait;

const TABLE: &str = "schema_version";

/// Executor that answers every query with the same stdout
struct CannedOutput(&'static str);

#[async_trait]
impl Executor for CannedOutput {
    async fn run(&self, _command: &str, _input: Option<&str>) -> DbResult<CommandOutput> {
        Ok(CommandOutput {
            stdout: self.0.to_string(),
            exit_code: Some(0),
        })
    }
}

/// Executor whose client program cannot be started
#[derive(Default)]
struct Unspawnable {
    inputs: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl Executor for Unspawnable {
    async fn run(&self, command: &str, input: Option<&str>) -> DbResult<CommandOutput> {
        self.inputs
            .lock()
            .unwrap()
            .push(input.unwrap_or_default().to_string());
        Err(DbError::Process {
            command: command.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"),
        })
    }
}

#[tokio::test]
async fn test_ensure_table_creates_and_seeds() {
    let db = FakeDatabase::new(TABLE);
    let store = VersionStore::new(&db, "mysql", TABLE);

    store.ensure_table().await.unwrap();

    assert!(db.table_exists());
    assert_eq!(db.version(), Some(0));
    assert_eq!(store.read_version().await.unwrap(), 0);
}

#[tokio::test]
async fn test_ensure_table_is_idempotent() {
    let db = FakeDatabase::new(TABLE);
    let store = VersionStore::new(&db, "mysql", TABLE);

    store.ensure_table().await.unwrap();
    store.write_version(4).await.unwrap();
    store.ensure_table().await.unwrap();

    assert_eq!(db.version(), Some(4));
}

#[tokio::test]
async fn test_ensure_table_seeds_empty_existing_table() {
    let db = FakeDatabase::new(TABLE);
    db.set_rows(Vec::new());
    let store = VersionStore::new(&db, "mysql", TABLE);

    store.ensure_table().await.unwrap();
    assert_eq!(db.version(), Some(0));
}

#[tokio::test]
async fn test_write_then_read() {
    let db = FakeDatabase::with_version(TABLE, 2);
    let store = VersionStore::new(&db, "mysql", TABLE);

    store.write_version(9).await.unwrap();
    assert_eq!(store.read_version().await.unwrap(), 9);
}

#[tokio::test]
async fn test_read_version_rejects_multiple_rows() {
    let db = FakeDatabase::new(TABLE);
    db.set_rows(vec![1, 2]);
    let store = VersionStore::new(&db, "mysql", TABLE);

    let err = store.read_version().await.unwrap_err();
    assert!(matches!(err, DbError::MalformedVersion { .. }));
}

#[tokio::test]
async fn test_read_version_rejects_empty_output() {
    let db = FakeDatabase::new(TABLE);
    db.set_rows(Vec::new());
    let store = VersionStore::new(&db, "mysql", TABLE);

    let err = store.read_version().await.unwrap_err();
    assert!(matches!(err, DbError::MalformedVersion { .. }));
}

#[tokio::test]
async fn test_read_version_rejects_non_integer() {
    let executor = CannedOutput("version\n3\n");
    let store = VersionStore::new(&executor, "mysql", TABLE);
    assert!(matches!(
        store.read_version().await.unwrap_err(),
        DbError::MalformedVersion { .. }
    ));

    let executor = CannedOutput("three\n");
    let store = VersionStore::new(&executor, "mysql", TABLE);
    assert!(matches!(
        store.read_version().await.unwrap_err(),
        DbError::MalformedVersion { .. }
    ));
}

#[tokio::test]
async fn test_read_version_tolerates_surrounding_whitespace() {
    let executor = CannedOutput("\n  12 \n\n");
    let store = VersionStore::new(&executor, "mysql", TABLE);
    assert_eq!(store.read_version().await.unwrap(), 12);
}

#[tokio::test]
async fn test_ensure_table_rejects_garbage_count() {
    let executor = CannedOutput("COUNT(*)\n1\n");
    let store = VersionStore::new(&executor, "mysql", TABLE);
    assert!(matches!(
        store.ensure_table().await.unwrap_err(),
        DbError::MalformedVersion { .. }
    ));
}

#[tokio::test]
async fn test_apply_with_version_bump_commits_both() {
    let db = FakeDatabase::with_version(TABLE, 0);
    let store = VersionStore::new(&db, "mysql", TABLE);

    store
        .apply_with_version_bump("CREATE TABLE users (id INT)", 1)
        .await
        .unwrap();

    assert_eq!(db.version(), Some(1));
    assert_eq!(db.payloads(), vec!["CREATE TABLE users (id INT)"]);
    // One client invocation for the whole unit
    assert_eq!(db.calls().len(), 1);
}

#[tokio::test]
async fn test_apply_with_version_bump_is_atomic() {
    let db = FakeDatabase::with_version(TABLE, 3).failing_on("BROKEN");
    let store = VersionStore::new(&db, "mysql", TABLE);

    let err = store
        .apply_with_version_bump("INSERT INTO a VALUES (1);\nBROKEN STATEMENT;", 4)
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::ExternalFailure { .. }));
    assert_eq!(db.version(), Some(3));
    assert!(db.payloads().is_empty());
}

#[test]
fn test_transaction_sql_terminates_payload() {
    assert_eq!(
        transaction_sql("SELECT 1", "v", 2),
        "BEGIN;\nSELECT 1;\nUPDATE v SET version = 2;\nCOMMIT;\n"
    );
    assert_eq!(
        transaction_sql("SELECT 1;\n\n", "v", 2),
        "BEGIN;\nSELECT 1;\nUPDATE v SET version = 2;\nCOMMIT;\n"
    );
}

#[tokio::test]
async fn test_store_from_config() {
    let config = schematic_core::Config::parse("db: mysql\ntable: tracker\n", "inline").unwrap();
    let db = FakeDatabase::new("tracker");
    let store = VersionStore::from_config(&db, &config);
    store.ensure_table().await.unwrap();
    assert!(db.table_exists());
    assert_eq!(db.calls()[0], count_rows_sql("tracker"));
}

#[tokio::test]
async fn test_ensure_table_propagates_spawn_failure() {
    let executor = Unspawnable::default();
    let store = VersionStore::new(&executor, "missing-client", TABLE);

    let err = store.ensure_table().await.unwrap_err();

    assert!(matches!(err, DbError::Process { .. }));
    // Only the row count was attempted; no DDL follows a spawn failure
    let inputs = executor.inputs.lock().unwrap().clone();
    assert_eq!(inputs, vec![count_rows_sql(TABLE)]);
}

#[tokio::test]
async fn test_peek_version_leaves_missing_table_alone() {
    let db = FakeDatabase::new(TABLE);
    let store = VersionStore::new(&db, "mysql", TABLE);

    assert_eq!(store.peek_version().await.unwrap(), None);
    assert!(!db.table_exists());
    assert_eq!(db.calls(), vec![count_rows_sql(TABLE)]);
}

#[tokio::test]
async fn test_peek_version_reads_existing_marker() {
    let db = FakeDatabase::with_version(TABLE, 6);
    let store = VersionStore::new(&db, "mysql", TABLE);
    assert_eq!(store.peek_version().await.unwrap(), Some(6));

    db.set_rows(Vec::new());
    assert_eq!(store.peek_version().await.unwrap(), None);
    assert_eq!(db.version(), None);
}

#[tokio::test]
async fn test_peek_version_propagates_spawn_failure() {
    let executor = Unspawnable::default();
    let store = VersionStore::new(&executor, "missing-client", TABLE);
    assert!(matches!(
        store.peek_version().await.unwrap_err(),
        DbError::Process { .. }
    ));
}
