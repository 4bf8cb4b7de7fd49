use super::*;
use crate::migration::MigrationKind;
use tempfile::TempDir;

fn config() -> Config {
    Config::parse(
        "db: mysql\ntable: t\nhandlers:\n  py: \"run-script %s\"\n",
        "inline",
    )
    .unwrap()
}

fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), "-- migration\n").unwrap();
}

#[test]
fn test_scan_keys_are_leading_digits() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "001-init.sql");
    touch(dir.path(), "2-add-col.sql");
    touch(dir.path(), "0010_backfill");
    touch(dir.path(), "README.md");
    touch(dir.path(), "schematic.yml");

    let catalog = Catalog::scan(dir.path(), &config()).unwrap();
    let versions: Vec<u64> = catalog.iter().map(|m| m.version).collect();
    assert_eq!(versions, vec![1, 2, 10]);
    assert_eq!(catalog.latest_version(), Some(10));
    assert_eq!(catalog.get(10).unwrap().kind, MigrationKind::Native);
}

#[test]
fn test_scan_duplicate_version() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "001-a.sql");
    touch(dir.path(), "001-b.sql");

    let err = Catalog::scan(dir.path(), &config()).unwrap_err();
    match err {
        CoreError::DuplicateMigration {
            version,
            first,
            second,
        } => {
            assert_eq!(version, 1);
            assert_eq!(first, "001-a.sql");
            assert_eq!(second, "001-b.sql");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_scan_duplicate_with_different_padding() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "1-a.sql");
    touch(dir.path(), "0001-b.py");

    let err = Catalog::scan(dir.path(), &config()).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateMigration { version: 1, .. }));
}

#[test]
fn test_scan_skips_artifacts_hidden_and_directories() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "003-seed.py");
    touch(dir.path(), "003-seed.pyc");
    touch(dir.path(), ".004-hidden.sql");
    std::fs::create_dir(dir.path().join("005-dir")).unwrap();

    let catalog = Catalog::scan(dir.path(), &config()).unwrap();
    assert_eq!(catalog.len(), 1);
    let seed = catalog.get(3).unwrap();
    assert_eq!(seed.file_name(), "003-seed.py");
    assert!(matches!(seed.kind, MigrationKind::Handled { .. }));
}

#[test]
fn test_scan_keeps_unsupported_until_apply() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "007-job.rb");

    let catalog = Catalog::scan(dir.path(), &config()).unwrap();
    assert_eq!(
        catalog.get(7).unwrap().kind,
        MigrationKind::Unsupported {
            extension: "rb".to_string()
        }
    );
}

#[test]
fn test_scan_version_overflow() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "99999999999999999999999-huge.sql");

    let err = Catalog::scan(dir.path(), &config()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidVersion { .. }));
}

#[test]
fn test_scan_missing_directory() {
    let dir = TempDir::new().unwrap();
    let err = Catalog::scan(&dir.path().join("nope"), &config()).unwrap_err();
    assert!(matches!(err, CoreError::IoWithPath { .. }));
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::scan(dir.path(), &config()).unwrap();
    assert!(catalog.is_empty());
    assert_eq!(catalog.latest_version(), None);
}
