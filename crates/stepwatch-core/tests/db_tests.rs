use std::collections::BTreeMap;

use stepwatch_core::Database;
use tempfile::NamedTempFile;

fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

#[test]
fn test_database_initialization() {
    let (temp_file, db) = create_test_db();
    assert!(temp_file.path().exists());
    assert!(db.list_processed().unwrap().is_empty());
}

#[test]
fn test_processed_state_survives_reopen() {
    let temp_file = NamedTempFile::new().unwrap();
    {
        let db = Database::new(temp_file.path()).unwrap();
        db.mark_processed(100).unwrap();
    }

    let db = Database::new(temp_file.path()).unwrap();
    assert!(db.is_processed(100).unwrap());
    assert!(!db.is_processed(101).unwrap());
}

#[test]
fn test_import_overrides_existing_entries() {
    let (_temp_file, mut db) = create_test_db();
    db.mark_processed(1).unwrap();

    let entries = BTreeMap::from([(1, false), (2, true)]);
    assert_eq!(db.import_processed(&entries).unwrap(), 2);

    assert!(!db.is_processed(1).unwrap());
    assert!(db.is_processed(2).unwrap());
    let listed: Vec<u64> = db
        .list_processed()
        .unwrap()
        .iter()
        .map(|entry| entry.build_id)
        .collect();
    assert_eq!(listed, vec![2]);
}

#[test]
fn test_forget_and_clear() {
    let (_temp_file, db) = create_test_db();
    for id in [5, 6, 7] {
        db.mark_processed(id).unwrap();
    }

    assert!(db.forget(6).unwrap());
    assert!(!db.forget(6).unwrap());
    assert_eq!(db.clear().unwrap(), 2);
    assert!(!db.is_processed(5).unwrap());
}
