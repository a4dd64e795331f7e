//! File storage tests against a temporary data directory.

use chrono::{Duration, NaiveTime, Utc};
use monitor::storage::{HISTORY_FILE, MEDICATIONS_FILE};
use monitor::{FileStorage, Storage, StorageError};
use tempfile::TempDir;
use tokio_test::assert_ok;
use vitals::{BiometricSnapshot, HealthRecord, Medication};

fn storage() -> (TempDir, FileStorage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("data"));
    (dir, storage)
}

fn reading(user_id: &str, glucose: f64, minutes_ago: i64) -> HealthRecord {
    let at = Utc::now() - Duration::minutes(minutes_ago);
    let snapshot = BiometricSnapshot::new(glucose, 70.0, 118.0, 78.0, 98.4, at);
    HealthRecord::from_snapshot(user_id, &snapshot)
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[tokio::test]
async fn test_initialize_creates_both_files() {
    let (_dir, storage) = storage();
    assert_ok!(storage.initialize().await);

    assert!(storage.data_dir().join(HISTORY_FILE).exists());
    assert!(storage.data_dir().join(MEDICATIONS_FILE).exists());
    assert!(storage.recent_readings("ana", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_initialize_keeps_existing_rows() {
    let (_dir, storage) = storage();
    storage.initialize().await.unwrap();
    storage.insert_reading(&reading("ana", 101.0, 0)).await.unwrap();

    storage.initialize().await.unwrap();
    assert_eq!(storage.recent_readings("ana", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_recent_readings_newest_first_and_limited() {
    let (_dir, storage) = storage();
    for (glucose, minutes_ago) in [(90.0, 30), (110.0, 0), (100.0, 15), (95.0, 45)] {
        storage
            .insert_reading(&reading("ana", glucose, minutes_ago))
            .await
            .unwrap();
    }
    storage.insert_reading(&reading("ben", 200.0, 5)).await.unwrap();

    let rows = storage.recent_readings("ana", 3).await.unwrap();
    let levels: Vec<f64> = rows.iter().filter_map(|r| r.glucose_level).collect();
    assert_eq!(levels, vec![110.0, 100.0, 90.0]);
    assert!(rows.iter().all(|r| r.user_id == "ana"));
}

#[tokio::test]
async fn test_add_medication_requires_name_and_dosage() {
    let (_dir, storage) = storage();

    let err = storage
        .add_medication(Medication::new("ana", "  ", "500mg", time(8, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    let err = storage
        .add_medication(Medication::new("ana", "Metformin", "", time(8, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    assert!(storage.list_medications("ana").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_medications_sorted_by_time() {
    let (_dir, storage) = storage();
    for (name, at) in [
        ("Evening", time(20, 0)),
        ("Morning", time(8, 0)),
        ("Noon", time(12, 30)),
    ] {
        storage
            .add_medication(Medication::new("ana", name, "1 tablet", at))
            .await
            .unwrap();
    }
    storage
        .add_medication(Medication::new("ben", "Other", "1 tablet", time(6, 0)))
        .await
        .unwrap();

    let names: Vec<String> = storage
        .list_medications("ana")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.medication_name)
        .collect();
    assert_eq!(names, vec!["Morning", "Noon", "Evening"]);
}

#[tokio::test]
async fn test_mark_taken_updates_stored_row() {
    let (_dir, storage) = storage();
    let added = storage
        .add_medication(Medication::new("ana", "Lisinopril", "10mg", time(9, 0)))
        .await
        .unwrap();
    assert!(!added.is_taken);

    let updated = storage.mark_taken(&added.id).await.unwrap();
    assert!(updated.is_taken);
    assert!(updated.taken_at.is_some());

    let listed = storage.list_medications("ana").await.unwrap();
    assert!(listed[0].is_taken);
}

#[tokio::test]
async fn test_unknown_medication_id_is_not_found() {
    let (_dir, storage) = storage();
    storage.initialize().await.unwrap();

    assert!(matches!(
        storage.mark_taken("missing").await,
        Err(StorageError::NotFound(id)) if id == "missing"
    ));
    assert!(matches!(
        storage.delete_medication("missing").await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_medication_removes_only_that_row() {
    let (_dir, storage) = storage();
    let keep = storage
        .add_medication(Medication::new("ana", "Keep", "5mg", time(7, 0)))
        .await
        .unwrap();
    let removed = storage
        .add_medication(Medication::new("ana", "Drop", "5mg", time(9, 0)))
        .await
        .unwrap();

    assert_ok!(storage.delete_medication(&removed.id).await);

    let listed = storage.list_medications("ana").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
}

#[tokio::test]
async fn test_corrupt_history_is_a_serialization_error() {
    let (_dir, storage) = storage();
    storage.initialize().await.unwrap();
    std::fs::write(storage.data_dir().join(HISTORY_FILE), "{not json").unwrap();

    assert!(matches!(
        storage.recent_readings("ana", 5).await,
        Err(StorageError::Serialization(_))
    ));
}
