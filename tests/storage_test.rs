// Storage providers: file-backed store, listings and the relational record

use chord_chart::models::ChordChart;
use chord_chart::storage::{
    ChartRecord, FileStorage, MemoryStorage, StorageError, StorageProvider,
};
use chrono::Duration;
use std::fs;

fn titled(title: &str) -> ChordChart {
    let mut chart = ChordChart::default();
    chart.title = title.to_string();
    chart
}

#[test]
fn test_file_storage_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut storage = FileStorage::open(dir.path()).unwrap();
    assert!(storage.is_available());

    let mut chart = titled("Blackbird");
    chart.rows[0][0].set_finger_at(5, 3).unwrap();
    storage.save_chart(&chart).unwrap();

    assert!(dir.path().join(format!("{}.json", chart.id)).is_file());
    assert_eq!(storage.load_chart(&chart.id).unwrap(), Some(chart));
    assert_eq!(storage.load_chart("not-there").unwrap(), None);
}

#[test]
fn test_file_storage_overwrites_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path()).unwrap();
    let mut chart = titled("Draft");
    storage.save_chart(&chart).unwrap();
    chart.title = "Final".to_string();
    storage.save_chart(&chart).unwrap();

    let listed = storage.list_charts().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Final");
}

#[test]
fn test_file_listing_newest_first_and_skips_junk() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path()).unwrap();

    let mut older = titled("Older");
    older.updated_at = older.updated_at - Duration::days(2);
    let newer = titled("Newer");
    storage.save_chart(&older).unwrap();
    storage.save_chart(&newer).unwrap();
    fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let titles: Vec<_> = storage
        .list_charts()
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
}

#[test]
fn test_corrupt_file_reported_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    fs::write(dir.path().join("bad.json"), r#"{ "chordsPerRow": 0, "rows": [[]] }"#).unwrap();

    assert!(matches!(
        storage.load_chart("bad"),
        Err(StorageError::Corrupt { ref id, .. }) if id == "bad"
    ));
}

#[test]
fn test_delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path()).unwrap();
    let chart = titled("Gone");
    storage.save_chart(&chart).unwrap();

    storage.delete_chart(&chart.id).unwrap();
    storage.delete_chart(&chart.id).unwrap();
    assert!(storage.load_chart(&chart.id).unwrap().is_none());
}

#[test]
fn test_unsafe_ids_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path()).unwrap();
    let mut chart = titled("Escape");
    chart.id = "../outside".to_string();

    assert!(matches!(storage.save_chart(&chart), Err(StorageError::InvalidId(_))));
    assert!(matches!(storage.load_chart(""), Err(StorageError::InvalidId(_))));
}

#[test]
fn test_removed_directory_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("charts");
    let mut storage = FileStorage::open(&root).unwrap();
    fs::remove_dir(&root).unwrap();

    assert!(!storage.is_available());
    assert!(matches!(storage.save_chart(&titled("x")), Err(StorageError::Unavailable)));
}

#[test]
fn test_unloadable_chart_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path()).unwrap();
    let mut chart = titled("Too long");
    let row = chart.rows[0].clone();
    chart.rows.extend(std::iter::repeat(row).take(50));
    chart.ensure_shape();

    assert!(matches!(
        storage.save_chart(&chart),
        Err(StorageError::Invalid { ref id, .. }) if *id == chart.id
    ));
    assert!(!dir.path().join(format!("{}.json", chart.id)).exists());
    assert!(storage.list_charts().unwrap().is_empty());
    assert!(ChartRecord::from_chart(&chart).is_err());
}

#[test]
fn test_memory_and_file_agree() {
    let dir = tempfile::tempdir().unwrap();
    let mut providers: Vec<Box<dyn StorageProvider>> = vec![
        Box::new(MemoryStorage::new()),
        Box::new(FileStorage::open(dir.path()).unwrap()),
    ];
    let chart = titled("Both");
    for provider in providers.iter_mut() {
        provider.save_chart(&chart).unwrap();
        assert_eq!(provider.load_chart(&chart.id).unwrap().as_ref(), Some(&chart));
        assert_eq!(provider.list_charts().unwrap()[0].id, chart.id);
    }
}

#[test]
fn test_record_keeps_full_chart_in_notes() {
    let mut chart = titled("Record");
    chart.rows[0][1].set_barre(3, 1, 5).unwrap();
    chart.rows[0][1].set_name("C").unwrap();

    let record = ChartRecord::from_chart(&chart).unwrap();
    assert_eq!(record.id, chart.id);
    assert_eq!(record.title, "Record");

    let flat = record.flat_chords().unwrap();
    assert_eq!(flat[1].name, "C");
    assert_eq!(flat[1].barres, vec![3], "flattened barres keep only the fret");

    assert_eq!(record.to_chart().unwrap(), chart);
}
