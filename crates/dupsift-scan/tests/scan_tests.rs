use dupsift_scan::{FileSource, JwalkScanner, ScanConfig, ScanError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_scan_missing_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = ScanConfig::new(temp.path().join("does-not-exist"));

    let err = JwalkScanner::new().scan(&config).unwrap_err();
    assert!(matches!(err, ScanError::NotFound { .. }));
}

#[test]
fn test_scan_file_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    let err = JwalkScanner::new().scan(&ScanConfig::new(&file)).unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory { .. }));
}

#[test]
fn test_scan_records_sizes_and_names() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("empty.jpg"), "").unwrap();
    fs::write(root.join("ten.jpg"), "0123456789").unwrap();

    let discovery = JwalkScanner::new().scan(&ScanConfig::new(root)).unwrap();

    let empty = discovery
        .records
        .iter()
        .find(|r| r.filename() == "empty.jpg")
        .unwrap();
    assert_eq!(empty.size(), 0);

    let ten = discovery
        .records
        .iter()
        .find(|r| r.filename() == "ten.jpg")
        .unwrap();
    assert_eq!(ten.size(), 10);
    assert_eq!(discovery.total_size(), 10);
}

#[test]
fn test_scan_order_is_stable() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for dir in ["c", "a", "b"] {
        fs::create_dir(root.join(dir)).unwrap();
        for name in ["z.jpg", "m.jpg", "a.jpg"] {
            fs::write(root.join(dir).join(name), dir).unwrap();
        }
    }

    let scanner = JwalkScanner::new();
    let config = ScanConfig::new(root);
    let first: Vec<_> = scanner
        .discover(&config)
        .unwrap()
        .records
        .into_iter()
        .map(|r| r.path().to_path_buf())
        .collect();
    let second: Vec<_> = scanner
        .discover(&config)
        .unwrap()
        .records
        .into_iter()
        .map(|r| r.path().to_path_buf())
        .collect();

    assert_eq!(first.len(), 9);
    assert_eq!(first, second);
}

#[test]
fn test_hidden_files_can_be_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("photos");
    fs::create_dir(&root).unwrap();
    fs::write(root.join(".hidden.jpg"), "h").unwrap();
    fs::write(root.join("shown.jpg"), "s").unwrap();

    let config = ScanConfig::builder()
        .root(&root)
        .include_hidden(false)
        .build()
        .unwrap();
    let discovery = JwalkScanner::new().scan(&config).unwrap();

    assert_eq!(discovery.records.len(), 1);
    assert_eq!(discovery.records[0].filename(), "shown.jpg");
}

#[test]
fn test_invalid_ignore_pattern_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = ScanConfig::builder()
        .root(temp.path())
        .ignore_patterns(vec!["a[".to_string()])
        .build()
        .unwrap();

    let err = JwalkScanner::new().scan(&config).unwrap_err();
    assert!(matches!(err, ScanError::InvalidPattern { .. }));
}
