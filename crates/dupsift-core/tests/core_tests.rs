use dupsift_core::{
    Action, ActionKind, ContentHash, Discovery, FileRecord, RecordError, ScanConfig, partition_by,
};
use std::path::{Path, PathBuf};

#[test]
fn test_content_hash_creation_and_hex() {
    let bytes = [0xab; 32];
    let hash = ContentHash::new(bytes);

    let hex = hash.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(hex.starts_with("ab"));
    assert_eq!(hash.to_string(), hex);

    assert_eq!(hash, ContentHash::new(bytes));
    assert_ne!(hash, ContentHash::new([0xcd; 32]));
}

#[test]
fn test_record_construction() {
    let record = FileRecord::try_new("IMG_0001.JPG", "/photos/2023/IMG_0001.JPG", 2048).unwrap();

    assert_eq!(record.filename(), "IMG_0001.JPG");
    assert_eq!(record.path(), Path::new("/photos/2023/IMG_0001.JPG"));
    assert_eq!(record.size(), 2048);
    assert!(!record.is_empty());
    assert!(record.chunk_hash().is_none());
    assert!(record.full_hash().is_none());
}

#[test]
fn test_record_negative_size_is_invalid() {
    let err = FileRecord::try_new("a.jpg", "/photos/a.jpg", -10).unwrap_err();
    let RecordError::InvalidRecord { path, reason } = err;
    assert_eq!(path, Path::new("/photos/a.jpg"));
    assert!(reason.contains("-10"));
}

#[test]
fn test_zero_length_record_is_valid() {
    let record = FileRecord::try_new("empty.txt", "/tmp/empty.txt", 0).unwrap();
    assert!(record.is_empty());
}

#[test]
fn test_attaching_hash_leaves_original_untouched() {
    let original = FileRecord::new("a.jpg", "/p/a.jpg", 10);
    let hashed = original.clone().with_full_hash(ContentHash::new([1; 32]));

    assert!(original.full_hash().is_none());
    assert_eq!(hashed.full_hash(), Some(ContentHash::new([1; 32])));
    assert_eq!(hashed.path(), original.path());
}

#[test]
fn test_action_accessors() {
    let record = FileRecord::new("a.jpg", "/p/a.jpg", 10);

    let keep = Action::Keep(record.clone());
    assert!(keep.is_keep());
    assert_eq!(keep.record(), &record);

    let rename = Action::KeepWithRename(record.clone());
    assert!(!rename.is_keep());
    assert_eq!(rename.kind(), ActionKind::KeepWithRename);
    assert_eq!(rename.into_record(), record);
}

#[test]
fn test_action_json_shape() {
    let action = Action::Remove(FileRecord::new("b.jpg", "/p/b.jpg", 20));
    let json = serde_json::to_value(&action).unwrap();

    assert_eq!(json["action"], "remove");
    assert_eq!(json["file"]["filename"], "b.jpg");
    assert_eq!(json["file"]["size"], 20);
    assert!(json["file"].get("chunk_hash").is_none());

    let back: Action = serde_json::from_value(json).unwrap();
    assert_eq!(back, action);
}

#[test]
fn test_partition_conserves_records() {
    let records = vec![
        FileRecord::new("a", "/a", 10),
        FileRecord::new("b", "/b", 20),
        FileRecord::new("c", "/c", 10),
        FileRecord::new("d", "/d", 30),
        FileRecord::new("e", "/e", 10),
    ];
    let input_len = records.len();

    let result = partition_by(records, FileRecord::size);

    assert_eq!(result.len(), input_len);
    assert_eq!(result.resolved.len(), 2);
    assert_eq!(result.deferred.len(), 1);

    let paths: Vec<_> = result.deferred[&10u64].iter().map(|r| r.path().to_owned()).collect();
    assert_eq!(
        paths,
        vec![PathBuf::from("/a"), PathBuf::from("/c"), PathBuf::from("/e")]
    );
}

#[test]
fn test_discovery_total_size() {
    let discovery = Discovery::from_records(vec![
        FileRecord::new("a", "/a", 10),
        FileRecord::new("b", "/b", 32),
    ]);
    assert_eq!(discovery.total_size(), 42);
    assert!(discovery.warnings.is_empty());
}

#[test]
fn test_scan_config_serde_defaults() {
    let config: ScanConfig = serde_json::from_str(r#"{"root": "/srv/photos"}"#).unwrap();
    assert!(config.include_hidden);
    assert!(config.filename_filter.is_none());
    assert!(config.ignore_patterns.is_empty());
}
