use evidence_core::error::CoreError;
use evidence_core::records::model::Record;
use evidence_core::storage::table_file::{union_header, TableFile};
use std::fs;

#[test]
fn missing_or_corrupt_table_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(TableFile::new(dir.path().join("Nodes.csv")).load().is_empty());

    let empty = dir.path().join("Empty.csv");
    fs::write(&empty, "").unwrap();
    assert!(TableFile::new(&empty).load().is_empty());

    let corrupt = dir.path().join("Corrupt.csv");
    fs::write(&corrupt, "ID,Label\nN1,Router,extra,cells\n").unwrap();
    assert!(TableFile::new(&corrupt).load().is_empty());

    let binary = dir.path().join("Binary.csv");
    fs::write(&binary, [0x49, 0x44, 0x0a, 0xff, 0xfe, 0x0a]).unwrap();
    assert!(TableFile::new(&binary).load().is_empty());
}

#[test]
fn short_rows_are_padded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Edges.csv");
    fs::write(&path, "ID,Label,Details,EvidenceData\nE1,Funds\n").unwrap();
    let rows = TableFile::new(&path).load();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label(), "Funds");
    assert_eq!(rows[0].get("Details"), Some(""));
    assert_eq!(rows[0].get("EvidenceData"), Some(""));
}

#[test]
fn save_then_load_preserves_rows_fields_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let table = TableFile::new(dir.path().join("Nodes.csv"));
    let records = vec![
        Record::required("N2", "Switch", "line one\nline two, with \"quotes\"").with("Group", "core"),
        Record::required("N1", "Router", "").with("Group", "edge"),
    ];
    table.save(&records).unwrap();

    let loaded = table.load();
    assert_eq!(loaded, records);
    let names: Vec<&str> = loaded[0].field_names().collect();
    assert_eq!(names, vec!["ID", "Label", "Details", "EvidenceData", "Group"]);
}

#[test]
fn save_writes_union_of_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Nodes.csv");
    let table = TableFile::new(&path);
    let records = vec![
        Record::required("N1", "Router", ""),
        Record::required("N2", "Switch", "").with("Color", "red"),
    ];
    assert_eq!(
        union_header(&records),
        vec!["ID", "Label", "Details", "EvidenceData", "Color"]
    );
    table.save(&records).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some("ID,Label,Details,EvidenceData,Color"));

    let loaded = table.load();
    assert_eq!(loaded[0].get("Color"), Some(""));
    assert_eq!(loaded[1].get("Color"), Some("red"));
}

#[test]
fn saving_nothing_fails_and_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Nodes.csv");
    fs::write(&path, "ID,Label\nN1,Router\n").unwrap();

    let err = TableFile::new(&path).save(&[]).unwrap_err();
    assert!(matches!(err, CoreError::PersistFailed(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "ID,Label\nN1,Router\n");
}

#[test]
fn save_replaces_whole_file_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let table = TableFile::new(dir.path().join("Nodes.csv"));
    table
        .save(&[Record::required("N1", "a", ""), Record::required("N2", "b", "")])
        .unwrap();
    table.save(&[Record::required("N3", "c", "")]).unwrap();

    let loaded = table.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id(), "N3");

    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name != "Nodes.csv")
        .collect::<Vec<_>>();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}

#[test]
fn save_into_missing_directory_reports_persist_failure() {
    let dir = tempfile::tempdir().unwrap();
    let table = TableFile::new(dir.path().join("absent").join("Nodes.csv"));
    let err = table.save(&[Record::required("N1", "a", "")]).unwrap_err();
    assert!(matches!(err, CoreError::PersistFailed(_)));
}

#[cfg(unix)]
#[test]
fn save_keeps_table_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![Record::required("N1", "Router", "")];

    let fresh = dir.path().join("Nodes.csv");
    TableFile::new(&fresh).save(&rows).unwrap();
    assert_eq!(fs::metadata(&fresh).unwrap().permissions().mode() & 0o777, 0o644);

    for mode in [0o644, 0o640, 0o664] {
        fs::set_permissions(&fresh, fs::Permissions::from_mode(mode)).unwrap();
        TableFile::new(&fresh).save(&rows).unwrap();
        assert_eq!(fs::metadata(&fresh).unwrap().permissions().mode() & 0o777, mode);
    }
}
