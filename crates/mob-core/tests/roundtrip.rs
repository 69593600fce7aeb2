use mob_core::{load_proto, save_table, writer::write_table, Error, TextEncoding};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

const PROTO: &str = "VNUM\tNAME\tLEVEL\tEXP\tGOLD_MIN\n\
                     101\tWolf\t1\t100\t5\n\
                     102\t????\t3\t\t\n\
                     103\tAlpha Wolf\t9\t2500\t40\n";

fn backups_of(path: &Path) -> Vec<PathBuf> {
    let prefix = format!(
        "{}.backup_",
        path.file_name().unwrap().to_string_lossy()
    );
    let mut found: Vec<PathBuf> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with(&prefix))
        })
        .collect();
    found.sort();
    found
}

#[test]
fn save_then_load_reproduces_table() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mob_proto.txt");
    fs::write(&source, PROTO).unwrap();

    let table = load_proto(&source).unwrap();
    let copy = dir.path().join("copy.txt");
    save_table(&table, &copy).unwrap();
    let reloaded = load_proto(&copy).unwrap();

    assert_eq!(reloaded.columns, table.columns);
    assert_eq!(reloaded.rows, table.rows);
}

#[test]
fn output_is_utf8_with_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mob_proto.txt");
    fs::write(&source, korean_proto_bytes()).unwrap();

    let table = load_proto(&source).unwrap();
    assert_eq!(table.encoding, TextEncoding::Cp949);

    let out = dir.path().join("out.txt");
    write_table(&table, &out).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written, "VNUM\tNAME\n101\t\u{B291}\u{B300}\n");
}

/// "101<TAB>늑대" in code page 949 with CRLF line endings
fn korean_proto_bytes() -> Vec<u8> {
    let mut bytes = b"VNUM\tNAME\r\n101\t".to_vec();
    bytes.extend_from_slice(&[0xB4, 0xC1, 0xB4, 0xEB]);
    bytes.extend_from_slice(b"\r\n");
    bytes
}

#[test]
fn saving_over_existing_file_creates_one_exact_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mob_proto.txt");
    fs::write(&path, PROTO).unwrap();
    let original_bytes = fs::read(&path).unwrap();

    let mut table = load_proto(&path).unwrap();
    table.set_cell(0, 3, "400").unwrap();
    let report = save_table(&table, &path).unwrap();

    let backups = backups_of(&path);
    assert_eq!(backups.len(), 1);
    assert_eq!(report.backup.as_deref(), Some(backups[0].as_path()));
    assert_eq!(fs::read(&backups[0]).unwrap(), original_bytes);
    assert!(fs::read_to_string(&path).unwrap().contains("101\tWolf\t1\t400\t5\n"));
}

#[test]
fn saving_new_file_makes_no_backup() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mob_proto.txt");
    fs::write(&source, PROTO).unwrap();
    let table = load_proto(&source).unwrap();

    let target = dir.path().join("fresh.txt");
    let report = save_table(&table, &target).unwrap();

    assert_eq!(report.backup, None);
    assert_eq!(report.rows_written, 3);
    assert!(backups_of(&target).is_empty());
}

#[cfg(unix)]
#[test]
fn backup_failure_leaves_original_untouched() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mob_proto.txt");
    fs::write(&path, PROTO).unwrap();
    let table = load_proto(&path).unwrap();

    // Unreadable source: the backup copy cannot be made
    fs::set_permissions(&path, fs::Permissions::from_mode(0o200)).unwrap();
    if fs::read(&path).is_ok() {
        // Running with privileges that ignore permissions
        return;
    }

    let result = save_table(&table, &path);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    assert!(matches!(result, Err(Error::Backup { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), PROTO);
}

#[test]
fn empty_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mob_proto.txt");
    fs::write(&path, "\n  \n\t\n").unwrap();

    assert!(matches!(load_proto(&path), Err(Error::EmptyFile(_))));
}
