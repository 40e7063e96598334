use super::*;

// =============================================================
// FileTokenStore
// =============================================================

#[test]
fn file_store_missing_file_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("token"));
    assert_eq!(store.read().unwrap(), None);
    assert!(!store.is_present());
}

#[test]
fn file_store_save_creates_parent_dirs_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("humanize").join("token");
    let store = FileTokenStore::new(&path);

    store.save("abc.def.ghi").unwrap();

    // A second store on the same path sees the token, like a page reload.
    let reopened = FileTokenStore::new(&path);
    assert_eq!(reopened.read().unwrap().as_deref(), Some("abc.def.ghi"));
    assert!(reopened.is_present());
}

#[test]
fn file_store_save_replaces_previous_token() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("token"));
    store.save("first").unwrap();
    store.save("second").unwrap();
    assert_eq!(store.read().unwrap().as_deref(), Some("second"));
}

#[test]
fn file_store_blank_content_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");
    std::fs::write(&path, "  \n").unwrap();
    let store = FileTokenStore::new(&path);
    assert_eq!(store.read().unwrap(), None);
}

#[test]
fn file_store_trims_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");
    std::fs::write(&path, "tok\n").unwrap();
    assert_eq!(FileTokenStore::new(&path).read().unwrap().as_deref(), Some("tok"));
}

#[test]
fn file_store_clear_removes_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("token"));
    store.save("tok").unwrap();
    store.clear().unwrap();
    assert_eq!(store.read().unwrap(), None);
    store.clear().unwrap();
}

#[cfg(unix)]
#[test]
fn file_store_writes_owner_only_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("token"));
    store.save("tok").unwrap();
    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[test]
fn file_store_narrows_existing_world_readable_file() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");
    std::fs::write(&path, "old").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let store = FileTokenStore::new(&path);
    store.save("new").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(store.read().unwrap().as_deref(), Some("new"));
}

#[test]
fn file_store_blank_save_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("token"));
    store.save("   ").unwrap();
    assert_eq!(store.read().unwrap(), None);
    assert!(!store.is_present());
}

// =============================================================
// MemoryTokenStore
// =============================================================

#[test]
fn memory_store_round_trip() {
    let store = MemoryTokenStore::new();
    assert!(!store.is_present());
    store.save("tok").unwrap();
    assert_eq!(store.read().unwrap().as_deref(), Some("tok"));
    store.clear().unwrap();
    assert_eq!(store.read().unwrap(), None);
}

#[test]
fn memory_store_with_token_is_present() {
    assert!(MemoryTokenStore::with_token("tok").is_present());
}

#[test]
fn memory_store_blank_token_is_absent() {
    let store = MemoryTokenStore::new();
    store.save("  \n").unwrap();
    assert_eq!(store.read().unwrap(), None);
    assert!(!store.is_present());
    assert!(!MemoryTokenStore::with_token("").is_present());
}

#[test]
fn memory_store_trims_like_file_store() {
    let store = MemoryTokenStore::new();
    store.save(" tok\n").unwrap();
    assert_eq!(store.read().unwrap().as_deref(), Some("tok"));
}
