#![allow(dead_code)]

use std::path::PathBuf;

use screentime_store::Store;
use tempfile::TempDir;

pub struct TestStore {
    pub _dir: TempDir,
    pub store: Store,
    pub path: PathBuf,
}

pub fn setup_store() -> TestStore {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut store = Store::open(&path).expect("open store");
    store.migrate().expect("migrate store");
    TestStore {
        _dir: dir,
        store,
        path,
    }
}
