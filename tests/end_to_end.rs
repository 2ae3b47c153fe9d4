//! Integration coverage of the concrete end-to-end scenario and universal
//! invariants described in `SPEC_FULL.md` §8, exercised against real temp
//! files rather than in-process mocks.

use hashfile::engine::HashTable;
use hashfile::error::HashFileError;
use hashfile::file::InitMode;
use hashfile::logical::NoPredecessor;
use hashfile::playlist::{Disposition, MusicRecord};
use hashfile::traverse::{TraverseBy, VisitAction};

const SLOT_CNT: u32 = 4;
const NODE_VALUE_SIZE: u32 = 204;
const HEADER_VALUE_SIZE: u32 = 8;

fn fresh_table() -> (tempfile::TempDir, HashTable<MusicRecord>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("playlist.hash");
    let table = HashTable::init(
        &path,
        InitMode::OpenOrCreate,
        SLOT_CNT,
        NODE_VALUE_SIZE,
        HEADER_VALUE_SIZE,
    )
    .expect("init");
    (dir, table)
}

fn record(path: &str) -> MusicRecord {
    MusicRecord::new(Disposition::Keep, path).expect("record")
}

fn matcher(path: &'static str) -> impl Fn(&MusicRecord) -> bool {
    move |v: &MusicRecord| v.path() == path
}

fn traverse_paths(table: &mut HashTable<MusicRecord>, slot: u32) -> Vec<String> {
    let mut seen = Vec::new();
    table
        .traverse(
            TraverseBy::Logical,
            Some(slot),
            false,
            &mut |_key: u32, value: &mut MusicRecord| {
                seen.push(value.path().to_owned());
                VisitAction::DoNothing
            },
        )
        .expect("traverse");
    seen
}

#[test]
fn fresh_file_lays_out_empty_self_looping_anchors() {
    let (_dir, mut table) = fresh_table();
    for i in 0..SLOT_CNT {
        assert!(table.is_slot_empty(i).expect("empty check"));
        assert_eq!(table.get_slot_node_count(i).expect("count"), 0);
    }
}

#[test]
fn concrete_seven_step_walkthrough() {
    let (_dir, mut table) = fresh_table();

    // 1. init already verified by fresh_table / fresh_file_lays_out_empty_self_looping_anchors.

    // 2. add(key=5, prev=None, curr={path:"a"}) into empty bucket 1.
    table.add(5, &NoPredecessor, &record("a")).expect("add a");
    assert_eq!(table.get_slot_node_count(1).expect("count"), 1);
    assert_eq!(traverse_paths(&mut table, 1), vec!["a"]);

    // 3. add(key=9, prev={path:"a"}, curr={path:"b"}).
    table.add(9, &matcher("a"), &record("b")).expect("add b");
    assert_eq!(table.get_slot_node_count(1).expect("count"), 2);
    assert_eq!(traverse_paths(&mut table, 1), vec!["a", "b"]);

    // 4. add(key=13, prev={path:"b"}, curr={path:"c"}).
    table.add(13, &matcher("b"), &record("c")).expect("add c");
    assert_eq!(table.get_slot_node_count(1).expect("count"), 3);
    assert_eq!(traverse_paths(&mut table, 1), vec!["a", "b", "c"]);

    // 5. delete(key=9, {path:"b"}) -> b becomes a tombstone.
    table.delete(9, &matcher("b")).expect("delete b");
    assert_eq!(table.get_slot_node_count(1).expect("count"), 2);
    assert_eq!(traverse_paths(&mut table, 1), vec!["a", "c"]);

    // 6. add(key=17, prev={path:"c"}, curr={path:"d"}) -> recycles b's tombstone.
    table.add(17, &matcher("c"), &record("d")).expect("add d");
    assert_eq!(table.get_slot_node_count(1).expect("count"), 3);
    assert_eq!(traverse_paths(&mut table, 1), vec!["a", "c", "d"]);

    // 7. traverse(Logical, slot=1, visit = delete-all) empties the bucket.
    table
        .traverse(
            TraverseBy::Logical,
            Some(1),
            false,
            &mut |_key: u32, _value: &mut MusicRecord| VisitAction::Delete,
        )
        .expect("delete all");
    assert!(table.is_slot_empty(1).expect("empty check"));
    assert!(traverse_paths(&mut table, 1).is_empty());
}

#[test]
fn tombstone_recycling_does_not_grow_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("playlist.hash");
    let mut table: HashTable<MusicRecord> = HashTable::init(
        &path,
        InitMode::OpenOrCreate,
        SLOT_CNT,
        NODE_VALUE_SIZE,
        HEADER_VALUE_SIZE,
    )
    .expect("init");

    table.add(1, &NoPredecessor, &record("a")).expect("add a");
    let size_after_first_insert = std::fs::metadata(&path).expect("metadata").len();

    for i in 0..5 {
        let path_name: &'static str = Box::leak(format!("iter-{i}").into_boxed_str());
        table
            .add(1, &matcher("a"), &record(path_name))
            .expect("add");
        table.delete(1, &matcher(path_name)).expect("delete");
    }

    let size_after_churn = std::fs::metadata(&path).expect("metadata").len();
    assert_eq!(size_after_first_insert, size_after_churn);
}

#[test]
fn insert_delete_round_trip_empties_every_bucket() {
    let (_dir, mut table) = fresh_table();
    let keys = [0_u32, 1, 2, 3, 4, 5, 6, 7];

    for key in keys {
        let path_name: &'static str = Box::leak(format!("song-{key}").into_boxed_str());
        table
            .add(key, &NoPredecessor, &record(path_name))
            .expect("add");
    }
    for key in keys {
        let path_name: &'static str = Box::leak(format!("song-{key}").into_boxed_str());
        table.delete(key, &matcher(path_name)).expect("delete");
    }

    for slot in 0..SLOT_CNT {
        assert!(table.is_slot_empty(slot).expect("empty check"));
        assert!(traverse_paths(&mut table, slot).is_empty());
    }
}

#[test]
fn reopening_an_existing_file_is_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("playlist.hash");
    {
        let mut table: HashTable<MusicRecord> = HashTable::init(
            &path,
            InitMode::OpenOrCreate,
            SLOT_CNT,
            NODE_VALUE_SIZE,
            HEADER_VALUE_SIZE,
        )
        .expect("init");
        table.add(1, &NoPredecessor, &record("a")).expect("add a");
    }

    let before = std::fs::read(&path).expect("read");
    {
        let _table: HashTable<MusicRecord> = HashTable::init(
            &path,
            InitMode::OpenOrCreate,
            SLOT_CNT,
            NODE_VALUE_SIZE,
            HEADER_VALUE_SIZE,
        )
        .expect("reopen");
    }
    let after = std::fs::read(&path).expect("read again");
    assert_eq!(before, after);
}

#[test]
fn delete_missing_key_reports_not_found() {
    let (_dir, mut table) = fresh_table();
    let err = table.delete(0, &matcher("nonexistent")).expect_err("missing");
    assert!(matches!(err, HashFileError::NotFound));
}

#[test]
fn header_data_round_trips() {
    let (_dir, mut table) = fresh_table();
    let payload = [7_u8; HEADER_VALUE_SIZE as usize];
    table.set_header_data(&payload).expect("set");
    let mut out = [0_u8; HEADER_VALUE_SIZE as usize];
    table.get_header_data(&mut out).expect("get");
    assert_eq!(out, payload);
}
