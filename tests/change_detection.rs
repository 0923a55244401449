// tests/change_detection.rs

mod common;
use crate::common::{TestResult, write_file};

use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use proptest::prelude::*;
use tempfile::tempdir;

use shadowpack::changes::{ChangeSetResolver, FileMap, FileSet, TimestampGate};
use shadowpack::errors::BuildError;
use shadowpack::types::{BuildMode, Watermark};

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
}

fn stamp(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

#[test]
fn full_scan_lists_every_file_and_its_directories() -> TestResult {
    let dir = tempdir()?;
    write_file(dir.path(), "app.js", "a");
    write_file(dir.path(), "ui/view.js", "b");
    write_file(dir.path(), "ui/widgets/button.js", "c");
    std::fs::create_dir_all(dir.path().join("empty"))?;

    let set = ChangeSetResolver.resolve(dir.path(), None)?;

    assert_eq!(
        set.files,
        vec!["app.js", "ui/view.js", "ui/widgets/button.js"]
    );
    let dirs: Vec<&str> = set.dirs.iter().map(String::as_str).collect();
    assert_eq!(dirs, vec!["ui", "ui/widgets"]);
    Ok(())
}

#[test]
fn watermark_selects_only_strictly_newer_files() -> TestResult {
    let dir = tempdir()?;
    let before = write_file(dir.path(), "before.js", "");
    let equal = write_file(dir.path(), "equal.js", "");
    let after = write_file(dir.path(), "nested/after.js", "");
    stamp(&before, at(10));
    stamp(&equal, at(20));
    stamp(&after, at(30));

    let set = ChangeSetResolver.resolve(dir.path(), Some(Watermark::new(at(20))))?;

    assert_eq!(set.files, vec!["nested/after.js"]);
    assert!(set.dirs.contains("nested"));
    Ok(())
}

#[test]
fn missing_tree_is_empty() -> TestResult {
    let dir = tempdir()?;
    let set = ChangeSetResolver.resolve(&dir.path().join("i18n"), None)?;
    assert!(set.is_empty());
    assert!(set.dirs.is_empty());
    Ok(())
}

#[test]
fn prefixed_set_adds_the_prefix_directory() {
    let set = FileSet::from_files(["app_spec.js", "models/user_spec.js"]).prefixed("spec");
    assert_eq!(set.files, vec!["spec/app_spec.js", "spec/models/user_spec.js"]);
    let dirs: Vec<&str> = set.dirs.iter().map(String::as_str).collect();
    assert_eq!(dirs, vec!["spec", "spec/models"]);
}

#[test]
fn gate_without_update_is_full() -> TestResult {
    let dir = tempdir()?;
    let gate = TimestampGate::new(dir.path().join("last_updated"));
    assert_eq!(gate.resolve_mode(false)?, (BuildMode::Full, None));
    Ok(())
}

#[test]
fn gate_update_without_sentinel_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let gate = TimestampGate::new(dir.path().join("last_updated"));
    match gate.resolve_mode(true) {
        Err(BuildError::Configuration(msg)) => assert!(msg.contains("no previous build")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn gate_update_with_sentinel_is_incremental_at_its_mtime() -> TestResult {
    let dir = tempdir()?;
    let sentinel = write_file(dir.path(), "last_updated", "");
    stamp(&sentinel, at(42));

    let gate = TimestampGate::new(&sentinel);
    let (mode, watermark) = gate.resolve_mode(true)?;

    assert_eq!(mode, BuildMode::Incremental);
    assert_eq!(watermark, Some(Watermark::new(at(42))));
    Ok(())
}

#[test]
fn advancing_moves_the_watermark_forward() -> TestResult {
    let dir = tempdir()?;
    let gate = TimestampGate::new(dir.path().join("build/last_updated"));
    assert!(gate.current()?.is_none());

    let first = gate.advance()?;
    stamp(gate.sentinel(), at(0));
    let second = gate.advance()?;

    assert!(second.time() >= first.time());
    assert!(gate.current()?.unwrap() > Watermark::new(at(0)));
    Ok(())
}

#[test]
fn file_map_drops_files_whose_content_did_not_change() -> TestResult {
    let dir = tempdir()?;
    write_file(dir.path(), "app.js", "one");
    write_file(dir.path(), "ui/view.js", "two");
    let previous = FileMap::build(dir.path())?;

    write_file(dir.path(), "ui/view.js", "two, edited");
    write_file(dir.path(), "ui/new.js", "three");
    let current = FileMap::build(dir.path())?;

    let touched = FileSet::from_files(["app.js", "ui/new.js", "ui/view.js"]);
    let changed = current.filter_changed(&previous, touched);

    assert_eq!(changed.files, vec!["ui/new.js", "ui/view.js"]);
    Ok(())
}

#[test]
fn file_map_survives_a_write_and_load() -> TestResult {
    let dir = tempdir()?;
    write_file(dir.path(), "src/app.js", "x");
    let map = FileMap::build(&dir.path().join("src"))?;
    let path = dir.path().join("dist/file_map.json");

    map.write(&path)?;
    let loaded = FileMap::load(&path)?.expect("map was written");

    assert_eq!(loaded, map);
    assert_eq!(loaded.len(), 1);
    assert!(FileMap::load(&dir.path().join("nope.json"))?.is_none());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn resolver_matches_a_direct_mtime_filter(
        offsets in proptest::collection::vec(0u64..100, 1..12),
        watermark in 0u64..100,
    ) {
        let dir = tempdir().unwrap();
        let mut expected = BTreeSet::new();
        for (i, offset) in offsets.iter().enumerate() {
            let rel = format!("d{}/f{i}.js", i % 3);
            let path = write_file(dir.path(), &rel, "");
            stamp(&path, at(*offset));
            if *offset > watermark {
                expected.insert(rel);
            }
        }

        let set = ChangeSetResolver
            .resolve(dir.path(), Some(Watermark::new(at(watermark))))
            .unwrap();
        let got: BTreeSet<String> = set.files.iter().cloned().collect();

        prop_assert_eq!(got, expected);
        for file in &set.files {
            let parent = file.rsplit_once('/').map(|(d, _)| d).unwrap();
            prop_assert!(set.dirs.contains(parent));
        }
    }
}
