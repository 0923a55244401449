#![allow(dead_code)]

//! Helpers for laying out and inspecting project trees on disk.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Write `contents` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, contents).expect("write file");
    path
}

/// Set the modification time of an existing file.
pub fn set_mtime(path: &Path, time: SystemTime) {
    let file = File::options()
        .write(true)
        .open(path)
        .expect("open file for mtime");
    file.set_modified(time).expect("set mtime");
}

/// Push a file's mtime `secs` seconds into the past.
pub fn age(path: &Path, secs: u64) {
    set_mtime(path, SystemTime::now() - Duration::from_secs(secs));
}

/// Push a file's mtime `secs` seconds into the future.
pub fn freshen(path: &Path, secs: u64) {
    set_mtime(path, SystemTime::now() + Duration::from_secs(secs));
}

/// Age every file below `root`.
pub fn age_tree(root: &Path, secs: u64) {
    if !root.is_dir() {
        return;
    }
    for entry in fs::read_dir(root).expect("read dir") {
        let path = entry.expect("dir entry").path();
        if path.is_dir() {
            age_tree(&path, secs);
        } else {
            age(&path, secs);
        }
    }
}

/// Every regular file below `root`, keyed by forward-slash relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    collect(root, root, &mut out);
    out
}

fn collect(root: &Path, dir: &Path, out: &mut BTreeMap<String, String>) {
    if !dir.is_dir() {
        return;
    }
    for entry in fs::read_dir(dir).expect("read dir") {
        let path = entry.expect("dir entry").path();
        if path.is_dir() {
            collect(root, &path, out);
        } else {
            let rel = path
                .strip_prefix(root)
                .expect("path under root")
                .to_string_lossy()
                .replace('\\', "/");
            out.insert(rel, fs::read_to_string(&path).unwrap_or_default());
        }
    }
}

/// A small app tree: resources (with one nested script and an image),
/// two localisation files and one spec.
pub fn sample_app(root: &Path) {
    write_file(root, "Resources/app.js", "Ti.UI.createWindow().open();\n");
    write_file(root, "Resources/ui/view.js", "module.exports = {};\n");
    write_file(root, "Resources/images/logo.png", "\u{1}PNGDATA\u{0}\u{2}");
    write_file(root, "i18n/en/strings.xml", "<resources/>\n");
    write_file(root, "i18n/de/strings.xml", "<resources></resources>\n");
    write_file(root, "spec/app_spec.js", "describe('app', function() {});\n");
}
