// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use tempfile::TempDir;

fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn packed(files: &[(&str, &str)]) -> Vec<u8> {
    let src = tree(files);
    pack_dir(src.path(), Vec::new()).unwrap()
}

#[test]
fn pack_and_unpack_preserves_tree() {
    let data = packed(&[("README.md", "hello"), ("src/main.rs", "fn main() {}")]);
    let dest = TempDir::new().unwrap();

    unpack_into(&data[..], dest.path(), false).unwrap();

    assert_eq!(
        fs::read_to_string(dest.path().join("README.md")).unwrap(),
        "hello"
    );
    assert_eq!(
        fs::read_to_string(dest.path().join("src/main.rs")).unwrap(),
        "fn main() {}"
    );
}

#[cfg(unix)]
#[test]
fn symlinks_are_stored_as_links() {
    let src = tree(&[("target.txt", "x")]);
    std::os::unix::fs::symlink("target.txt", src.path().join("link")).unwrap();
    let data = pack_dir(src.path(), Vec::new()).unwrap();

    let dest = TempDir::new().unwrap();
    unpack_into(&data[..], dest.path(), false).unwrap();

    let link = fs::read_link(dest.path().join("link")).unwrap();
    assert_eq!(link, PathBuf::from("target.txt"));
}

#[test]
fn delta_overlays_layer_and_applies_whiteouts() {
    let layer = packed(&[("keep.txt", "layer"), ("edit.txt", "old"), ("gone/a.txt", "a")]);
    let delta = packed(&[("edit.txt", "new"), (".wh.gone", ""), ("added.txt", "+")]);
    let dest = TempDir::new().unwrap();

    unpack_into(&layer[..], dest.path(), false).unwrap();
    unpack_into(&delta[..], dest.path(), true).unwrap();

    assert_eq!(fs::read_to_string(dest.path().join("keep.txt")).unwrap(), "layer");
    assert_eq!(fs::read_to_string(dest.path().join("edit.txt")).unwrap(), "new");
    assert_eq!(fs::read_to_string(dest.path().join("added.txt")).unwrap(), "+");
    assert!(!dest.path().join("gone").exists());
    assert!(!dest.path().join(".wh.gone").exists());
}

#[test]
fn whiteouts_are_plain_files_when_disabled() {
    let data = packed(&[(".wh.note", "literal")]);
    let dest = TempDir::new().unwrap();
    unpack_into(&data[..], dest.path(), false).unwrap();
    assert!(dest.path().join(".wh.note").exists());
}

#[test]
fn whiteout_for_missing_entry_is_ignored() {
    let delta = packed(&[("dir/.wh.never-existed", "")]);
    let dest = TempDir::new().unwrap();
    unpack_into(&delta[..], dest.path(), true).unwrap();
    assert!(!dest.path().join("dir/never-existed").exists());
}

/// Archive holding exactly the given entries, with no parent directories.
fn raw_entries(paths: &[&str]) -> Vec<u8> {
    let encoder = zstd::Encoder::new(Vec::new(), 3).unwrap();
    let mut builder = tar::Builder::new(encoder);
    for path in paths {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder.append_data(&mut header, path, &b""[..]).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

#[cfg(unix)]
#[test]
fn whiteout_through_symlinked_parent_is_rejected() {
    let outside = tree(&[("victim.txt", "keep me")]);
    let src = TempDir::new().unwrap();
    std::os::unix::fs::symlink(outside.path(), src.path().join("link")).unwrap();
    let layer = pack_dir(src.path(), Vec::new()).unwrap();
    let dest = TempDir::new().unwrap();
    unpack_into(&layer[..], dest.path(), false).unwrap();

    let result = unpack_into(&raw_entries(&["link/.wh.victim.txt"])[..], dest.path(), true);

    assert!(matches!(result, Err(ArchiveError::UnsafePath(_))), "{result:?}");
    assert_eq!(
        fs::read_to_string(outside.path().join("victim.txt")).unwrap(),
        "keep me"
    );
}

#[cfg(unix)]
#[test]
fn whiteout_of_a_symlink_removes_only_the_link() {
    let outside = tree(&[("victim.txt", "keep me")]);
    let src = TempDir::new().unwrap();
    std::os::unix::fs::symlink(outside.path(), src.path().join("link")).unwrap();
    let layer = pack_dir(src.path(), Vec::new()).unwrap();
    let dest = TempDir::new().unwrap();
    unpack_into(&layer[..], dest.path(), false).unwrap();

    unpack_into(&raw_entries(&[".wh.link"])[..], dest.path(), true).unwrap();

    assert!(fs::symlink_metadata(dest.path().join("link")).is_err());
    assert!(outside.path().join("victim.txt").exists());
}

#[test]
fn garbage_is_an_error() {
    let dest = TempDir::new().unwrap();
    let result = unpack_into(&b"definitely not zstd"[..], dest.path(), false);
    assert!(result.is_err());
}

#[test]
fn truncated_archive_is_an_error() {
    let data = packed(&[("big.txt", &"x".repeat(64 * 1024))]);
    let dest = TempDir::new().unwrap();
    let result = unpack_into(&data[..data.len() / 2], dest.path(), false);
    assert!(result.is_err());
}

#[test]
fn tree_size_counts_regular_files() {
    let dir = tree(&[("a", "12345"), ("sub/b", "123")]);
    assert_eq!(tree_size(dir.path()), 8);
}

#[test]
fn tree_size_of_missing_dir_is_zero() {
    assert_eq!(tree_size(Path::new("/nonexistent/wsd/tree")), 0);
}

#[test]
fn hashing_reader_and_writer_agree() {
    let abc = "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    let mut reader = HashingReader::new(&b"abc"[..]);
    io::copy(&mut reader, &mut io::sink()).unwrap();
    assert_eq!(reader.digest(), abc);

    let mut writer = HashingWriter::new(Vec::new());
    writer.write_all(b"abc").unwrap();
    let (bytes, digest) = writer.finish();
    assert_eq!(bytes, b"abc");
    assert_eq!(digest, abc);
}
