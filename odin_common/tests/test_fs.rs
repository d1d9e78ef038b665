/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{fs, io::{ErrorKind, Write}, path::{Path,PathBuf}};
use globset::Glob;
use odin_common::fs::*;

// run with "cargo test -p odin_common --test test_fs -- --nocapture"

#[test]
fn test_matching_files() {
    let glob = Glob::new("*.rs").unwrap().compile_matcher();
    let files = matching_files_in_dir( &Path::new("src"), &glob).unwrap();

    assert!( files.contains( &PathBuf::from("src/fs.rs")));
    assert!( files.iter().all(|f| f.extension().is_some_and(|e| e == "rs")));
    assert!( files.is_sorted());
}

#[test]
fn test_matching_files_skips_dirs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write( dir.path().join("b.txt"), "b").unwrap();
    fs::write( dir.path().join("a.txt"), "a").unwrap();
    fs::write( dir.path().join("c.md"), "c").unwrap();
    fs::create_dir( dir.path().join("d.txt")).unwrap();

    let glob = Glob::new("*.txt").unwrap().compile_matcher();
    let files = matching_files_in_dir( &dir.path(), &glob).unwrap();
    assert_eq!( files, vec![ dir.path().join("a.txt"), dir.path().join("b.txt")]);

    let res = matching_files_in_dir( &dir.path().join("nope"), &glob);
    assert_eq!( res.unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_write_file_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");

    write_file_atomic( &path, |w| w.write_all(b"first")).unwrap();
    assert_eq!( fs::read_to_string(&path).unwrap(), "first");

    // a failing writer leaves the old contents and no temp file behind
    let res = write_file_atomic( &path, |w| {
        w.write_all(b"partial")?;
        Err( std::io::Error::new( ErrorKind::Other, "boom"))
    });
    assert!( res.is_err());
    assert_eq!( fs::read_to_string(&path).unwrap(), "first");
    assert_eq!( fs::read_dir( dir.path()).unwrap().count(), 1);

    write_file_atomic( &path, |w| w.write_all(b"second")).unwrap();
    assert_eq!( fs::read_to_string(&path).unwrap(), "second");
}

#[test]
fn test_move_file_to_dir() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("inbox");
    let dst = dir.path().join("done");
    ensure_writable_dir( &src).unwrap();
    ensure_writable_dir( &dst).unwrap();

    let path = src.join("a.txt");
    fs::write( &path, "a").unwrap();

    let moved = move_file_to_dir( &path, &dst).unwrap();
    assert_eq!( moved, dst.join("a.txt"));
    assert!( !path.exists());
    assert_eq!( fs::read_to_string(&moved).unwrap(), "a");

    assert!( move_file_to_dir( &path, &dst).is_err());
}

#[test]
fn test_move_file_does_not_replace() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("inbox");
    let dst = dir.path().join("done");
    ensure_writable_dir( &src).unwrap();
    ensure_writable_dir( &dst).unwrap();

    fs::write( dst.join("tle.txt"), "first batch").unwrap();
    let path = src.join("tle.txt");
    fs::write( &path, "second batch").unwrap();

    let err = move_file_to_dir( &path, &dst).unwrap_err();
    assert_eq!( err.kind(), ErrorKind::AlreadyExists);

    // neither side is touched
    assert_eq!( fs::read_to_string( dst.join("tle.txt")).unwrap(), "first batch");
    assert_eq!( fs::read_to_string( &path).unwrap(), "second batch");
}

#[test]
fn test_replace_env_var_path() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();

    let p = replace_env_var_path("$CARGO_MANIFEST_DIR/src").unwrap();
    assert_eq!( p, Path::new(&manifest_dir).join("src"));

    assert_eq!( replace_env_var_path("data/tle").unwrap(), PathBuf::from("data/tle"));
    assert!( replace_env_var_path("$ODIN_SURELY_NOT_SET_XYZ/tle").is_err());
}
