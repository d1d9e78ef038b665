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

use std::path::PathBuf;
use odin_tle::{OdinTleError, config::{parse_env_file, TleArchiveConfig}, tle::LineTrim};

#[test]
fn test_default_layout() {
    let dir = tempfile::tempdir().unwrap();
    let layout = TleArchiveConfig::new( dir.path()).resolve().unwrap();

    assert_eq!( layout.archive, dir.path());
    assert_eq!( layout.inbox, dir.path().join("inbox"));
    assert_eq!( layout.daily, dir.path().join("day"));
    assert_eq!( layout.object, dir.path().join("obj"));
    assert_eq!( layout.extension, "txt");
    assert_eq!( layout.trim, LineTrim::Trailing);
    assert!( layout.max_workers > 0);
    assert!( layout.inbox_glob.is_match("2021-01-01.txt"));
    assert!( !layout.inbox_glob.is_match("notes.md"));
}

#[test]
fn test_absolute_subdirs() {
    let dir = tempfile::tempdir().unwrap();
    let other = tempfile::tempdir().unwrap();

    let mut config = TleArchiveConfig::new( dir.path());
    config.object = other.path().to_path_buf();
    let layout = config.resolve().unwrap();

    assert_eq!( layout.object, other.path());
    assert_eq!( layout.inbox, dir.path().join("inbox"));
}

#[test]
fn test_relative_archive_is_made_absolute() {
    let layout = TleArchiveConfig::new("some/archive").resolve().unwrap();
    assert!( layout.archive.is_absolute());
    assert!( layout.archive.ends_with("some/archive"));
    assert_eq!( layout.inbox, layout.archive.join("inbox"));
}

#[test]
fn test_ensure_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let layout = TleArchiveConfig::new( dir.path().join("archive")).resolve().unwrap();
    layout.ensure_dirs().unwrap();

    assert!( layout.inbox.is_dir());
    assert!( layout.daily.is_dir());
    assert!( layout.object.is_dir());
}

#[test]
fn test_from_vars() {
    let vars = vec![
        ("HOME", "/home/nobody"),
        ("TLE_ARCHIVE", "/data/tle"),
        ("TLE_OBJECT", "catalogs"),
        ("TLE_DAILY", "/data/processed"),
        ("TLE_TRIM", "none"),
        ("TLE_MAX_WORKERS", "3"),
        ("TLE_ABORT_ON_ERROR", "true"),
        ("TLE_UNKNOWN", "whatever"),
    ];
    let config = TleArchiveConfig::from_vars( vars).unwrap();

    assert_eq!( config.archive, PathBuf::from("/data/tle"));
    assert_eq!( config.object, PathBuf::from("catalogs"));
    assert_eq!( config.inbox, PathBuf::from("inbox"));
    assert_eq!( config.trim, LineTrim::None);
    assert_eq!( config.max_workers, Some(3));
    assert!( config.abort_on_error);

    let layout = config.resolve().unwrap();
    assert_eq!( layout.object, PathBuf::from("/data/tle/catalogs"));
    assert_eq!( layout.daily, PathBuf::from("/data/processed"));
    assert_eq!( layout.max_workers, 3);
}

#[test]
fn test_invalid_vars() {
    let res = TleArchiveConfig::from_vars( vec![("TLE_INBOX", "in")]);
    assert!( matches!( res, Err(OdinTleError::ConfigError(_))));

    let res = TleArchiveConfig::from_vars( vec![("TLE_ARCHIVE", "/data"), ("TLE_TRIM", "left")]);
    assert!( res.is_err());

    let res = TleArchiveConfig::from_vars( vec![("TLE_ARCHIVE", "/data"), ("TLE_MAX_WORKERS", "many")]);
    assert!( res.is_err());

    let config = TleArchiveConfig::from_vars( vec![("TLE_ARCHIVE", "/data"), ("TLE_MAX_WORKERS", "0")]).unwrap();
    assert!( matches!( config.resolve(), Err(OdinTleError::ConfigError(_))));
}

#[test]
fn test_invalid_config_values() {
    let mut config = TleArchiveConfig::new("/data");
    config.pattern = "[".to_string();
    assert!( matches!( config.resolve(), Err(OdinTleError::ConfigError(_))));

    let mut config = TleArchiveConfig::new("/data");
    config.extension = "a/b".to_string();
    assert!( config.resolve().is_err());

    assert!( TleArchiveConfig::new("").resolve().is_err());
}

#[test]
fn test_ron_config() {
    let config = TleArchiveConfig::from_ron_str( r#"
        TleArchiveConfig(
            archive: "/data/tle",
            inbox: "incoming",
            pattern: "*.tle",
            trim: Both,
        )
    "#).unwrap();

    assert_eq!( config.archive, PathBuf::from("/data/tle"));
    assert_eq!( config.inbox, PathBuf::from("incoming"));
    assert_eq!( config.daily, PathBuf::from("day"));
    assert_eq!( config.pattern, "*.tle");
    assert_eq!( config.trim, LineTrim::Both);
    assert_eq!( config.max_workers, None);
    assert!( !config.abort_on_error);

    assert!( TleArchiveConfig::from_ron_str("( inbox: \"x\" )").is_err()); // no archive

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tle_archive.ron");
    std::fs::write( &path, "(archive: \"/data/tle\", max_workers: Some(2))").unwrap();
    assert_eq!( TleArchiveConfig::load(&path).unwrap().max_workers, Some(2));
}

#[test]
fn test_case_insensitive_vars() {
    let config = TleArchiveConfig::from_vars( vec![
        ("tle_archive", "/data/tle"),
        ("Tle_Inbox", "incoming"),
        ("TLE_INBOX", "later"), // later values win
    ]).unwrap();

    assert_eq!( config.archive, PathBuf::from("/data/tle"));
    assert_eq!( config.inbox, PathBuf::from("later"));
}

#[test]
fn test_env_file() {
    let text = "\
# archive settings
TLE_ARCHIVE=/data/tle
export TLE_OBJECT = \"catalogs\"
tle_pattern='*.tle'

not a setting
";
    let vars = parse_env_file( text);
    assert_eq!( vars, vec![
        ("TLE_ARCHIVE".to_string(), "/data/tle".to_string()),
        ("TLE_OBJECT".to_string(), "catalogs".to_string()),
        ("tle_pattern".to_string(), "*.tle".to_string()),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    std::fs::write( &path, text).unwrap();

    let config = TleArchiveConfig::from_env_file( &path).unwrap();
    assert_eq!( config.object, PathBuf::from("catalogs"));
    assert_eq!( config.pattern, "*.tle");

    // a missing dotenv file is not an error, a missing archive is
    let res = TleArchiveConfig::from_env_file( dir.path().join("nope.env"));
    if std::env::var("TLE_ARCHIVE").is_err() {
        assert!( matches!( res, Err(OdinTleError::ConfigError(_))));
    }
}
