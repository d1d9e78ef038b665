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

use std::{fs, io::ErrorKind, path::{Path,PathBuf}};
use globset::{Glob,GlobMatcher};
use serde::{Serialize,Deserialize};
use odin_common::fs::{ensure_writable_dir, filepath_contents_as_string, replace_env_var_path};
use crate::{errors::{OdinTleError, Result, config_error}, pool::default_pool_size, tle::LineTrim};

/// prefix of environment variables that can be used instead of a config file
pub const ENV_PREFIX: &str = "TLE_";

/// dotenv file read by [`TleArchiveConfig::from_env`]
pub const ENV_FILE: &str = ".env";

/// the user facing archive configuration, e.g. from a `tle_archive.ron` file:
/// ```ron
/// TleArchiveConfig(
///     archive: "$HOME/data/tle",
///     object: "obj",
///     trim: Trailing,
/// )
/// ```
/// Relative `daily`, `object` and `inbox` paths are relative to `archive`.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct TleArchiveConfig {
    pub archive: PathBuf,

    #[serde(default="default_daily")]
    pub daily: PathBuf,   // processed raw input files

    #[serde(default="default_object")]
    pub object: PathBuf,  // per satellite catalogs

    #[serde(default="default_inbox")]
    pub inbox: PathBuf,   // pending raw input files

    #[serde(default="default_pattern")]
    pub pattern: String,  // glob for inbox files

    #[serde(default="default_extension")]
    pub extension: String, // of catalog files

    #[serde(default)]
    pub trim: LineTrim,

    #[serde(default)]
    pub max_workers: Option<usize>,

    #[serde(default)]
    pub abort_on_error: bool,
}

fn default_daily () -> PathBuf { PathBuf::from("day") }
fn default_object () -> PathBuf { PathBuf::from("obj") }
fn default_inbox () -> PathBuf { PathBuf::from("inbox") }
fn default_pattern () -> String { "*.txt".to_string() }
fn default_extension () -> String { "txt".to_string() }

impl TleArchiveConfig {
    pub fn new (archive: impl Into<PathBuf>) -> Self {
        TleArchiveConfig {
            archive: archive.into(),
            daily: default_daily(),
            object: default_object(),
            inbox: default_inbox(),
            pattern: default_pattern(),
            extension: default_extension(),
            trim: LineTrim::default(),
            max_workers: None,
            abort_on_error: false,
        }
    }

    pub fn from_ron_str (s: &str) -> Result<Self> {
        ron::from_str(s).map_err(|e| config_error!("invalid config: {e}"))
    }

    pub fn load (path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = filepath_contents_as_string(&path).map_err(|source| OdinTleError::ReadError{ path: path.to_path_buf(), source })?;
        Self::from_ron_str(&s)
    }

    /// config from `TLE_` variables of a `.env` file in the current dir (if any) and the process environment
    pub fn from_env () -> Result<Self> {
        Self::from_env_file( ENV_FILE)
    }

    /// like [`from_env`](Self::from_env) but with an explicit dotenv file. Process environment variables
    /// take precedence over file entries, a missing file is ignored
    pub fn from_env_file (path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut vars = match fs::read_to_string( path) {
            Ok(text) => parse_env_file( &text),
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err( OdinTleError::ReadError { path: path.to_path_buf(), source })
        };
        vars.extend( std::env::vars());
        Self::from_vars( vars)
    }

    /// build a config from `TLE_<FIELD>` variables. Names are case insensitive and later values win.
    /// Only `TLE_ARCHIVE` is required
    pub fn from_vars<I,K,V> (vars: I) -> Result<Self> where I: IntoIterator<Item=(K,V)>, K: AsRef<str>, V: AsRef<str> {
        let mut archive: Option<PathBuf> = None;
        let mut cfg = TleArchiveConfig::new( PathBuf::new());

        for (k,v) in vars {
            let key = k.as_ref().to_ascii_uppercase();
            let Some(field) = key.strip_prefix(ENV_PREFIX) else { continue };
            let v = v.as_ref();

            match field {
                "ARCHIVE" => archive = Some( PathBuf::from(v)),
                "DAILY" => cfg.daily = PathBuf::from(v),
                "OBJECT" => cfg.object = PathBuf::from(v),
                "INBOX" => cfg.inbox = PathBuf::from(v),
                "PATTERN" => cfg.pattern = v.to_string(),
                "EXTENSION" => cfg.extension = v.to_string(),
                "TRIM" => cfg.trim = v.parse()?,
                "MAX_WORKERS" => cfg.max_workers = Some( v.parse().map_err(|_| config_error!("invalid {key}: {v:?}"))?),
                "ABORT_ON_ERROR" => cfg.abort_on_error = parse_bool(v).ok_or( config_error!("invalid {key}: {v:?}"))?,
                _ => {} // not ours
            }
        }

        cfg.archive = archive.ok_or( config_error!("{ENV_PREFIX}ARCHIVE not set"))?;
        Ok(cfg)
    }

    /// validate and turn into absolute paths. This is done once, before any archive operation
    pub fn resolve (&self) -> Result<ArchiveLayout> {
        if self.archive.as_os_str().is_empty() {
            return Err( config_error!("no archive root"))
        }

        let archive = std::path::absolute( expand(&self.archive)?)?;
        let sub_dir = |p: &Path| -> Result<PathBuf> {
            let p = expand(p)?;
            Ok( if p.is_absolute() { p } else { archive.join(p) } )
        };

        let inbox_glob = Glob::new( &self.pattern).map_err(|e| config_error!("invalid inbox pattern {:?}: {e}", self.pattern))?.compile_matcher();

        if self.extension.is_empty() || self.extension.contains(['/', '\\']) {
            return Err( config_error!("invalid catalog extension {:?}", self.extension))
        }

        let max_workers = match self.max_workers {
            Some(0) => return Err( config_error!("max_workers has to be positive")),
            Some(n) => n,
            None => default_pool_size()
        };

        Ok( ArchiveLayout {
            daily: sub_dir( &self.daily)?,
            object: sub_dir( &self.object)?,
            inbox: sub_dir( &self.inbox)?,
            archive,
            inbox_glob,
            extension: self.extension.clone(),
            trim: self.trim,
            max_workers,
            abort_on_error: self.abort_on_error,
        })
    }
}

fn expand (p: &Path) -> Result<PathBuf> {
    replace_env_var_path(p).map_err(|e| config_error!("cannot expand path {p:?}: {e}"))
}

/// `KEY=VALUE` lines of a dotenv file. Blank lines, `#` comments and an `export ` prefix are skipped,
/// values can be single or double quoted
pub fn parse_env_file (text: &str) -> Vec<(String,String)> {
    text.lines().filter_map( |line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { return None }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let (k,v) = line.split_once('=')?;
        let v = v.trim();
        let v = [('"','"'), ('\'','\'')].iter()
            .find_map(|(open,close)| v.strip_prefix(*open).and_then(|v| v.strip_suffix(*close)))
            .unwrap_or(v);

        Some( (k.trim().to_string(), v.to_string()) )
    }).collect()
}

fn parse_bool (s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None
    }
}

/// the resolved (absolute) archive layout the engine works with
#[derive(Debug,Clone)]
pub struct ArchiveLayout {
    pub archive: PathBuf,
    pub daily: PathBuf,
    pub object: PathBuf,
    pub inbox: PathBuf,
    pub inbox_glob: GlobMatcher,
    pub extension: String,
    pub trim: LineTrim,
    pub max_workers: usize,
    pub abort_on_error: bool,
}

impl ArchiveLayout {
    /// create missing archive directories
    pub fn ensure_dirs (&self) -> Result<()> {
        for dir in [&self.archive, &self.inbox, &self.daily, &self.object] {
            ensure_writable_dir(dir)?;
        }
        Ok(())
    }
}
