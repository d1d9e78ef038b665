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

use std::{fs, io, path::{Path,PathBuf}};
use serde::Serialize;
use tracing::{debug,info};
use odin_common::datetime::short_utc_datetime_string;
use crate::{
    collate::unique, errors::{OdinTleError, Result},
    tle::{format_tles, parse_tle_lines, sort_by_epoch, tle_epoch_datetime, write_tle_file, LineTrim, TleRecord}
};

/// the per-satellite archive: one `<satnum>.<ext>` file per object that accumulates all unique
/// TLEs we ever saw for it. Catalogs only grow - each merge rewrites the file with the union of
/// stored and new records
#[derive(Debug,Clone)]
pub struct CatalogStore {
    dir: PathBuf,
    extension: String,
    trim: LineTrim,
}

/// what a single catalog merge did
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct CatalogUpdate {
    pub satnum: String,
    pub path: PathBuf,
    pub n_existing: usize,
    pub n_added: usize,
    pub n_total: usize,
    pub rewritten: bool,
}

impl CatalogStore {
    pub fn new (dir: impl Into<PathBuf>, extension: impl Into<String>, trim: LineTrim) -> Self {
        CatalogStore { dir: dir.into(), extension: extension.into(), trim }
    }

    pub fn dir (&self) -> &Path { &self.dir }

    pub fn catalog_path (&self, satnum: &str) -> PathBuf {
        self.dir.join( format!("{satnum}.{}", self.extension))
    }

    /// the unique records currently stored for `satnum` (empty if there is no catalog yet)
    pub fn read_catalog (&self, satnum: &str) -> Result<Vec<TleRecord>> {
        let path = self.catalog_path(satnum);
        match self.read_stored( &path)? {
            Some(text) => Ok( unique( parse_tle_lines( &text, self.trim))),
            None => Ok( Vec::new() )
        }
    }

    fn read_stored (&self, path: &Path) -> Result<Option<String>> {
        if !path.is_file() { return Ok(None) }

        let read_err = |source| OdinTleError::ReadError { path: path.to_path_buf(), source };
        let bytes = fs::read( path).map_err(read_err)?;
        let text = String::from_utf8( bytes).map_err(|e| read_err( io::Error::new( io::ErrorKind::InvalidData, e)))?;
        Ok( Some(text))
    }

    /// union `tles` into the catalog of `satnum`. The catalog is rewritten with the sorted, de-duplicated union
    /// unless that is byte-identical to what is stored. A read error leaves the catalog untouched
    pub fn merge (&self, satnum: &str, tles: &[TleRecord]) -> Result<CatalogUpdate> {
        let path = self.catalog_path(satnum);
        let stored = self.read_stored( &path)?;
        let existing = match &stored {
            Some(text) => unique( parse_tle_lines( text, self.trim)),
            None => Vec::new()
        };
        let n_existing = existing.len();

        let mut all = unique( existing.into_iter().chain( tles.iter().cloned()));
        let n_total = all.len();
        let n_added = n_total - n_existing;

        sort_by_epoch( &mut all);
        let contents = format_tles( &all);

        let rewritten = stored.as_deref() != Some( contents.as_str());
        if rewritten {
            write_tle_file( &path, &all)?;

            let latest = all.iter().rev().find_map(|tle| tle_epoch_datetime(tle).ok());
            info!("catalog {satnum}: +{n_added} -> {n_total} TLEs (latest {})",
                  latest.map(|dt| short_utc_datetime_string(&dt)).unwrap_or_else(|| "-".to_string()));
        } else {
            debug!("catalog {satnum} unchanged");
        }

        Ok( CatalogUpdate { satnum: satnum.to_string(), path, n_existing, n_added, n_total, rewritten } )
    }
}
