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

use std::{collections::BTreeSet, path::{Path,PathBuf}};
use tracing::{debug,error,info,warn};
use odin_common::fs::{matching_files_in_dir, move_file_to_dir};
use crate::{
    KeyOutcome,
    catalog::{CatalogStore, CatalogUpdate},
    collate::collate,
    config::{ArchiveLayout, TleArchiveConfig},
    errors::{OdinTleError, Result},
    pool::WorkerPool,
    tle::{read_tle_file, tle_satnum, TleRecord},
};

/// what happened to an inbox file
#[derive(Debug,Clone,PartialEq)]
pub enum FileStatus {
    /// moved to the processed (daily) area
    Relocated(PathBuf),
    /// left in the inbox to be retried by the next run
    Retained(String),
}

#[derive(Debug,Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub n_tles: usize,
    pub status: FileStatus,
}

#[derive(Debug)]
pub struct IngestReport {
    pub files: Vec<FileOutcome>,
    pub catalogs: Vec<KeyOutcome<CatalogUpdate>>,
    pub n_tles: usize,
    pub n_unique: usize,
    pub n_skipped: usize,
}

impl IngestReport {
    pub fn n_relocated (&self) -> usize {
        self.files.iter().filter(|f| matches!( f.status, FileStatus::Relocated(_))).count()
    }

    pub fn n_retained (&self) -> usize {
        self.files.len() - self.n_relocated()
    }

    pub fn n_failed_catalogs (&self) -> usize {
        self.catalogs.iter().filter(|o| o.is_failed()).count()
    }

    pub fn is_success (&self) -> bool {
        self.n_retained() == 0 && self.n_failed_catalogs() == 0
    }
}

/// the records of one inbox file, or why we could not get them
struct SourceBatch {
    path: PathBuf,
    tles: Result<Vec<TleRecord>>,
}

/// ingests inbox files into per-satellite catalogs:
/// DISCOVER → PARSE → COLLATE → MERGE+WRITE (per satnum) → RELOCATE.
/// Parsing and catalog merges run on one bounded worker pool. A source file is only relocated
/// once all catalogs it contributed to have been written, otherwise it stays in the inbox
pub struct Ingester {
    layout: ArchiveLayout,
    pool: WorkerPool,
    catalogs: CatalogStore,
}

impl Ingester {
    pub fn new (config: &TleArchiveConfig) -> Result<Self> {
        Ok( Ingester::with_layout( config.resolve()?))
    }

    pub fn with_layout (layout: ArchiveLayout) -> Self {
        let pool = WorkerPool::new( layout.max_workers);
        let catalogs = CatalogStore::new( &layout.object, &layout.extension, layout.trim);
        Ingester { layout, pool, catalogs }
    }

    pub fn layout (&self) -> &ArchiveLayout { &self.layout }
    pub fn catalogs (&self) -> &CatalogStore { &self.catalogs }
    pub fn pool (&self) -> &WorkerPool { &self.pool }

    /// the pending inbox files, sorted by path
    pub fn discover (&self) -> Result<Vec<PathBuf>> {
        let inbox = &self.layout.inbox;
        matching_files_in_dir( inbox, &self.layout.inbox_glob)
            .map_err(|source| OdinTleError::InboxError { path: inbox.clone(), source })
    }

    pub async fn ingest (&self) -> Result<IngestReport> {
        //--- discover
        let files = self.discover().inspect_err(|e| error!("{e}"))?;
        if files.is_empty() {
            info!("no files in inbox {:?}", self.layout.inbox);
            return Ok( IngestReport { files: Vec::new(), catalogs: Vec::new(), n_tles: 0, n_unique: 0, n_skipped: 0 } )
        }
        info!("ingesting {} inbox files", files.len());

        //--- parse
        let batches = self.parse( files).await;
        let n_tles: usize = batches.iter().map(|b| b.tles.as_ref().map_or(0, |t| t.len())).sum();

        //--- collate
        let collated = collate(
            batches.iter().filter_map(|b| b.tles.as_ref().ok()).flatten().cloned(),
            tle_satnum
        );
        let n_unique = collated.n_unique();
        let n_skipped = collated.n_skipped;
        info!("collated {} unique of {} TLEs into {} catalogs ({} skipped)", n_unique, n_tles, collated.groups.len(), n_skipped);

        //--- merge + write
        let catalogs = self.merge_catalogs( collated.groups).await;
        let failed: BTreeSet<&str> = catalogs.iter().filter(|o| o.is_failed()).map(|o| o.key.as_str()).collect();

        let n_failed_files = batches.iter().filter(|b| b.tles.is_err()).count();
        if self.layout.abort_on_error && (n_failed_files > 0 || !failed.is_empty()) {
            return Err( OdinTleError::IngestFailed(
                format!("{} unreadable files, {} failed catalogs - no files relocated", n_failed_files, failed.len())))
        }

        //--- relocate
        let plans: Vec<Relocation> = batches.into_iter().map(|b| Relocation::plan( b, &failed)).collect();
        let files = self.relocate( plans).await;

        let report = IngestReport { files, catalogs, n_tles, n_unique, n_skipped };
        info!("ingest done: {} files relocated, {} retained, {} of {} catalogs failed",
              report.n_relocated(), report.n_retained(), report.n_failed_catalogs(), report.catalogs.len());

        Ok(report)
    }

    async fn parse (&self, files: Vec<PathBuf>) -> Vec<SourceBatch> {
        let trim = self.layout.trim;
        let results = self.pool.map( files.clone(), move |path| read_tle_file( &path, trim)).await;

        files.into_iter().zip(results).map( |(path,res)| {
            let tles = res.and_then(|r| r);
            if let Err(e) = &tles { warn!("{e}") }
            SourceBatch { path, tles }
        }).collect()
    }

    async fn merge_catalogs (&self, groups: impl IntoIterator<Item=(String,Vec<TleRecord>)>) -> Vec<KeyOutcome<CatalogUpdate>> {
        let groups: Vec<(String,Vec<TleRecord>)> = groups.into_iter().collect();
        let satnums: Vec<String> = groups.iter().map(|(satnum,_)| satnum.clone()).collect();

        let store = self.catalogs.clone();
        let results = self.pool.map( groups, move |(satnum,tles)| store.merge( &satnum, &tles)).await;

        satnums.into_iter().zip(results).map( |(satnum,res)| {
            match res.and_then(|r| r) {
                Ok(update) => KeyOutcome::written( satnum, update),
                Err(e) => {
                    warn!("catalog {satnum} not updated: {e}");
                    KeyOutcome::failed( satnum, e.to_string())
                }
            }
        }).collect()
    }

    async fn relocate (&self, plans: Vec<Relocation>) -> Vec<FileOutcome> {
        let paths: Vec<PathBuf> = plans.iter().map(|p| p.path.clone()).collect();
        let daily = self.layout.daily.clone();
        let results = self.pool.map( plans, move |plan| plan.execute( &daily)).await;

        paths.into_iter().zip(results).map( |(path,res)| {
            res.unwrap_or_else(|e| FileOutcome { path, n_tles: 0, status: FileStatus::Retained( e.to_string()) })
        }).collect()
    }
}

/// what to do with a parsed inbox file once all catalogs are written
struct Relocation {
    path: PathBuf,
    n_tles: usize,
    blocked: Option<String>, // reason to keep the file in the inbox
}

impl Relocation {
    fn plan (batch: SourceBatch, failed: &BTreeSet<&str>) -> Self {
        let SourceBatch { path, tles } = batch;

        let tles = match tles {
            Ok(tles) => tles,
            Err(e) => return Relocation { path, n_tles: 0, blocked: Some( e.to_string()) }
        };

        let blocking: BTreeSet<String> = tles.iter()
            .filter_map(|tle| tle_satnum(tle).ok())
            .filter(|satnum| failed.contains( satnum.as_str()))
            .collect();

        let blocked = if blocking.is_empty() {
            None
        } else {
            Some( format!("catalogs not written: {}", blocking.into_iter().collect::<Vec<_>>().join(",")))
        };

        Relocation { path, n_tles: tles.len(), blocked }
    }

    /// move to the processed area. An already processed file of the same name is never replaced
    fn execute (self, daily: &Path) -> FileOutcome {
        let Relocation { path, n_tles, blocked } = self;

        let status = match blocked {
            Some(reason) => FileStatus::Retained( reason),
            None => match move_file_to_dir( &path, daily) {
                Ok(new_path) => {
                    debug!("relocated {:?} -> {:?}", path, new_path);
                    FileStatus::Relocated( new_path)
                }
                Err(e) => {
                    warn!("failed to relocate {:?}: {e}", path);
                    FileStatus::Retained( format!("relocation failed: {e}"))
                }
            }
        };

        FileOutcome { path, n_tles, status }
    }
}
