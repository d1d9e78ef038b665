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

use std::path::{Path,PathBuf};
use serde::Serialize;
use tracing::{info,warn};
use crate::{
    KeyOutcome,
    collate::{collate, unique}, errors::Result, pool::WorkerPool,
    tle::{sort_by_epoch, tle_date, write_tle_file, TleRecord}
};

/// the per-day archive: one `<YYYYMMDD>.<ext>` file per epoch date. Day files are snapshots of a single
/// batch - they are written from scratch and replace whatever was stored under the same name before
#[derive(Debug,Clone)]
pub struct DailyArchive {
    dir: PathBuf,
    extension: String,
}

#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct DayUpdate {
    pub date: String,
    pub path: PathBuf,
    pub n_tles: usize,
}

#[derive(Debug)]
pub struct DailyReport {
    pub n_tles: usize,
    pub n_unique: usize,
    pub n_skipped: usize,
    pub days: Vec<KeyOutcome<DayUpdate>>,
}

impl DailyReport {
    pub fn n_failed (&self) -> usize {
        self.days.iter().filter(|o| o.is_failed()).count()
    }
}

impl DailyArchive {
    pub fn new (dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        DailyArchive { dir: dir.into(), extension: extension.into() }
    }

    pub fn dir (&self) -> &Path { &self.dir }

    pub fn day_path (&self, date: &str) -> PathBuf {
        self.dir.join( format!("{date}.{}", self.extension))
    }

    /// sort and (over)write the records of one date
    pub fn write_day (&self, date: &str, mut tles: Vec<TleRecord>) -> Result<DayUpdate> {
        let path = self.day_path(date);
        sort_by_epoch( &mut tles);
        write_tle_file( &path, &tles)?;

        Ok( DayUpdate { date: date.to_string(), path, n_tles: tles.len() } )
    }

    /// de-duplicate a batch, group it by epoch date and write one file per date on the worker pool.
    /// Failures are reported per date and do not stop the other dates
    pub async fn write_batch (&self, pool: &WorkerPool, tles: Vec<TleRecord>) -> DailyReport {
        let n_tles = tles.len();
        let collated = collate( unique(tles), tle_date);
        let n_unique = collated.n_unique();
        let n_skipped = collated.n_skipped;

        let dates: Vec<String> = collated.groups.keys().cloned().collect();
        let archive = self.clone();
        let results = pool.map( collated.groups, move |(date,tles)| archive.write_day( &date, tles)).await;

        let days: Vec<KeyOutcome<DayUpdate>> = dates.into_iter().zip(results).map( |(date,res)| {
            match res.and_then(|r| r) {
                Ok(update) => KeyOutcome::written( date, update),
                Err(e) => {
                    warn!("failed to write day {date}: {e}");
                    KeyOutcome::failed( date, e.to_string())
                }
            }
        }).collect();

        let report = DailyReport { n_tles, n_unique, n_skipped, days };
        info!("wrote {} day files ({} unique of {} TLEs, {} skipped)", report.days.len() - report.n_failed(), n_unique, n_tles, n_skipped);
        report
    }
}
