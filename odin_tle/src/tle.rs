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

use std::{fmt, fs::File, io::{BufRead,BufReader,Write}, ops::Range, path::Path, str::FromStr};
use chrono::{DateTime,NaiveDate,Utc};
use serde::{Serialize,Deserialize};
use tracing::debug;
use odin_common::{datetime::{date_from_day_of_year, datetime_from_fractional_day_of_year, yyyymmdd}, fs::write_file_atomic};
use crate::errors::{OdinTleError, Result, parse_error};

/// line1 columns of the (Alpha-5) satellite catalog number
pub const SATNUM_COLUMNS: Range<usize> = 2..7;

/// line1 columns of the YYDDD.DDDDDDDD epoch
pub const EPOCH_COLUMNS: Range<usize> = 18..32;

/// two digit epoch years from here on are 19xx, below are 20xx
pub const CENTURY_PIVOT: u32 = 57;

/* #region TleRecord *************************************************************************************/

/// a raw two line element set. Identity (Eq, Hash, Ord) is the exact content of both lines, which is
/// what we de-duplicate on. We only interpret the line1 fields we need for archiving (satnum and epoch)
#[derive(Debug,Clone,PartialEq,Eq,Hash,PartialOrd,Ord)]
pub struct TleRecord {
    line1: String,
    line2: String,
}

impl TleRecord {
    pub fn new (line1: impl Into<String>, line2: impl Into<String>) -> Self {
        TleRecord { line1: line1.into(), line2: line2.into() }
    }

    pub fn line1 (&self) -> &str { &self.line1 }
    pub fn line2 (&self) -> &str { &self.line2 }

    pub fn satnum (&self) -> Result<String> { tle_satnum(self) }
    pub fn epoch (&self) -> Result<Epoch> { tle_epoch(self) }
    pub fn date (&self) -> Result<String> { tle_date(self) }
    pub fn epoch_datetime (&self) -> Result<DateTime<Utc>> { tle_epoch_datetime(self) }
}

impl fmt::Display for TleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.line1)?;
        writeln!(f, "{}", self.line2)
    }
}

/* #endregion TleRecord */

/* #region key extractors ********************************************************************************/

/// the decoded line1 epoch with the two digit year already resolved into a full year
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Epoch {
    pub year: i32,
    pub day_of_year: f64, // 1-based, fractional
}

impl Epoch {
    /// parse a YYDDD.DDDDDDDD field. Blanks count as zeros
    pub fn parse (field: &str) -> Result<Self> {
        let s = field.replace(' ', "0");
        let (int_part, frac_part) = s.split_once('.').unwrap_or( (s.as_str(), ""));

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err( parse_error!("epoch field not decimal: {:?}", field))
        }

        let yyddd: u32 = int_part.parse().map_err(|_| parse_error!("epoch field out of range: {:?}", field))?;
        let yy = yyddd / 1000;
        if yy > 99 {
            return Err( parse_error!("epoch year out of range: {:?}", field))
        }

        let fraction: f64 = if frac_part.is_empty() { 0.0 } else {
            format!("0.{frac_part}").parse().map_err(|_| parse_error!("invalid epoch fraction: {:?}", field))?
        };
        let day_of_year = (yyddd % 1000) as f64 + fraction;
        if day_of_year >= 367.0 {
            return Err( parse_error!("epoch day out of range: {:?}", field))
        }

        Ok( Epoch { year: full_year(yy), day_of_year } )
    }

    /// the YYYYDDD.DDDDDDDD scalar that orders epochs
    pub fn value (&self) -> f64 {
        (self.year as f64) * 1000.0 + self.day_of_year
    }

    /// Jan 1 of the epoch year plus floor(day_of_year) - 1 days
    pub fn date (&self) -> Result<NaiveDate> {
        date_from_day_of_year( self.year, self.day_of_year.floor() as i64)
            .ok_or( parse_error!("no calendar date for epoch {}", self.value()))
    }

    pub fn datetime (&self) -> Result<DateTime<Utc>> {
        datetime_from_fractional_day_of_year( self.year, self.day_of_year)
            .ok_or( parse_error!("no datetime for epoch {}", self.value()))
    }
}

fn full_year (yy: u32) -> i32 {
    if yy >= CENTURY_PIVOT { 1900 + yy as i32 } else { 2000 + yy as i32 }
}

/// extract the 5 char satellite number, with blanks replaced by '0'
pub fn tle_satnum (tle: &TleRecord) -> Result<String> {
    let field = tle.line1.get(SATNUM_COLUMNS).ok_or( parse_error!("line1 too short for satnum: {:?}", tle.line1))?;
    Ok( field.replace(' ', "0") )
}

pub fn tle_epoch (tle: &TleRecord) -> Result<Epoch> {
    let end = tle.line1.len().min( EPOCH_COLUMNS.end);
    match tle.line1.get( EPOCH_COLUMNS.start..end) {
        Some(field) if !field.is_empty() => Epoch::parse( field),
        _ => Err( parse_error!("line1 too short for epoch: {:?}", tle.line1))
    }
}

/// the "YYYYMMDD" date of the TLE epoch
pub fn tle_date (tle: &TleRecord) -> Result<String> {
    tle_epoch(tle)?.date().map(|d| yyyymmdd(&d))
}

pub fn tle_epoch_datetime (tle: &TleRecord) -> Result<DateTime<Utc>> {
    tle_epoch(tle)?.datetime()
}

/// sort into archive order: ascending epoch, with ties broken by line content so that output is fully
/// determined by the record set. Records without a valid epoch go last
pub fn sort_by_epoch (tles: &mut [TleRecord]) {
    tles.sort();
    tles.sort_by_cached_key( |tle| match tle_epoch_datetime(tle) {
        Ok(dt) => (false, dt),
        Err(_) => (true, DateTime::<Utc>::MIN_UTC)
    });
}

/* #endregion key extractors */

/* #region reading and writing ***************************************************************************/

/// how raw lines are normalized before we look at the line number marker. Since normalized lines are
/// what gets stored this also affects record identity
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
pub enum LineTrim {
    /// only strip the line terminator
    None,
    #[default]
    Trailing,
    Both,
}

impl LineTrim {
    pub fn apply<'a> (&self, line: &'a str) -> &'a str {
        match self {
            LineTrim::None => line,
            LineTrim::Trailing => line.trim_end(),
            LineTrim::Both => line.trim(),
        }
    }
}

impl FromStr for LineTrim {
    type Err = OdinTleError;

    fn from_str (s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "raw" => Ok(LineTrim::None),
            "trailing" => Ok(LineTrim::Trailing),
            "both" => Ok(LineTrim::Both),
            _ => Err( OdinTleError::ConfigError( format!("unknown line trim mode {s:?} (expected none|trailing|both)")))
        }
    }
}

/// incremental line-pair assembler. A '1' line opens a record (dropping any open one), a '2' line closes
/// it. Everything else, including a '2' line without open record, is skipped
#[derive(Debug,Default)]
pub struct TleParser {
    trim: LineTrim,
    pending: Option<String>,
    n_orphans: usize, // '2' lines without preceding '1'
    n_ignored: usize, // empty or unmarked lines
}

impl TleParser {
    pub fn new (trim: LineTrim) -> Self {
        TleParser { trim, ..Default::default() }
    }

    pub fn push_line (&mut self, line: &str) -> Option<TleRecord> {
        let line = self.trim.apply(line);
        match line.as_bytes().first() {
            Some(b'1') => {
                self.pending = Some(line.to_string());
                None
            }
            Some(b'2') => {
                if let Some(line1) = self.pending.take() {
                    Some( TleRecord::new( line1, line))
                } else {
                    self.n_orphans += 1;
                    None
                }
            }
            _ => {
                self.n_ignored += 1;
                None
            }
        }
    }

    pub fn n_orphans (&self) -> usize { self.n_orphans }
    pub fn n_ignored (&self) -> usize { self.n_ignored }
}

pub fn parse_tle_lines (text: &str, trim: LineTrim) -> Vec<TleRecord> {
    let mut parser = TleParser::new(trim);
    text.lines().filter_map(|line| parser.push_line(line)).collect()
}

/// read all TLE records of a file. IO (including UTF-8) errors abort reading this file
pub fn read_tle_file (path: impl AsRef<Path>, trim: LineTrim) -> Result<Vec<TleRecord>> {
    let path = path.as_ref();
    let read_err = |source| OdinTleError::ReadError { path: path.to_path_buf(), source };

    let reader = BufReader::new( File::open(path).map_err(read_err)?);
    let mut parser = TleParser::new(trim);
    let mut tles = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(read_err)?;
        if let Some(tle) = parser.push_line(&line) {
            tles.push(tle);
        }
    }

    debug!("read {} TLEs from {:?} ({} orphan line2s, {} ignored lines)", tles.len(), path, parser.n_orphans(), parser.n_ignored());
    Ok(tles)
}

/// the file contents for records in the given order, i.e. what `write_tle_file` stores
pub fn format_tles (tles: &[TleRecord]) -> String {
    tles.iter().map(|tle| tle.to_string()).collect()
}

/// write records in the given order, two lines per record. This replaces `path` atomically
pub fn write_tle_file (path: impl AsRef<Path>, tles: &[TleRecord]) -> Result<()> {
    let path = path.as_ref();
    write_file_atomic( path, |w| {
        for tle in tles {
            write!(w, "{tle}")?;
        }
        Ok(())
    }).map_err(|source| OdinTleError::WriteError { path: path.to_path_buf(), source })
}

/* #endregion reading and writing */
