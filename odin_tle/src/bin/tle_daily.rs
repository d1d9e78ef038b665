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
use tokio;
use anyhow::{Result,anyhow};
use clap::Parser;
use globset::Glob;
use tracing::warn;
use odin_common::fs::{ensure_writable_dir, matching_files_in_dir};
use odin_tle::{daily::DailyArchive, pool::WorkerPool, tle::{read_tle_file, LineTrim}};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "split TLE files into one sorted file per epoch date")]
pub struct Args {
    /// glob for source files within source dirs
    #[arg(short,long, default_value = "*.txt")]
    pub pattern: String,

    /// extension of generated day files
    #[arg(short,long, default_value = "tce")]
    pub extension: String,

    /// line normalization (none|trailing|both)
    #[arg(short,long, default_value = "none")]
    pub trim: LineTrim,

    /// max number of concurrent file operations (default is available parallelism)
    #[arg(short,long)]
    pub workers: Option<usize>,

    /// source dirs
    #[arg(required = true, num_args = 1..)]
    pub sources: Vec<PathBuf>,

    /// output dir for day files
    pub destination: PathBuf,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let glob = Glob::new( &args.pattern)?.compile_matcher();

    let mut files: Vec<PathBuf> = Vec::new();
    for dir in &args.sources {
        files.extend( matching_files_in_dir( dir, &glob)?);
    }

    let pool = match args.workers {
        Some(n) => WorkerPool::new(n),
        None => WorkerPool::with_available_parallelism()
    };

    let trim = args.trim;
    let mut tles = Vec::new();
    for res in pool.map( files, move |path| read_tle_file( &path, trim)).await {
        match res.and_then(|r| r) {
            Ok(file_tles) => tles.extend( file_tles),
            Err(e) => warn!("{e}")
        }
    }

    ensure_writable_dir( &args.destination)?;
    let archive = DailyArchive::new( &args.destination, &args.extension);
    let report = archive.write_batch( &pool, tles).await;

    for day in &report.days {
        if let Some(update) = day.written_value() {
            println!("{}: {} TLEs", update.path.display(), update.n_tles);
        }
    }

    if report.n_failed() == 0 {
        Ok(())
    } else {
        Err( anyhow!("failed to write {} of {} day files", report.n_failed(), report.days.len()))
    }
}
