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
use tracing::{info,warn};
use odin_tle::{KeyStatus, config::TleArchiveConfig, ingest::{FileStatus, Ingester}};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "merge TLE files from the archive inbox into per-satellite catalogs")]
pub struct Args {
    /// RON config file. If not set the config is taken from TLE_* environment variables
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// override the configured archive root dir
    #[arg(short,long)]
    pub archive: Option<PathBuf>,

    /// create missing archive directories
    #[arg(long)]
    pub create_dirs: bool,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TleArchiveConfig::load(path)?,
        None => match &args.archive {
            Some(archive) => TleArchiveConfig::new( archive), // no need for TLE_ARCHIVE if we have it on the command line
            None => TleArchiveConfig::from_env()?
        }
    };
    if let Some(archive) = &args.archive {
        config.archive = archive.clone();
    }

    let layout = config.resolve()?;
    if args.create_dirs {
        layout.ensure_dirs()?;
    }

    let ingester = Ingester::with_layout( layout);
    let report = ingester.ingest().await?;

    for outcome in &report.catalogs {
        if let KeyStatus::Failed(reason) = &outcome.status {
            warn!("catalog {} failed: {}", outcome.key, reason);
        }
    }
    for file in &report.files {
        match &file.status {
            FileStatus::Relocated(path) => info!("{:?} -> {:?}", file.path, path),
            FileStatus::Retained(reason) => warn!("{:?} retained: {}", file.path, reason),
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        Err( anyhow!("{} catalogs failed, {} files retained in inbox", report.n_failed_catalogs(), report.n_retained()))
    }
}
