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

//! archiving of two line element sets (TLEs). Raw TLE files are merged into per-satellite catalogs
//! (see [`ingest::Ingester`]) or split into per-day snapshot files (see [`daily::DailyArchive`])

pub mod errors;
pub mod tle;
pub mod collate;
pub mod pool;
pub mod config;
pub mod catalog;
pub mod daily;
pub mod ingest;

pub use errors::{OdinTleError, Result};

/// per-key (satnum or date) result of a write phase
#[derive(Debug,Clone,PartialEq)]
pub enum KeyStatus<T> {
    Written(T),
    Failed(String),
}

#[derive(Debug,Clone,PartialEq)]
pub struct KeyOutcome<T> {
    pub key: String,
    pub status: KeyStatus<T>,
}

impl<T> KeyOutcome<T> {
    pub fn written (key: impl Into<String>, value: T) -> Self {
        KeyOutcome { key: key.into(), status: KeyStatus::Written(value) }
    }

    pub fn failed (key: impl Into<String>, reason: impl Into<String>) -> Self {
        KeyOutcome { key: key.into(), status: KeyStatus::Failed(reason.into()) }
    }

    pub fn is_failed (&self) -> bool {
        matches!( self.status, KeyStatus::Failed(_))
    }

    pub fn written_value (&self) -> Option<&T> {
        match &self.status {
            KeyStatus::Written(v) => Some(v),
            KeyStatus::Failed(_) => None
        }
    }
}
