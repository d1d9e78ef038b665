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
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinTleError>;

#[derive(Error,Debug)]
pub enum OdinTleError {

    /// record level - the offending record is skipped
    #[error("TLE parse error {0}")]
    ParseError( String ),

    #[error("failed to read {path:?}: {source}")]
    ReadError { path: PathBuf, source: std::io::Error },

    #[error("failed to write {path:?}: {source}")]
    WriteError { path: PathBuf, source: std::io::Error },

    /// the only globally fatal error of an ingestion run
    #[error("cannot list inbox {path:?}: {source}")]
    InboxError { path: PathBuf, source: std::io::Error },

    #[error("config error {0}")]
    ConfigError( String ),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("worker task failed {0}")]
    JoinError( #[from] tokio::task::JoinError),

    #[error("ingestion failed {0}")]
    IngestFailed( String ),

    #[error("operation failed {0}")]
    OpFailedError(String),
}

macro_rules! parse_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        OdinTleError::ParseError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use parse_error;

macro_rules! config_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        OdinTleError::ConfigError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use config_error;

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        OdinTleError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
