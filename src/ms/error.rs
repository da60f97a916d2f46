// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with measurement sets.

use std::path::PathBuf;

use thiserror::Error;

use crate::table::TableError;

#[derive(Error, Debug)]
pub enum MsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch: expected {expected} {what}, but got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Column '{0}' is not in the measurement set")]
    ColumnNotFound(String),

    #[error("Row {row} is beyond the end of the main table ({num_rows} rows)")]
    OutOfRange { row: u64, num_rows: u64 },

    #[error("The measurement set at {path} has no {name} sub-table")]
    MissingSubTable { path: PathBuf, name: &'static str },

    #[error("Couldn't get the current time: {0}")]
    Time(#[from] hifitime::Errors),

    #[error(transparent)]
    Table(#[from] TableError),
}
