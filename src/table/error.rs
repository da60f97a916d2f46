// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from the table engine.

use std::path::PathBuf;

use thiserror::Error;

use super::DataType;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Cannot create table '{0}'; something already exists at that path")]
    AlreadyExists(PathBuf),

    #[error("'{0}' is not a table")]
    NotATable(PathBuf),

    #[error("Column '{0}' does not exist")]
    ColumnNotFound(String),

    #[error("Column '{0}' already exists")]
    ColumnExists(String),

    #[error("Row {row} is out of range; the table has {num_rows} rows")]
    RowOutOfRange { row: u64, num_rows: u64 },

    #[error("Column '{column}' holds {expected} elements, but {got} elements were used")]
    BadDataType {
        column: String,
        expected: DataType,
        got: DataType,
    },

    #[error("Column '{column}' expects cells of shape {expected:?}, but got {got:?} ({num_values} values)")]
    BadShape {
        column: String,
        expected: Vec<usize>,
        got: Vec<usize>,
        num_values: usize,
    },

    #[error("Column '{column}' can't hold a cell of shape {shape:?}")]
    UnsupportedShape { column: String, shape: Vec<usize> },

    #[error("Table '{0}' was closed after an earlier error")]
    Closed(PathBuf),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Casacore(#[from] rubbl_casatables::CasacoreError),

    #[error(transparent)]
    Casatables(#[from] rubbl_casatables::TableError),
}
