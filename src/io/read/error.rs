// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from reading columns into byte buffers.

use thiserror::Error;

use crate::table::{DataType, TableError};

#[derive(Error, Debug)]
pub enum GetColumnError {
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// Either `start_row` is past the last of the table's `num_rows` rows,
    /// or the buffer can't hold the selected rows. `required` is the number
    /// of bytes the selected rows occupy; no rows are selected in the first
    /// case, so it is zero.
    #[error("Reading from row {start_row} of {num_rows} needs {required} bytes, but the buffer holds {capacity}")]
    OutOfRange {
        start_row: u64,
        num_rows: u64,
        required: usize,
        capacity: usize,
    },

    #[error("Can't copy elements of type {0} into a byte buffer")]
    UnknownDataType(DataType),

    #[error(transparent)]
    Table(#[from] TableError),
}
