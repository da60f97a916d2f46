// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Persistent tables.
//!
//! A table has a fixed set of named, typed columns, a growable number of rows,
//! and a keyword set. Code that stores measurement sets only depends on the
//! [`Table`] and [`TableEngine`] traits; [`CasaEngine`] stores tables with
//! casacore.

mod casa;
mod desc;
mod error;
mod keywords;
mod values;
#[cfg(test)]
mod tests;

pub use casa::{CasaEngine, CasaTable, LAYOUT_KEYWORD};
pub use desc::{ColumnDesc, ColumnKind, StorageManager, TableDesc};
pub use error::TableError;
pub use keywords::{Keyword, Keywords};
pub use values::{Cell, DataType, Element, Values};

use std::{ops::Range, path::Path};

/// A table with typed cells.
pub trait Table {
    /// The directory holding the table.
    fn path(&self) -> &Path;

    fn desc(&self) -> &TableDesc;

    fn num_rows(&self) -> u64;

    /// Append `n` rows with default-valued cells.
    fn add_rows(&mut self, n: u64) -> Result<(), TableError>;

    /// Add a column. Existing rows get default-valued cells.
    fn add_column(&mut self, desc: ColumnDesc) -> Result<(), TableError>;

    fn get_cell(&self, column: &str, row: u64) -> Result<Cell, TableError>;

    fn put_cell(&mut self, column: &str, row: u64, cell: &Cell) -> Result<(), TableError>;

    /// The cells of `rows`, concatenated in row order.
    fn get_column_range(&self, column: &str, rows: Range<u64>) -> Result<Values, TableError>;

    /// Overwrite consecutive cells of a fixed-shape column starting at
    /// `start_row`. `values` must hold a whole number of cells.
    fn put_column_range(
        &mut self,
        column: &str,
        start_row: u64,
        values: &Values,
    ) -> Result<(), TableError>;

    fn keywords(&self) -> &Keywords;

    fn keywords_mut(&mut self) -> &mut Keywords;

    /// Write all pending changes to disk.
    fn flush(&mut self) -> Result<(), TableError>;

    fn column_desc(&self, column: &str) -> Option<&ColumnDesc> {
        self.desc().column(column)
    }

    fn has_column(&self, column: &str) -> bool {
        self.column_desc(column).is_some()
    }
}

/// Creates new tables and opens existing ones.
pub trait TableEngine {
    /// Create a table at `path`, which must not already exist.
    fn create(&self, path: &Path, desc: TableDesc) -> Result<Box<dyn Table>, TableError>;

    fn open(&self, path: &Path) -> Result<Box<dyn Table>, TableError>;

    /// Whether a table exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

fn bad_type(column: &str, expected: DataType, got: &Values) -> TableError {
    TableError::BadDataType {
        column: column.to_string(),
        expected,
        got: got.data_type(),
    }
}

/// Typed convenience accessors available on every [`Table`].
pub trait TableExt: Table {
    fn get_scalar<T: Element>(&self, column: &str, row: u64) -> Result<T, TableError> {
        self.get_vec(column, row)?
            .into_iter()
            .next()
            .ok_or_else(|| TableError::BadShape {
                column: column.to_string(),
                expected: vec![],
                got: vec![0],
                num_values: 0,
            })
    }

    fn put_scalar<T: Element>(&mut self, column: &str, row: u64, value: T) -> Result<(), TableError> {
        self.put_cell(column, row, &Cell::scalar(value))
    }

    /// The elements of a cell, fastest-varying axis first.
    fn get_vec<T: Element>(&self, column: &str, row: u64) -> Result<Vec<T>, TableError> {
        let cell = self.get_cell(column, row)?;
        T::from_values(cell.values).map_err(|v| bad_type(column, T::DATA_TYPE, &v))
    }

    fn put_array<T: Element>(
        &mut self,
        column: &str,
        row: u64,
        shape: &[usize],
        values: Vec<T>,
    ) -> Result<(), TableError> {
        self.put_cell(column, row, &Cell::array(shape.to_vec(), values))
    }

    fn put_vec<T: Element>(&mut self, column: &str, row: u64, values: Vec<T>) -> Result<(), TableError> {
        self.put_cell(column, row, &Cell::vector(values))
    }

    /// Every cell of a column, concatenated.
    fn get_column_as_vec<T: Element>(&self, column: &str) -> Result<Vec<T>, TableError> {
        let values = self.get_column_range(column, 0..self.num_rows())?;
        T::from_values(values).map_err(|v| bad_type(column, T::DATA_TYPE, &v))
    }

    /// The cells of `rows`, concatenated.
    fn get_range<T: Element>(&self, column: &str, rows: Range<u64>) -> Result<Vec<T>, TableError> {
        let values = self.get_column_range(column, rows)?;
        T::from_values(values).map_err(|v| bad_type(column, T::DATA_TYPE, &v))
    }

    fn put_range<T: Element>(
        &mut self,
        column: &str,
        start_row: u64,
        values: Vec<T>,
    ) -> Result<(), TableError> {
        self.put_column_range(column, start_row, &T::into_values(values))
    }
}

impl<T: Table + ?Sized> TableExt for T {}
