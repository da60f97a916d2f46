// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Read table columns into raw byte buffers.
//!
//! Elements are written in native byte order; booleans take one byte each.

mod error;

pub use error::GetColumnError;

use std::ops::Range;

use log::trace;

use crate::{
    c32, c64,
    table::{ColumnKind, DataType, Element, Table, TableExt},
};

/// Elements that can be copied into a byte buffer.
trait RawElement: Element {
    const SIZE: usize;

    /// `out` must be exactly `values.len() * SIZE` bytes long.
    fn write_raw(values: &[Self], out: &mut [u8]);
}

macro_rules! impl_raw_pod {
    ($($t:ty),*) => {
        $(
            impl RawElement for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn write_raw(values: &[Self], out: &mut [u8]) {
                    out.copy_from_slice(bytemuck::cast_slice(values));
                }
            }
        )*
    };
}

impl_raw_pod!(u8, i16, u16, i32, u32, f32, f64, c32, c64);

impl RawElement for bool {
    const SIZE: usize = 1;

    fn write_raw(values: &[Self], out: &mut [u8]) {
        out.iter_mut()
            .zip(values)
            .for_each(|(o, &v)| *o = u8::from(v));
    }
}

type Copier =
    fn(&dyn Table, &str, Range<u64>, Selection, &mut [u8]) -> Result<usize, GetColumnError>;

/// Copiers for columns with one element per row.
const SCALAR_COPIERS: [(DataType, Copier); 10] = [
    (DataType::Bool, copy_scalar::<bool> as Copier),
    (DataType::UChar, copy_scalar::<u8> as Copier),
    (DataType::Short, copy_scalar::<i16> as Copier),
    (DataType::UShort, copy_scalar::<u16> as Copier),
    (DataType::Int, copy_scalar::<i32> as Copier),
    (DataType::UInt, copy_scalar::<u32> as Copier),
    (DataType::Float, copy_scalar::<f32> as Copier),
    (DataType::Double, copy_scalar::<f64> as Copier),
    (DataType::Complex, copy_scalar::<c32> as Copier),
    (DataType::DComplex, copy_scalar::<c64> as Copier),
];

/// Copiers for columns with array cells.
const ARRAY_COPIERS: [(DataType, Copier); 10] = [
    (DataType::Bool, copy_array::<bool> as Copier),
    (DataType::UChar, copy_array::<u8> as Copier),
    (DataType::Short, copy_array::<i16> as Copier),
    (DataType::UShort, copy_array::<u16> as Copier),
    (DataType::Int, copy_array::<i32> as Copier),
    (DataType::UInt, copy_array::<u32> as Copier),
    (DataType::Float, copy_array::<f32> as Copier),
    (DataType::Double, copy_array::<f64> as Copier),
    (DataType::Complex, copy_array::<c32> as Copier),
    (DataType::DComplex, copy_array::<c64> as Copier),
];

fn find_copier(copiers: &[(DataType, Copier)], data_type: DataType) -> Option<Copier> {
    copiers
        .iter()
        .find(|(dt, _)| *dt == data_type)
        .map(|(_, copier)| *copier)
}

/// Where the rows being copied start, so that a short buffer can be
/// reported against them.
#[derive(Clone, Copy)]
struct Selection {
    start_row: u64,
    total_rows: u64,
}

impl Selection {
    fn check(self, required: usize, buffer: &[u8]) -> Result<(), GetColumnError> {
        if buffer.len() < required {
            return Err(GetColumnError::OutOfRange {
                start_row: self.start_row,
                num_rows: self.total_rows,
                required,
                capacity: buffer.len(),
            });
        }
        Ok(())
    }
}

fn write_checked<T: RawElement>(
    values: &[T],
    selection: Selection,
    buffer: &mut [u8],
) -> Result<usize, GetColumnError> {
    let required = values.len() * T::SIZE;
    selection.check(required, buffer)?;
    T::write_raw(values, &mut buffer[..required]);
    Ok(required)
}

fn copy_scalar<T: RawElement>(
    table: &dyn Table,
    column: &str,
    rows: Range<u64>,
    selection: Selection,
    buffer: &mut [u8],
) -> Result<usize, GetColumnError> {
    selection.check((rows.end - rows.start) as usize * T::SIZE, buffer)?;
    let values: Vec<T> = table.get_range(column, rows)?;
    write_checked(&values, selection, buffer)
}

fn copy_array<T: RawElement>(
    table: &dyn Table,
    column: &str,
    rows: Range<u64>,
    selection: Selection,
    buffer: &mut [u8],
) -> Result<usize, GetColumnError> {
    let fixed_elements = table.column_desc(column).and_then(|desc| desc.cell_elements());
    let values: Vec<T> = match fixed_elements {
        Some(n) => {
            selection.check((rows.end - rows.start) as usize * n * T::SIZE, buffer)?;
            table.get_range(column, rows)?
        }
        // Cells may differ in shape; concatenate them.
        None => {
            let mut values = vec![];
            for row in rows {
                values.extend(table.get_vec::<T>(column, row)?);
            }
            values
        }
    };
    write_checked(&values, selection, buffer)
}

/// Copy `num_rows` rows of `column`, starting at `start_row`, into `buffer`,
/// returning the number of bytes the rows occupy.
///
/// The number of rows is clamped to those available. Nothing is read when
/// `num_rows` is zero. If the column doesn't exist or the buffer is too
/// small, the buffer is untouched; the size it needs is part of the
/// [`GetColumnError::OutOfRange`] error.
pub fn get_column(
    table: &dyn Table,
    column: &str,
    start_row: u64,
    num_rows: u64,
    buffer: &mut [u8],
) -> Result<usize, GetColumnError> {
    let desc = table
        .column_desc(column)
        .ok_or_else(|| GetColumnError::ColumnNotFound(column.to_string()))?;
    if num_rows == 0 {
        return Ok(0);
    }
    let total_rows = table.num_rows();
    if start_row >= total_rows {
        return Err(GetColumnError::OutOfRange {
            start_row,
            num_rows: total_rows,
            required: 0,
            capacity: buffer.len(),
        });
    }
    let end_row = start_row.saturating_add(num_rows).min(total_rows);

    let copiers: &[(DataType, Copier)] = match desc.kind {
        ColumnKind::Scalar => &SCALAR_COPIERS,
        ColumnKind::FixedArray(_) | ColumnKind::VariableArray { .. } => &ARRAY_COPIERS,
    };
    let copier = find_copier(copiers, desc.data_type)
        .ok_or(GetColumnError::UnknownDataType(desc.data_type))?;
    trace!("Reading {column} rows {start_row}..{end_row}");
    let selection = Selection {
        start_row,
        total_rows,
    };
    copier(table, column, start_row..end_row, selection, buffer)
}
