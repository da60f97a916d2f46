// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Read rows of a column through the generic column accessor and print them.

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    io::read::{get_column, GetColumnError},
    ms::SubTable,
    table::{DataType, Table},
    MeasurementSet, VistableError,
};

#[derive(Parser, Debug)]
pub(super) struct DumpColumnArgs {
    /// Path to the measurement set.
    #[clap(name = "MEASUREMENT_SET", parse(from_os_str))]
    ms: PathBuf,

    /// The name of the column, e.g. UVW or DATA.
    #[clap(name = "COLUMN")]
    column: String,

    /// Read from this sub-table rather than the main table, e.g. ANTENNA.
    #[clap(long)]
    table: Option<String>,

    /// The first row to read.
    #[clap(short, long, default_value = "0")]
    start_row: u64,

    /// The number of rows to read. Default: all rows after the start row.
    #[clap(short, long)]
    num_rows: Option<u64>,

    /// Don't print values, only the number of bytes read.
    #[clap(long)]
    bytes_only: bool,
}

impl DumpColumnArgs {
    pub(super) fn run(self) -> Result<(), VistableError> {
        let DumpColumnArgs {
            ms,
            column,
            table,
            start_row,
            num_rows,
            bytes_only,
        } = self;

        let ms = MeasurementSet::open(ms)?;
        let table: &dyn Table = match table {
            None => ms.main(),
            Some(name) => {
                let sub = SubTable::from_str(&name.to_uppercase())
                    .map_err(|_| DumpColumnArgsError::UnknownSubTable(name))?;
                ms.sub(sub)
            }
        };
        let num_rows = num_rows.unwrap_or_else(|| table.num_rows().saturating_sub(start_row));

        // Ask with an empty buffer first to learn how big the buffer must be.
        let required = match get_column(table, &column, start_row, num_rows, &mut []) {
            Ok(n) => n,
            // Only a short buffer reports a non-zero size.
            Err(GetColumnError::OutOfRange { required, .. }) if required > 0 => required,
            Err(e) => return Err(e.into()),
        };
        debug!("Reading {required} bytes of {column}");
        let mut buffer = vec![0; required];
        let num_bytes = get_column(table, &column, start_row, num_rows, &mut buffer)?;
        info!("Read {num_bytes} bytes from {column}");

        if bytes_only {
            return Ok(());
        }
        // The accessor has already confirmed the column exists.
        let data_type = table
            .column_desc(&column)
            .map(|c| c.data_type)
            .ok_or_else(|| GetColumnError::ColumnNotFound(column.clone()))?;
        let values = format_values(data_type, &buffer[..num_bytes]);
        info!("{column} ({data_type}): [{}]", values.join(", "));

        Ok(())
    }
}

/// Decode native-endian elements of `data_type`.
fn format_values(data_type: DataType, bytes: &[u8]) -> Vec<String> {
    macro_rules! decode {
        ($ty:ty, $n:expr) => {
            bytes
                .chunks_exact($n)
                .map(|c| {
                    let mut a = [0; $n];
                    a.copy_from_slice(c);
                    <$ty>::from_ne_bytes(a).to_string()
                })
                .collect()
        };
    }
    macro_rules! decode_complex {
        ($ty:ty, $n:expr) => {
            bytes
                .chunks_exact(2 * $n)
                .map(|c| {
                    let (mut re, mut im) = ([0; $n], [0; $n]);
                    re.copy_from_slice(&c[..$n]);
                    im.copy_from_slice(&c[$n..]);
                    format!(
                        "({}{:+}i)",
                        <$ty>::from_ne_bytes(re),
                        <$ty>::from_ne_bytes(im)
                    )
                })
                .collect()
        };
    }

    match data_type {
        DataType::Bool => bytes.iter().map(|&b| (b != 0).to_string()).collect(),
        DataType::UChar => bytes.iter().map(|b| b.to_string()).collect(),
        DataType::Short => decode!(i16, 2),
        DataType::UShort => decode!(u16, 2),
        DataType::Int => decode!(i32, 4),
        DataType::UInt => decode!(u32, 4),
        DataType::Float => decode!(f32, 4),
        DataType::Double => decode!(f64, 8),
        DataType::Complex => decode_complex!(f32, 4),
        DataType::DComplex => decode_complex!(f64, 8),
        // The accessor refuses these.
        DataType::String => vec![],
    }
}

#[derive(Error, Debug)]
pub(super) enum DumpColumnArgsError {
    #[error("Unknown sub-table '{0}'; supported: {}", SubTable::iter().join(", "))]
    UnknownSubTable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_values() {
        let bytes: Vec<u8> = [1.5f64, -2.0].iter().flat_map(|f| f.to_ne_bytes()).collect();
        assert_eq!(format_values(DataType::Double, &bytes), vec!["1.5", "-2"]);

        let bytes: Vec<u8> = [3.0f32, 4.0].iter().flat_map(|f| f.to_ne_bytes()).collect();
        assert_eq!(format_values(DataType::Complex, &bytes), vec!["(3+4i)"]);

        assert_eq!(
            format_values(DataType::Bool, &[0, 1]),
            vec!["false", "true"]
        );
        let bytes: Vec<u8> = [7i32, -1].iter().flat_map(|i| i.to_ne_bytes()).collect();
        assert_eq!(format_values(DataType::Int, &bytes), vec!["7", "-1"]);
    }
}
