// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all vistable-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::{dump_column::DumpColumnArgsError, synthesize::SynthesizeArgsError};
use crate::{
    io::{read::GetColumnError, write::VisWriteError},
    ms::MsError,
    params::ParamsError,
    table::TableError,
    vis_block::VisBlockError,
};

/// The *only* publicly visible error from vistable.
#[derive(Error, Debug)]
pub enum VistableError {
    /// An error related to synthesize.
    #[error("{0}")]
    Synthesize(String),

    /// An error from a measurement set or one of its tables.
    #[error("Measurement set error: {0}")]
    Ms(String),

    /// An error from writing visibilities.
    #[error("Couldn't write visibilities: {0}")]
    VisWrite(String),

    /// An error from reading a column.
    #[error("Couldn't read the column: {0}")]
    ColumnRead(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

impl From<SynthesizeArgsError> for VistableError {
    fn from(e: SynthesizeArgsError) -> Self {
        match e {
            SynthesizeArgsError::Params(e) => Self::from(e),
            _ => Self::Synthesize(e.to_string()),
        }
    }
}

impl From<DumpColumnArgsError> for VistableError {
    fn from(e: DumpColumnArgsError) -> Self {
        Self::ColumnRead(e.to_string())
    }
}

impl From<ParamsError> for VistableError {
    fn from(e: ParamsError) -> Self {
        let s = e.to_string();
        match e {
            ParamsError::BadSeed(_) | ParamsError::Time(_) => Self::Synthesize(s),
            ParamsError::VisBlock(e) => Self::from(e),
            ParamsError::VisWrite(e) => Self::from(e),
            ParamsError::Ms(e) => Self::from(e),
        }
    }
}

impl From<VisBlockError> for VistableError {
    fn from(e: VisBlockError) -> Self {
        Self::Synthesize(e.to_string())
    }
}

impl From<VisWriteError> for VistableError {
    fn from(e: VisWriteError) -> Self {
        match e {
            VisWriteError::Ms(e) => Self::from(e),
            VisWriteError::DimensionMismatch { .. } | VisWriteError::BadDataType { .. } => {
                Self::VisWrite(e.to_string())
            }
        }
    }
}

impl From<MsError> for VistableError {
    fn from(e: MsError) -> Self {
        match e {
            MsError::Table(e) => Self::from(e),
            _ => Self::Ms(e.to_string()),
        }
    }
}

impl From<TableError> for VistableError {
    fn from(e: TableError) -> Self {
        Self::Ms(e.to_string())
    }
}

impl From<GetColumnError> for VistableError {
    fn from(e: GetColumnError) -> Self {
        match e {
            GetColumnError::Table(e) => Self::from(e),
            _ => Self::ColumnRead(e.to_string()),
        }
    }
}

impl From<std::io::Error> for VistableError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
