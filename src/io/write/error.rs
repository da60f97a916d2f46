// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from writing visibility blocks.

use thiserror::Error;

use crate::ms::MsError;

#[derive(Error, Debug)]
pub enum VisWriteError {
    #[error("Dimension mismatch: the block has {got} {what}, but the measurement set has {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Can't write {num_pols_in}-polarisation visibilities into a measurement set with {num_pols_out} polarisations")]
    BadDataType {
        num_pols_in: usize,
        num_pols_out: usize,
    },

    #[error(transparent)]
    Ms(#[from] MsError),
}
