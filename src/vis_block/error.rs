// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with visibility blocks.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisBlockError {
    #[error("Invalid argument: the {what} has {got} elements, but the block dimensions need {expected}")]
    InvalidArgument {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("The noise RMS must be a finite, non-negative number; got {0}")]
    BadNoiseRms(f64),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
