// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{io::write::VisWriteError, ms::MsError, vis_block::VisBlockError};

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Couldn't parse '{0}' as a seed; expected \"time\" or an unsigned integer")]
    BadSeed(String),

    #[error("Couldn't get the current time: {0}")]
    Time(#[from] hifitime::Errors),

    #[error(transparent)]
    VisBlock(#[from] VisBlockError),

    #[error(transparent)]
    VisWrite(#[from] VisWriteError),

    #[error(transparent)]
    Ms(#[from] MsError),
}
