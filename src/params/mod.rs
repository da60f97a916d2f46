// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters that are ready to be used directly.
//!
//! The `cli` module holds unparsed, user-facing arguments; once those have
//! been merged and validated they become the structs here.

mod error;
mod vis_synthesize;

pub use error::ParamsError;
pub use vis_synthesize::{Precision, SynthesisParams};

use hifitime::Epoch;
use log::debug;

use crate::constants::DEFAULT_SEED;

/// Turn a seed setting into a concrete seed. No setting gives the default
/// seed, "time" gives the current UNIX time in seconds, and anything else must
/// be an unsigned integer.
pub fn resolve_seed(seed: Option<&str>) -> Result<u64, ParamsError> {
    let seed = match seed.map(str::trim) {
        None => DEFAULT_SEED,
        Some(s) if s.eq_ignore_ascii_case("time") => {
            Epoch::now()?.to_unix_seconds().max(0.0) as u64
        }
        Some(s) => s
            .parse()
            .map_err(|_| ParamsError::BadSeed(s.to_string()))?,
    };
    debug!("Using random seed {seed}");
    Ok(seed)
}
