// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gaussian system noise.

use log::trace;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::{VisBlock, VisBlockError, VisFloat, Visibility};

/// Add independent normally-distributed noise with standard deviation
/// `rms_jy` to the real and imaginary parts of every cross-correlation
/// polarisation. Autocorrelations are left untouched.
pub fn add_system_noise<T: Visibility, R: Rng + ?Sized>(
    block: &mut VisBlock<T>,
    rms_jy: f64,
    rng: &mut R,
) -> Result<(), VisBlockError> {
    if !rms_jy.is_finite() || rms_jy < 0.0 {
        return Err(VisBlockError::BadNoiseRms(rms_jy));
    }
    if rms_jy == 0.0 {
        return Ok(());
    }
    trace!("Adding system noise with RMS {rms_jy} Jy");

    let dist = Normal::new(0.0, rms_jy).map_err(|_| VisBlockError::BadNoiseRms(rms_jy))?;
    for vis in block.cross_tfb.iter_mut() {
        for pol in vis.pols_mut() {
            pol.re = pol.re + T::Float::from_f64(dist.sample(rng));
            pol.im = pol.im + T::Float::from_f64(dist.sample(rng));
        }
    }
    Ok(())
}
