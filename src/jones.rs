// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Complex types and Jones matrices.
 */

use std::ops::{Deref, DerefMut};

use num_complex::Complex;
use num_traits::{Float, Zero};

#[allow(non_camel_case_types)]
pub type c32 = Complex<f32>;
#[allow(non_camel_case_types)]
pub type c64 = Complex<f64>;

static_assertions::assert_eq_size!(c32, [f32; 2]);
static_assertions::assert_eq_size!(Jones<f32>, [f32; 8]);
static_assertions::assert_eq_size!(Jones<f64>, [f64; 8]);

/// A 2x2 complex matrix of correlation products, ordered XX, XY, YX, YY.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Jones<F: Float>([Complex<F>; 4]);

impl<F: Float> Jones<F> {
    /// A matrix with `s` on the diagonal (XX and YY) and zero cross terms.
    pub fn diagonal(s: Complex<F>) -> Self {
        let z = Complex::zero();
        Self([s, z, z, s])
    }

    pub fn any_nan(&self) -> bool {
        self.iter().any(|c| c.re.is_nan() || c.im.is_nan())
    }
}

impl<F: Float> Default for Jones<F> {
    fn default() -> Self {
        Self([Complex::zero(); 4])
    }
}

impl<F: Float> From<[Complex<F>; 4]> for Jones<F> {
    fn from(j: [Complex<F>; 4]) -> Self {
        Self(j)
    }
}

impl<F: Float> From<[F; 8]> for Jones<F> {
    fn from(j: [F; 8]) -> Self {
        Self([
            Complex::new(j[0], j[1]),
            Complex::new(j[2], j[3]),
            Complex::new(j[4], j[5]),
            Complex::new(j[6], j[7]),
        ])
    }
}

impl<F: Float> Deref for Jones<F> {
    type Target = [Complex<F>; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<F: Float> DerefMut for Jones<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jones_from_floats() {
        let j = Jones::from([1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(j[0], c32::new(1.0, 2.0));
        assert_eq!(j[3], c32::new(7.0, 8.0));
        assert!(!j.any_nan());
    }

    #[test]
    fn test_jones_diagonal() {
        let j = Jones::diagonal(c64::new(3.0, 4.0));
        assert_eq!(
            *j,
            [
                c64::new(3.0, 4.0),
                c64::new(0.0, 0.0),
                c64::new(0.0, 0.0),
                c64::new(3.0, 4.0)
            ]
        );
    }
}
