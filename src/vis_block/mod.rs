// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! In-memory blocks of visibilities.
//!
//! A [`VisBlock`] holds a contiguous chunk of times and channels. Its element
//! type fixes both the precision and the number of polarisations for the whole
//! block.

mod error;
mod noise;
#[cfg(test)]
mod tests;

pub use error::VisBlockError;
pub use noise::add_system_noise;

use std::fmt::Debug;

use ndarray::prelude::*;
use num_complex::Complex;
use num_traits::Float;

use crate::{
    math::{cross_baseline_stations, num_cross_baselines},
    Jones,
};

mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl<F: super::VisFloat> Sealed for num_complex::Complex<F> {}
    impl<F: super::VisFloat> Sealed for crate::Jones<F> {}
}

/// Single or double precision.
pub trait VisFloat: Float + Debug + Default + Send + Sync + private::Sealed + 'static {
    fn from_f64(v: f64) -> Self;

    fn as_f32(self) -> f32;

    fn as_f64(self) -> f64;
}

impl VisFloat for f32 {
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn as_f32(self) -> f32 {
        self
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl VisFloat for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }

    fn as_f32(self) -> f32 {
        self as f32
    }

    fn as_f64(self) -> f64 {
        self
    }
}

/// A visibility element: a complex scalar (one polarisation) or a Jones
/// matrix (four polarisations, XX XY YX YY).
pub trait Visibility: Copy + Default + Debug + Send + Sync + private::Sealed + 'static {
    type Float: VisFloat;

    const NUM_POLS: usize;

    /// The polarisation samples of this element.
    fn pols(&self) -> &[Complex<Self::Float>];

    fn pols_mut(&mut self) -> &mut [Complex<Self::Float>];

    /// An element representing an unpolarised source with this Stokes I.
    fn from_stokes_i(i: Complex<Self::Float>) -> Self;
}

impl<F: VisFloat> Visibility for Complex<F> {
    type Float = F;

    const NUM_POLS: usize = 1;

    fn pols(&self) -> &[Complex<F>] {
        std::slice::from_ref(self)
    }

    fn pols_mut(&mut self) -> &mut [Complex<F>] {
        std::slice::from_mut(self)
    }

    fn from_stokes_i(i: Complex<F>) -> Self {
        i
    }
}

impl<F: VisFloat> Visibility for Jones<F> {
    type Float = F;

    const NUM_POLS: usize = 4;

    fn pols(&self) -> &[Complex<F>] {
        &self[..]
    }

    fn pols_mut(&mut self) -> &mut [Complex<F>] {
        &mut self[..]
    }

    fn from_stokes_i(i: Complex<F>) -> Self {
        Jones::diagonal(i)
    }
}

/// The dimensions of a [`VisBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisBlockDims {
    pub num_times: usize,
    pub num_channels: usize,
    pub num_stations: usize,
}

impl VisBlockDims {
    pub fn num_baselines(&self) -> usize {
        num_cross_baselines(self.num_stations)
    }
}

/// A chunk of visibilities with their baseline coordinates.
#[derive(Debug, Clone)]
pub struct VisBlock<T: Visibility> {
    dims: VisBlockDims,

    /// Cross-correlations. The first dimension is time, the second is channel
    /// and the third is baseline.
    cross_tfb: Array3<T>,

    /// Autocorrelations. The first dimension is time, the second is channel
    /// and the third is station.
    autos_tfs: Array3<T>,

    /// Baseline coordinates \[metres\]. The first dimension is time, the second
    /// is baseline.
    uu_tb: Array2<T::Float>,
    vv_tb: Array2<T::Float>,
    ww_tb: Array2<T::Float>,

    baseline_station1: Vec<usize>,
    baseline_station2: Vec<usize>,

    freq_range_hz: [f64; 2],
    time_range_mjd_utc_sec: [f64; 2],
    time_start_mjd_utc: f64,
    time_inc_sec: f64,
    time_average_sec: f64,
}

impl<T: Visibility> VisBlock<T> {
    /// A zero-filled block.
    pub fn new(dims: VisBlockDims) -> VisBlock<T> {
        let nb = dims.num_baselines();
        let (baseline_station1, baseline_station2) = cross_baseline_stations(dims.num_stations);
        VisBlock {
            dims,
            cross_tfb: Array3::default((dims.num_times, dims.num_channels, nb)),
            autos_tfs: Array3::default((dims.num_times, dims.num_channels, dims.num_stations)),
            uu_tb: Array2::zeros((dims.num_times, nb)),
            vv_tb: Array2::zeros((dims.num_times, nb)),
            ww_tb: Array2::zeros((dims.num_times, nb)),
            baseline_station1,
            baseline_station2,
            freq_range_hz: [0.0; 2],
            time_range_mjd_utc_sec: [0.0; 2],
            time_start_mjd_utc: 0.0,
            time_inc_sec: 0.0,
            time_average_sec: 0.0,
        }
    }

    /// Build a block from flat buffers. `cross` is baseline-fastest, then
    /// channel, then time; `autos` is station-fastest, then channel, then
    /// time; the coordinates are baseline-fastest, then time. An empty
    /// `autos` is treated as all zeros.
    pub fn from_parts(
        dims: VisBlockDims,
        cross: Vec<T>,
        autos: Vec<T>,
        uu: Vec<T::Float>,
        vv: Vec<T::Float>,
        ww: Vec<T::Float>,
    ) -> Result<VisBlock<T>, VisBlockError> {
        let nb = dims.num_baselines();
        let check = |what: &'static str, expected: usize, got: usize| {
            if expected == got {
                Ok(())
            } else {
                Err(VisBlockError::InvalidArgument {
                    what,
                    expected,
                    got,
                })
            }
        };
        let num_cross = dims.num_times * dims.num_channels * nb;
        let num_autos = dims.num_times * dims.num_channels * dims.num_stations;
        check("cross-correlation buffer", num_cross, cross.len())?;
        if !autos.is_empty() {
            check("autocorrelation buffer", num_autos, autos.len())?;
        }
        for (what, buf) in [("uu buffer", &uu), ("vv buffer", &vv), ("ww buffer", &ww)] {
            check(what, dims.num_times * nb, buf.len())?;
        }

        let mut block = VisBlock::new(dims);
        block.cross_tfb =
            Array3::from_shape_vec((dims.num_times, dims.num_channels, nb), cross)?;
        if !autos.is_empty() {
            block.autos_tfs = Array3::from_shape_vec(
                (dims.num_times, dims.num_channels, dims.num_stations),
                autos,
            )?;
        }
        block.uu_tb = Array2::from_shape_vec((dims.num_times, nb), uu)?;
        block.vv_tb = Array2::from_shape_vec((dims.num_times, nb), vv)?;
        block.ww_tb = Array2::from_shape_vec((dims.num_times, nb), ww)?;
        Ok(block)
    }

    pub fn dims(&self) -> VisBlockDims {
        self.dims
    }

    pub fn num_times(&self) -> usize {
        self.dims.num_times
    }

    pub fn num_channels(&self) -> usize {
        self.dims.num_channels
    }

    pub fn num_stations(&self) -> usize {
        self.dims.num_stations
    }

    pub fn num_baselines(&self) -> usize {
        self.dims.num_baselines()
    }

    pub fn num_pols(&self) -> usize {
        T::NUM_POLS
    }

    pub fn cross_tfb(&self) -> ArrayView3<T> {
        self.cross_tfb.view()
    }

    pub fn cross_tfb_mut(&mut self) -> ArrayViewMut3<T> {
        self.cross_tfb.view_mut()
    }

    pub fn autos_tfs(&self) -> ArrayView3<T> {
        self.autos_tfs.view()
    }

    pub fn autos_tfs_mut(&mut self) -> ArrayViewMut3<T> {
        self.autos_tfs.view_mut()
    }

    pub fn uu_tb(&self) -> ArrayView2<T::Float> {
        self.uu_tb.view()
    }

    pub fn vv_tb(&self) -> ArrayView2<T::Float> {
        self.vv_tb.view()
    }

    pub fn ww_tb(&self) -> ArrayView2<T::Float> {
        self.ww_tb.view()
    }

    /// Mutable views of the u, v and w coordinates.
    pub fn uvw_tb_mut(
        &mut self,
    ) -> (
        ArrayViewMut2<T::Float>,
        ArrayViewMut2<T::Float>,
        ArrayViewMut2<T::Float>,
    ) {
        (
            self.uu_tb.view_mut(),
            self.vv_tb.view_mut(),
            self.ww_tb.view_mut(),
        )
    }

    /// The first station of each baseline.
    pub fn baseline_station1(&self) -> &[usize] {
        &self.baseline_station1
    }

    /// The second station of each baseline.
    pub fn baseline_station2(&self) -> &[usize] {
        &self.baseline_station2
    }

    pub fn freq_range_hz(&self) -> [f64; 2] {
        self.freq_range_hz
    }

    pub fn set_freq_range_hz(&mut self, range: [f64; 2]) {
        self.freq_range_hz = range;
    }

    pub fn time_range_mjd_utc_sec(&self) -> [f64; 2] {
        self.time_range_mjd_utc_sec
    }

    pub fn set_time_range_mjd_utc_sec(&mut self, range: [f64; 2]) {
        self.time_range_mjd_utc_sec = range;
    }

    /// The time of the first sample \[MJD (UTC) days\].
    pub fn time_start_mjd_utc(&self) -> f64 {
        self.time_start_mjd_utc
    }

    pub fn set_time_start_mjd_utc(&mut self, mjd: f64) {
        self.time_start_mjd_utc = mjd;
    }

    /// The interval between dumps \[seconds\].
    pub fn time_inc_sec(&self) -> f64 {
        self.time_inc_sec
    }

    pub fn set_time_inc_sec(&mut self, seconds: f64) {
        self.time_inc_sec = seconds;
    }

    /// The exposure of each dump \[seconds\].
    pub fn time_average_sec(&self) -> f64 {
        self.time_average_sec
    }

    pub fn set_time_average_sec(&mut self, seconds: f64) {
        self.time_average_sec = seconds;
    }

    /// Set every visibility (cross and auto) to zero.
    pub fn clear(&mut self) {
        self.cross_tfb.fill(T::default());
        self.autos_tfs.fill(T::default());
    }

    pub(crate) fn any_nan(&self) -> bool {
        let nan = |v: &T| v.pols().iter().any(|c| c.re.is_nan() || c.im.is_nan());
        self.cross_tfb.iter().any(nan) || self.autos_tfs.iter().any(nan)
    }
}
