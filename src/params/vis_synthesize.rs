// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthesise visibilities of a point source and write them to a measurement
//! set, block by block.

use std::{f64::consts::TAU, path::PathBuf};

use log::{debug, info, trace};
use num_complex::Complex;
use num_traits::Zero;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::ParamsError;
use crate::{
    constants::SECONDS_PER_DAY,
    io::write::write_vis_block,
    math::cross_baseline_stations,
    ms::{MeasurementSet, MsCreateParams},
    vis_block::{add_system_noise, VisBlock, VisBlockDims, VisFloat, Visibility},
    Jones,
};

/// The floating-point precision of the visibilities in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize)]
pub enum Precision {
    #[strum(serialize = "single")]
    #[serde(rename = "single")]
    Single,

    #[strum(serialize = "double")]
    #[serde(rename = "double")]
    Double,
}

/// Parameters needed to synthesise visibilities.
#[derive(Debug, Clone)]
pub struct SynthesisParams {
    /// Where the measurement set is written.
    pub output: PathBuf,

    /// How the measurement set is laid out.
    pub ms: MsCreateParams,

    pub precision: Precision,

    /// Simulate all four polarisations, rather than Stokes I alone.
    pub full_pol: bool,

    pub num_times: usize,

    /// The maximum number of time samples per block.
    pub block_times: usize,

    pub time_start_mjd_utc: f64,

    /// \[seconds\]
    pub time_inc_sec: f64,

    /// \[seconds\]
    pub time_average_sec: f64,

    /// Stations are placed evenly around a ring of this radius \[metres\].
    pub ring_radius_m: f64,

    /// The Stokes I flux density of the point source at the phase centre
    /// \[Jy\].
    pub flux_density_jy: f64,

    /// The standard deviation of the system noise \[Jy\]. Zero adds no noise.
    pub noise_rms_jy: f64,

    /// Each block's noise comes from a generator seeded with this plus the
    /// block index.
    pub seed: u64,

    pub add_model: bool,
    pub add_corrected: bool,

    /// Recorded in the HISTORY table.
    pub settings: String,
}

impl SynthesisParams {
    /// Station positions \[metres\] on a ring in the x-y plane.
    pub fn station_positions(&self) -> Vec<[f64; 3]> {
        let n = self.ms.num_stations;
        (0..n)
            .map(|i| {
                let angle = TAU * i as f64 / n as f64;
                [
                    self.ring_radius_m * angle.cos(),
                    self.ring_radius_m * angle.sin(),
                    0.0,
                ]
            })
            .collect()
    }

    /// The (start, length) of each block of time samples.
    pub fn blocks(&self) -> Vec<(usize, usize)> {
        let block_times = self.block_times.max(1);
        (0..self.num_times)
            .step_by(block_times)
            .map(|start| (start, block_times.min(self.num_times - start)))
            .collect()
    }

    /// Generate one block of visibilities. The geometry doesn't rotate with
    /// time, so every time sample shares the same uvw coordinates.
    pub fn make_block<T: Visibility>(
        &self,
        block_index: usize,
        start: usize,
        num_times: usize,
    ) -> Result<VisBlock<T>, ParamsError> {
        let dims = VisBlockDims {
            num_times,
            num_channels: self.ms.num_channels,
            num_stations: self.ms.num_stations,
        };
        let mut block = VisBlock::new(dims);

        let flux = Complex::new(T::Float::from_f64(self.flux_density_jy), T::Float::zero());
        block.cross_tfb_mut().fill(T::from_stokes_i(flux));
        block.autos_tfs_mut().fill(T::from_stokes_i(flux));

        let positions = self.station_positions();
        let (station1, station2) = cross_baseline_stations(self.ms.num_stations);
        {
            let (mut uu, mut vv, mut ww) = block.uvw_tb_mut();
            for (b, (&s1, &s2)) in station1.iter().zip(station2.iter()).enumerate() {
                let (p1, p2) = (positions[s1], positions[s2]);
                uu.column_mut(b).fill(T::Float::from_f64(p2[0] - p1[0]));
                vv.column_mut(b).fill(T::Float::from_f64(p2[1] - p1[1]));
                ww.column_mut(b).fill(T::Float::from_f64(p2[2] - p1[2]));
            }
        }

        let start_mjd =
            self.time_start_mjd_utc + start as f64 * self.time_inc_sec / SECONDS_PER_DAY;
        let start_sec = start_mjd * SECONDS_PER_DAY;
        block.set_time_start_mjd_utc(start_mjd);
        block.set_time_inc_sec(self.time_inc_sec);
        block.set_time_average_sec(self.time_average_sec);
        block.set_time_range_mjd_utc_sec([
            start_sec,
            start_sec + num_times as f64 * self.time_inc_sec,
        ]);
        let half_width = self.ms.chan_width_hz / 2.0;
        block.set_freq_range_hz([
            self.ms.ref_freq_hz - half_width,
            self.ms.ref_freq_hz + (self.ms.num_channels as f64 - 0.5) * self.ms.chan_width_hz,
        ]);

        if self.noise_rms_jy > 0.0 {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(block_index as u64));
            add_system_noise(&mut block, self.noise_rms_jy, &mut rng)?;
        }
        Ok(block)
    }

    fn write_blocks<T: Visibility>(&self, ms: &mut MeasurementSet) -> Result<(), ParamsError> {
        let blocks = self.blocks();
        let num_blocks = blocks.len();
        for (block_index, (start, num_times)) in blocks.into_iter().enumerate() {
            debug!("Block {}/{num_blocks}: {num_times} time samples from {start}", block_index + 1);
            let block: VisBlock<T> = self.make_block(block_index, start, num_times)?;
            write_vis_block(&block, ms)?;
        }
        Ok(())
    }

    pub fn run(&self) -> Result<(), ParamsError> {
        info!("Creating {}", self.output.display());
        let mut ms = MeasurementSet::create(&self.output, &self.ms)?;

        let positions = self.station_positions();
        let (x, (y, z)): (Vec<f64>, (Vec<f64>, Vec<f64>)) =
            positions.iter().map(|p| (p[0], (p[1], p[2]))).unzip();
        ms.set_station_coords(&x, &y, &z)?;

        match (self.precision, self.full_pol) {
            (Precision::Single, false) => self.write_blocks::<Complex<f32>>(&mut ms)?,
            (Precision::Double, false) => self.write_blocks::<Complex<f64>>(&mut ms)?,
            (Precision::Single, true) => self.write_blocks::<Jones<f32>>(&mut ms)?,
            (Precision::Double, true) => self.write_blocks::<Jones<f64>>(&mut ms)?,
        }
        info!(
            "Wrote {} rows ({} per time sample)",
            ms.num_rows(),
            ms.num_output_baselines()
        );

        if self.add_model || self.add_corrected {
            ms.add_scratch_columns(self.add_model, self.add_corrected)?;
            if self.add_model {
                trace!("Copying DATA into MODEL_DATA");
                ms.copy_column("DATA", "MODEL_DATA")?;
            }
            if self.add_corrected {
                trace!("Copying DATA into CORRECTED_DATA");
                ms.copy_column("DATA", "CORRECTED_DATA")?;
            }
        }

        let app_name = ms.app_name().to_string();
        ms.append_history(&app_name, &self.settings)?;
        ms.close()?;
        Ok(())
    }
}
