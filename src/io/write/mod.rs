// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Write visibility blocks into measurement sets.
//!
//! A block's (time, channel, baseline) visibilities become main-table rows in
//! (time, baseline) order with (channel, polarisation) cells. For each station
//! in turn, its autocorrelation row (if the measurement set stores them) is
//! followed by its cross-correlations with every later station.

mod error;

pub use error::VisWriteError;

use log::{debug, trace, warn};

use crate::{
    c32,
    constants::SECONDS_PER_DAY,
    math::{output_baselines, OutputBaseline, RowSource},
    ms::{MeasurementSet, TimeMeta, TimeRows},
    vis_block::{VisBlock, VisFloat, Visibility},
};

/// One time sample's rows, ready to be written.
struct TimeSlab {
    uu: Vec<f64>,
    vv: Vec<f64>,
    ww: Vec<f64>,
    antenna1: Vec<i32>,
    antenna2: Vec<i32>,
    vis: Vec<c32>,
}

impl TimeSlab {
    fn new(layout: &[OutputBaseline], num_channels: usize, num_pols: usize) -> TimeSlab {
        let n = layout.len();
        TimeSlab {
            uu: vec![0.0; n],
            vv: vec![0.0; n],
            ww: vec![0.0; n],
            antenna1: layout.iter().map(|b| b.station1 as i32).collect(),
            antenna2: layout.iter().map(|b| b.station2 as i32).collect(),
            vis: vec![c32::default(); n * num_channels * num_pols],
        }
    }

    fn rows(&self) -> TimeRows {
        TimeRows {
            uu: &self.uu,
            vv: &self.vv,
            ww: &self.ww,
            antenna1: &self.antenna1,
            antenna2: &self.antenna2,
        }
    }
}

/// Write the polarisations of `vis` into `out`. One polarisation going into
/// four becomes XX and YY, with zero cross-hands.
fn expand_pols<T: Visibility>(vis: &T, out: &mut [c32]) {
    let pols = vis.pols();
    let conv = |c: &num_complex::Complex<T::Float>| c32::new(c.re.as_f32(), c.im.as_f32());
    match (pols.len(), out.len()) {
        (1, 4) => {
            let s = conv(&pols[0]);
            out[0] = s;
            out[1] = c32::default();
            out[2] = c32::default();
            out[3] = s;
        }
        _ => out
            .iter_mut()
            .zip(pols.iter())
            .for_each(|(o, p)| *o = conv(p)),
    }
}

/// Fill `slab` with time sample `t` of `block`. Channels beyond the block's
/// are left at zero.
fn fill_slab<T: Visibility>(
    block: &VisBlock<T>,
    t: usize,
    layout: &[OutputBaseline],
    slab: &mut TimeSlab,
    num_channels_out: usize,
    num_pols_out: usize,
) {
    let cross = block.cross_tfb();
    let autos = block.autos_tfs();
    let (uu, vv, ww) = (block.uu_tb(), block.vv_tb(), block.ww_tb());
    let row_len = num_channels_out * num_pols_out;

    for (i_out, (baseline, vis_row)) in layout
        .iter()
        .zip(slab.vis.chunks_exact_mut(row_len))
        .enumerate()
    {
        match baseline.source {
            RowSource::Auto(s) => {
                slab.uu[i_out] = 0.0;
                slab.vv[i_out] = 0.0;
                slab.ww[i_out] = 0.0;
                for (c, out) in vis_row
                    .chunks_exact_mut(num_pols_out)
                    .take(block.num_channels())
                    .enumerate()
                {
                    expand_pols(&autos[(t, c, s)], out);
                }
            }
            RowSource::Cross(b) => {
                slab.uu[i_out] = uu[(t, b)].as_f64();
                slab.vv[i_out] = vv[(t, b)].as_f64();
                slab.ww[i_out] = ww[(t, b)].as_f64();
                for (c, out) in vis_row
                    .chunks_exact_mut(num_pols_out)
                    .take(block.num_channels())
                    .enumerate()
                {
                    expand_pols(&cross[(t, c, b)], out);
                }
            }
        }
    }
}

/// Append a block of visibilities to a measurement set. Exactly
/// `num_times * num_output_baselines` rows are added.
///
/// Everything is checked before the table grows. The rows are added before
/// being written; if writing fails part way, the remaining new rows are left
/// zero-valued.
pub fn write_vis_block<T: Visibility>(
    block: &VisBlock<T>,
    ms: &mut MeasurementSet,
) -> Result<(), VisWriteError> {
    let num_pols_in = T::NUM_POLS;
    let num_pols_out = ms.num_pols();
    if num_pols_in > num_pols_out {
        return Err(VisWriteError::DimensionMismatch {
            what: "polarisations",
            expected: num_pols_out,
            got: num_pols_in,
        });
    }
    if !matches!(num_pols_out, 1 | 4) {
        return Err(VisWriteError::BadDataType {
            num_pols_in,
            num_pols_out,
        });
    }
    if block.num_stations() != ms.num_stations() {
        return Err(VisWriteError::DimensionMismatch {
            what: "stations",
            expected: ms.num_stations(),
            got: block.num_stations(),
        });
    }
    if block.num_channels() > ms.num_channels() {
        return Err(VisWriteError::DimensionMismatch {
            what: "channels",
            expected: ms.num_channels(),
            got: block.num_channels(),
        });
    }
    let layout = output_baselines(block.num_stations(), ms.write_autocorr(), ms.write_crosscorr());
    let num_baselines_out = layout.len() as u64;
    let num_times = block.num_times();
    if block.any_nan() {
        warn!("The visibility block contains NaNs");
    }

    let start_row = ms.num_rows();
    debug!(
        "Writing {num_times} times x {num_baselines_out} baselines from row {start_row}"
    );
    ms.set_num_rows(start_row + num_times as u64 * num_baselines_out)?;

    let dt_dump = block.time_inc_sec();
    let t_start_sec = block.time_start_mjd_utc() * SECONDS_PER_DAY;
    let mut slab = TimeSlab::new(&layout, ms.num_channels(), num_pols_out);
    for t in 0..num_times {
        fill_slab(block, t, &layout, &mut slab, ms.num_channels(), num_pols_out);
        let meta = TimeMeta {
            time: t_start_sec + t as f64 * dt_dump,
            exposure: block.time_average_sec(),
            interval: dt_dump,
        };
        trace!("Writing time {t} ({} MJD s)", meta.time);
        ms.write_all_for_time(
            start_row + t as u64 * num_baselines_out,
            &slab.rows(),
            &slab.vis,
            meta,
        )?;
    }
    ms.flush()?;
    Ok(())
}
