// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rows of the sub-tables written when a measurement set is created.

use log::trace;

use super::MsError;
use crate::{
    c32,
    constants::*,
    table::{Table, TableExt},
};

/// The correlation types for a number of polarisations.
pub(crate) fn corr_types(num_pols: usize) -> Result<Vec<i32>, MsError> {
    match num_pols {
        1 => Ok(vec![CORR_TYPE_XX]),
        2 => Ok(vec![CORR_TYPE_XX, CORR_TYPE_YY]),
        4 => Ok(vec![CORR_TYPE_XX, CORR_TYPE_XY, CORR_TYPE_YX, CORR_TYPE_YY]),
        n => Err(MsError::InvalidArgument(format!(
            "{n} polarisations are not supported; use 1, 2 or 4"
        ))),
    }
}

/// The pair of receptors (0 = X, 1 = Y) correlated by a correlation type.
fn receptors(corr_type: i32) -> [i32; 2] {
    match corr_type {
        CORR_TYPE_XY => [0, 1],
        CORR_TYPE_YX => [1, 0],
        CORR_TYPE_YY => [1, 1],
        _ => [0, 0],
    }
}

pub(crate) fn add_observation(
    observation: &mut dyn Table,
    telescope_name: &str,
    observer: &str,
) -> Result<(), MsError> {
    let row = observation.num_rows();
    observation.add_rows(1)?;
    observation.put_vec("SCHEDULE", row, vec![String::new()])?;
    observation.put_vec("LOG", row, Vec::<String>::new())?;
    observation.put_scalar("PROJECT", row, String::new())?;
    observation.put_scalar("OBSERVER", row, observer.to_string())?;
    observation.put_scalar("TELESCOPE_NAME", row, telescope_name.to_string())?;
    observation.put_vec("TIME_RANGE", row, vec![0.0, 0.0])?;
    Ok(())
}

pub(crate) fn add_pol(polarization: &mut dyn Table, num_pols: usize) -> Result<(), MsError> {
    let corr_type = corr_types(num_pols)?;
    let corr_product: Vec<i32> = corr_type.iter().flat_map(|&c| receptors(c)).collect();
    let row = polarization.num_rows();
    polarization.add_rows(1)?;
    polarization.put_vec("CORR_TYPE", row, corr_type)?;
    polarization.put_array("CORR_PRODUCT", row, &[2, num_pols], corr_product)?;
    polarization.put_scalar("NUM_CORR", row, num_pols as i32)?;
    Ok(())
}

pub(crate) fn add_field(field: &mut dyn Table, ra_rad: f64, dec_rad: f64) -> Result<(), MsError> {
    let row = field.num_rows();
    field.add_rows(1)?;
    for col in ["DELAY_DIR", "PHASE_DIR", "REFERENCE_DIR"] {
        field.put_array(col, row, &[2, 1], vec![ra_rad, dec_rad])?;
    }
    Ok(())
}

/// Add a spectral window and the data description linking it to the
/// polarisation `pol_id`.
pub(crate) fn add_band(
    data_description: &mut dyn Table,
    spectral_window: &mut dyn Table,
    pol_id: i32,
    ref_freq_hz: f64,
    chan_freqs_hz: &[f64],
    chan_widths_hz: &[f64],
) -> Result<(), MsError> {
    let row = data_description.num_rows();
    data_description.add_rows(1)?;
    data_description.put_scalar("SPECTRAL_WINDOW_ID", row, row as i32)?;
    data_description.put_scalar("POLARIZATION_ID", row, pol_id)?;
    data_description.put_scalar("FLAG_ROW", row, false)?;

    let min_start = chan_freqs_hz
        .iter()
        .zip(chan_widths_hz)
        .map(|(f, w)| f - w / 2.0)
        .fold(f64::INFINITY, f64::min);
    let max_end = chan_freqs_hz
        .iter()
        .zip(chan_widths_hz)
        .map(|(f, w)| f + w / 2.0)
        .fold(f64::NEG_INFINITY, f64::max);
    let total_bandwidth = if chan_freqs_hz.is_empty() {
        0.0
    } else {
        max_end - min_start
    };
    trace!("Adding spectral window {row} with total bandwidth {total_bandwidth} Hz");

    let spw = spectral_window.num_rows();
    spectral_window.add_rows(1)?;
    spectral_window.put_scalar("MEAS_FREQ_REF", spw, MEAS_FREQ_REF_TOPO)?;
    spectral_window.put_vec("CHAN_FREQ", spw, chan_freqs_hz.to_vec())?;
    spectral_window.put_scalar("REF_FREQUENCY", spw, ref_freq_hz)?;
    for col in ["CHAN_WIDTH", "EFFECTIVE_BW", "RESOLUTION"] {
        spectral_window.put_vec(col, spw, chan_widths_hz.to_vec())?;
    }
    spectral_window.put_scalar("FLAG_ROW", spw, false)?;
    spectral_window.put_scalar("FREQ_GROUP", spw, 0)?;
    spectral_window.put_scalar("FREQ_GROUP_NAME", spw, String::new())?;
    spectral_window.put_scalar("IF_CONV_CHAIN", spw, 0)?;
    spectral_window.put_scalar("NAME", spw, String::new())?;
    spectral_window.put_scalar("NET_SIDEBAND", spw, 0)?;
    spectral_window.put_scalar("NUM_CHAN", spw, chan_freqs_hz.len() as i32)?;
    spectral_window.put_scalar("TOTAL_BANDWIDTH", spw, total_bandwidth)?;
    Ok(())
}

pub(crate) struct HistoryEntry<'a> {
    pub(crate) message: &'a str,
    pub(crate) application: &'a str,
    pub(crate) origin: &'a str,
    /// \[MJD seconds (UTC)\]
    pub(crate) time: f64,
    pub(crate) app_params: Vec<String>,
}

pub(crate) fn add_history(history: &mut dyn Table, entry: HistoryEntry) -> Result<(), MsError> {
    let row = history.num_rows();
    history.add_rows(1)?;
    history.put_scalar("MESSAGE", row, entry.message.to_string())?;
    history.put_scalar("APPLICATION", row, entry.application.to_string())?;
    history.put_scalar("PRIORITY", row, "INFO".to_string())?;
    history.put_scalar("ORIGIN", row, entry.origin.to_string())?;
    history.put_scalar("TIME", row, entry.time)?;
    history.put_scalar("OBSERVATION_ID", row, -1)?;
    history.put_vec("APP_PARAMS", row, entry.app_params)?;
    history.put_vec("CLI_COMMAND", row, Vec::<String>::new())?;
    Ok(())
}

/// Fill one FEED row per station, each with an "X" and a "Y" receptor.
pub(crate) fn set_antenna_feeds(feed: &mut dyn Table, num_stations: usize) -> Result<(), MsError> {
    let n = NUM_RECEPTORS;
    for a in 0..num_stations {
        let row = a as u64;
        feed.put_scalar("ANTENNA_ID", row, a as i32)?;
        feed.put_array("BEAM_OFFSET", row, &[2, n], vec![0.0; 2 * n])?;
        feed.put_vec(
            "POLARIZATION_TYPE",
            row,
            vec!["X".to_string(), "Y".to_string()],
        )?;
        feed.put_array("POL_RESPONSE", row, &[n, n], vec![c32::default(); n * n])?;
        feed.put_vec("RECEPTOR_ANGLE", row, vec![0.0; n])?;
        feed.put_scalar("NUM_RECEPTORS", row, n as i32)?;
    }
    Ok(())
}
