// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print what a measurement set holds.

use std::path::PathBuf;

use clap::Parser;
use hifitime::Epoch;
use log::info;

use crate::{constants::SECONDS_PER_DAY, MeasurementSet, VistableError};

#[derive(Parser, Debug)]
pub(super) struct InfoArgs {
    /// Path to the measurement set.
    #[clap(name = "MEASUREMENT_SET", parse(from_os_str))]
    ms: PathBuf,
}

impl InfoArgs {
    pub(super) fn run(self) -> Result<(), VistableError> {
        let ms = MeasurementSet::open(&self.ms)?;

        info!("Measurement set:   {}", ms.path().display());
        info!("Written by:        {}", ms.app_name());
        info!("Stations:          {}", ms.num_stations());
        info!("Channels:          {}", ms.num_channels());
        info!("Polarisations:     {}", ms.num_pols());
        info!(
            "Correlations:      autos: {}, crosses: {} ({} rows per time sample)",
            ms.write_autocorr(),
            ms.write_crosscorr(),
            ms.num_output_baselines()
        );
        info!("Rows:              {}", ms.num_rows());
        info!(
            "Frequencies:       {} MHz, channels {} kHz wide",
            ms.ref_freq_hz() / 1e6,
            ms.channel_width_hz() / 1e3
        );
        info!(
            "Phase centre:      RA {:.6}°, Dec {:.6}°",
            ms.phase_centre_ra_rad().to_degrees(),
            ms.phase_centre_dec_rad().to_degrees()
        );

        let [start, end] = ms.time_range();
        if end > 0.0 {
            let start_epoch = Epoch::from_mjd_utc(start / SECONDS_PER_DAY);
            let end_epoch = Epoch::from_mjd_utc(end / SECONDS_PER_DAY);
            info!(
                "Time range (MJD):  {:.8} to {:.8}",
                ms.start_time_mjd(),
                ms.end_time_mjd()
            );
            info!("                   {start_epoch} to {end_epoch}");
            info!("Time resolution:   {} s", ms.time_inc_sec());
        } else {
            info!("Time range:        <nothing written>");
        }

        Ok(())
    }
}
