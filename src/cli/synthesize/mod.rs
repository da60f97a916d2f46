// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthesise the visibilities of a point source and write them to a new
//! measurement set.

#[cfg(test)]
mod tests;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::common::ARG_FILE_HELP;
use crate::{
    params::{resolve_seed, ParamsError, Precision, SynthesisParams},
    MsCreateParams, VistableError,
};

const DEFAULT_OUTPUT: &str = "synthesized.ms";
const DEFAULT_NUM_STATIONS: usize = 8;
const DEFAULT_NUM_CHANNELS: usize = 16;
const DEFAULT_NUM_TIMES: usize = 10;
const DEFAULT_BLOCK_TIMES: usize = 4;
const DEFAULT_REF_FREQ_MHZ: f64 = 150.0;
const DEFAULT_CHAN_WIDTH_KHZ: f64 = 40.0;
const DEFAULT_TIME_RES_SECONDS: f64 = 8.0;
const DEFAULT_START_MJD: f64 = 60000.0;
const DEFAULT_RA_DEG: f64 = 0.0;
const DEFAULT_DEC_DEG: f64 = -27.0;
const DEFAULT_NUM_POLS: usize = 4;
const DEFAULT_RING_RADIUS_M: f64 = 500.0;
const DEFAULT_FLUX_JY: f64 = 1.0;
const DEFAULT_NOISE_RMS_JY: f64 = 0.0;

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("Path to the output measurement set. Default: {DEFAULT_OUTPUT}");

    static ref NUM_STATIONS_HELP: String =
        format!("The number of stations. Default: {DEFAULT_NUM_STATIONS}");

    static ref NUM_CHANNELS_HELP: String =
        format!("The number of frequency channels. Default: {DEFAULT_NUM_CHANNELS}");

    static ref NUM_TIMES_HELP: String =
        format!("The number of time samples. Default: {DEFAULT_NUM_TIMES}");

    static ref BLOCK_TIMES_HELP: String =
        format!("The maximum number of time samples synthesised and written at once. Default: {DEFAULT_BLOCK_TIMES}");

    static ref REF_FREQ_HELP: String =
        format!("The frequency of the first channel [MHz]. Default: {DEFAULT_REF_FREQ_MHZ}");

    static ref CHAN_WIDTH_HELP: String =
        format!("The channel width [kHz]. Default: {DEFAULT_CHAN_WIDTH_KHZ}");

    static ref TIME_RES_HELP: String =
        format!("The time between samples [seconds]. Default: {DEFAULT_TIME_RES_SECONDS}");

    static ref START_MJD_HELP: String =
        format!("The time of the first sample [MJD (UTC) days]. Default: {DEFAULT_START_MJD}");

    static ref RA_HELP: String =
        format!("The phase centre right ascension [degrees]. Default: {DEFAULT_RA_DEG}");

    static ref DEC_HELP: String =
        format!("The phase centre declination [degrees]. Default: {DEFAULT_DEC_DEG}");

    static ref NUM_POLS_HELP: String =
        format!("The number of polarisations stored per visibility; 1 or 4. Default: {DEFAULT_NUM_POLS}");

    static ref PRECISION_HELP: String =
        format!("The precision of the visibilities in memory. Supported: {}. Default: {}", Precision::iter().join(", "), Precision::Single);

    static ref RING_RADIUS_HELP: String =
        format!("Stations are placed evenly around a ring of this radius [metres]. Default: {DEFAULT_RING_RADIUS_M}");

    static ref FLUX_HELP: String =
        format!("The Stokes I flux density of the point source at the phase centre [Jy]. Default: {DEFAULT_FLUX_JY}");

    static ref NOISE_RMS_HELP: String =
        format!("The standard deviation of the Gaussian system noise added to cross-correlations [Jy]. Default: {DEFAULT_NOISE_RMS_JY}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct SynthesizeCliArgs {
    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// The name of the observer recorded in the OBSERVATION table.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) observer: Option<String>,

    /// Add a MODEL_DATA column, filled with a copy of DATA.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) model_data: bool,

    /// Add a CORRECTED_DATA column, filled with a copy of DATA.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) corrected_data: bool,

    #[clap(short = 'n', long, help = NUM_STATIONS_HELP.as_str(), help_heading = "ARRAY")]
    pub(super) num_stations: Option<usize>,

    #[clap(long, help = RING_RADIUS_HELP.as_str(), help_heading = "ARRAY")]
    pub(super) ring_radius: Option<f64>,

    #[clap(short = 'c', long, help = NUM_CHANNELS_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) num_channels: Option<usize>,

    #[clap(long, help = REF_FREQ_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) ref_freq: Option<f64>,

    #[clap(long, help = CHAN_WIDTH_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) chan_width: Option<f64>,

    #[clap(short = 't', long, help = NUM_TIMES_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) num_times: Option<usize>,

    #[clap(long, help = TIME_RES_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) time_res: Option<f64>,

    /// The integration time of each sample [seconds]. Default: the time
    /// resolution.
    #[clap(long, help_heading = "OBSERVATION PARAMETERS")]
    pub(super) time_average: Option<f64>,

    #[clap(long, help = START_MJD_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) start_mjd: Option<f64>,

    #[clap(short, long, help = RA_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) ra: Option<f64>,

    #[clap(short, long, allow_hyphen_values = true, help = DEC_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) dec: Option<f64>,

    #[clap(short = 'p', long, help = NUM_POLS_HELP.as_str(), help_heading = "CORRELATIONS")]
    pub(super) num_pols: Option<usize>,

    /// Simulate all four instrumental polarisations, rather than Stokes I
    /// alone. Requires four polarisations.
    #[clap(long, help_heading = "CORRELATIONS")]
    pub(super) full_pol: bool,

    /// Write auto-correlations.
    #[clap(long, help_heading = "CORRELATIONS")]
    pub(super) autos: bool,

    /// Don't write cross-correlations.
    #[clap(long, help_heading = "CORRELATIONS")]
    pub(super) no_cross: bool,

    #[clap(long, help = FLUX_HELP.as_str(), help_heading = "SKY")]
    pub(super) flux: Option<f64>,

    #[clap(long, help = NOISE_RMS_HELP.as_str(), help_heading = "SKY")]
    pub(super) noise_rms: Option<f64>,

    /// The seed of the system-noise generator. "time" uses the current time.
    #[clap(long, help_heading = "SKY")]
    pub(super) seed: Option<String>,

    #[clap(long, help = PRECISION_HELP.as_str(), help_heading = "PERFORMANCE")]
    pub(super) precision: Option<String>,

    #[clap(long, help = BLOCK_TIMES_HELP.as_str(), help_heading = "PERFORMANCE")]
    pub(super) block_times: Option<usize>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SynthesizeArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "synthesize")]
    #[serde(default)]
    pub(super) synth_args: SynthesizeCliArgs,
}

impl SynthesizeArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    pub(super) fn merge(self) -> Result<SynthesizeArgs, VistableError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let SynthesizeArgs {
                args_file: _,
                synth_args,
            } = unpack_arg_file!(arg_file);

            Ok(SynthesizeArgs {
                args_file: None,
                synth_args: cli_args.synth_args.merge(synth_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<SynthesisParams, SynthesizeArgsError> {
        debug!("{:#?}", self);

        // The settings are recorded as they were given, defaults omitted.
        let settings = toml::to_string(&self)?;

        let SynthesizeArgs {
            args_file: _,
            synth_args:
                SynthesizeCliArgs {
                    output,
                    observer,
                    model_data,
                    corrected_data,
                    num_stations,
                    ring_radius,
                    num_channels,
                    ref_freq,
                    chan_width,
                    num_times,
                    time_res,
                    time_average,
                    start_mjd,
                    ra,
                    dec,
                    num_pols,
                    full_pol,
                    autos,
                    no_cross,
                    flux,
                    noise_rms,
                    seed,
                    precision,
                    block_times,
                },
        } = self;

        let num_stations = num_stations.unwrap_or(DEFAULT_NUM_STATIONS);
        if num_stations == 0 {
            return Err(SynthesizeArgsError::ZeroStations);
        }
        let num_channels = num_channels.unwrap_or(DEFAULT_NUM_CHANNELS);
        if num_channels == 0 {
            return Err(SynthesizeArgsError::ZeroChannels);
        }
        let num_times = num_times.unwrap_or(DEFAULT_NUM_TIMES);
        if num_times == 0 {
            return Err(SynthesizeArgsError::ZeroTimes);
        }
        let block_times = block_times.unwrap_or(DEFAULT_BLOCK_TIMES);
        if block_times == 0 {
            return Err(SynthesizeArgsError::ZeroBlockTimes);
        }

        let num_pols = num_pols.unwrap_or(DEFAULT_NUM_POLS);
        if num_pols != 1 && num_pols != 4 {
            return Err(SynthesizeArgsError::BadNumPols(num_pols));
        }
        if full_pol && num_pols != 4 {
            return Err(SynthesizeArgsError::FullPolNeedsFourPols);
        }
        if no_cross && !autos {
            return Err(SynthesizeArgsError::NoCorrelations);
        }
        if !autos && num_stations < 2 {
            return Err(SynthesizeArgsError::TooFewStationsForCrosses);
        }

        let ref_freq_mhz = ref_freq.unwrap_or(DEFAULT_REF_FREQ_MHZ);
        if ref_freq_mhz <= 0.0 {
            return Err(SynthesizeArgsError::NotPositive {
                arg: "ref-freq",
                value: ref_freq_mhz,
            });
        }
        let chan_width_khz = chan_width.unwrap_or(DEFAULT_CHAN_WIDTH_KHZ);
        if chan_width_khz <= 0.0 {
            return Err(SynthesizeArgsError::NotPositive {
                arg: "chan-width",
                value: chan_width_khz,
            });
        }
        let time_res = time_res.unwrap_or(DEFAULT_TIME_RES_SECONDS);
        if time_res <= 0.0 {
            return Err(SynthesizeArgsError::NotPositive {
                arg: "time-res",
                value: time_res,
            });
        }
        let time_average = time_average.unwrap_or(time_res);
        if time_average <= 0.0 {
            return Err(SynthesizeArgsError::NotPositive {
                arg: "time-average",
                value: time_average,
            });
        }
        let ring_radius = ring_radius.unwrap_or(DEFAULT_RING_RADIUS_M);
        if ring_radius <= 0.0 {
            return Err(SynthesizeArgsError::NotPositive {
                arg: "ring-radius",
                value: ring_radius,
            });
        }
        let noise_rms = noise_rms.unwrap_or(DEFAULT_NOISE_RMS_JY);
        if noise_rms < 0.0 {
            return Err(SynthesizeArgsError::NegativeNoise(noise_rms));
        }

        let ra = ra.unwrap_or(DEFAULT_RA_DEG);
        let dec = dec.unwrap_or(DEFAULT_DEC_DEG);
        if !(-90.0..=90.0).contains(&dec) {
            return Err(SynthesizeArgsError::BadDec(dec));
        }

        let precision = match precision {
            None => Precision::Single,
            Some(p) => Precision::from_str(&p.to_lowercase())
                .map_err(|_| SynthesizeArgsError::BadPrecision(p))?,
        };
        let seed = resolve_seed(seed.as_deref())?;

        Ok(SynthesisParams {
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            ms: MsCreateParams {
                app_name: env!("CARGO_PKG_NAME").to_string(),
                observer: observer.unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string()),
                phase_centre_ra_rad: ra.to_radians(),
                phase_centre_dec_rad: dec.to_radians(),
                num_pols,
                num_channels,
                ref_freq_hz: ref_freq_mhz * 1e6,
                chan_width_hz: chan_width_khz * 1e3,
                num_stations,
                write_autocorr: autos,
                write_crosscorr: !no_cross,
            },
            precision,
            full_pol,
            num_times,
            block_times,
            time_start_mjd_utc: start_mjd.unwrap_or(DEFAULT_START_MJD),
            time_inc_sec: time_res,
            time_average_sec: time_average,
            ring_radius_m: ring_radius,
            flux_density_jy: flux.unwrap_or(DEFAULT_FLUX_JY),
            noise_rms_jy: noise_rms,
            seed,
            add_model: model_data,
            add_corrected: corrected_data,
            settings,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), VistableError> {
        debug!("Converting arguments into parameters");
        let params = self.parse()?;

        info!("Output:            {}", params.output.display());
        info!(
            "Stations:          {} (autos: {}, crosses: {})",
            params.ms.num_stations, params.ms.write_autocorr, params.ms.write_crosscorr
        );
        info!(
            "Channels:          {} from {} MHz, {} kHz wide",
            params.ms.num_channels,
            params.ms.ref_freq_hz / 1e6,
            params.ms.chan_width_hz / 1e3
        );
        info!(
            "Time samples:      {} every {} s, {} per block",
            params.num_times, params.time_inc_sec, params.block_times
        );
        info!(
            "Polarisations:     {} ({} precision{})",
            params.ms.num_pols,
            params.precision,
            if params.full_pol { ", full pol" } else { "" }
        );

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

impl SynthesizeCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            output: self.output.or(other.output),
            observer: self.observer.or(other.observer),
            model_data: self.model_data || other.model_data,
            corrected_data: self.corrected_data || other.corrected_data,
            num_stations: self.num_stations.or(other.num_stations),
            ring_radius: self.ring_radius.or(other.ring_radius),
            num_channels: self.num_channels.or(other.num_channels),
            ref_freq: self.ref_freq.or(other.ref_freq),
            chan_width: self.chan_width.or(other.chan_width),
            num_times: self.num_times.or(other.num_times),
            time_res: self.time_res.or(other.time_res),
            time_average: self.time_average.or(other.time_average),
            start_mjd: self.start_mjd.or(other.start_mjd),
            ra: self.ra.or(other.ra),
            dec: self.dec.or(other.dec),
            num_pols: self.num_pols.or(other.num_pols),
            full_pol: self.full_pol || other.full_pol,
            autos: self.autos || other.autos,
            no_cross: self.no_cross || other.no_cross,
            flux: self.flux.or(other.flux),
            noise_rms: self.noise_rms.or(other.noise_rms),
            seed: self.seed.or(other.seed),
            precision: self.precision.or(other.precision),
            block_times: self.block_times.or(other.block_times),
        }
    }
}

#[derive(Error, Debug)]
pub(super) enum SynthesizeArgsError {
    #[error("The number of stations cannot be 0")]
    ZeroStations,

    #[error("The number of channels cannot be 0")]
    ZeroChannels,

    #[error("The number of time samples cannot be 0")]
    ZeroTimes,

    #[error("The number of time samples per block cannot be 0")]
    ZeroBlockTimes,

    #[error("The number of polarisations must be 1 or 4, not {0}")]
    BadNumPols(usize),

    #[error("Full-polarisation visibilities need 4 polarisations")]
    FullPolNeedsFourPols,

    #[error("Neither auto- nor cross-correlations would be written")]
    NoCorrelations,

    #[error("Cross-correlations need at least 2 stations")]
    TooFewStationsForCrosses,

    #[error("--{arg} must be positive, not {value}")]
    NotPositive { arg: &'static str, value: f64 },

    #[error("The noise RMS cannot be negative ({0} Jy)")]
    NegativeNoise(f64),

    #[error("Declination {0} is not between -90 and 90 degrees")]
    BadDec(f64),

    #[error("Unrecognised precision '{0}'; supported: {}", Precision::iter().join(", "))]
    BadPrecision(String),

    #[error("Couldn't record the settings: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error(transparent)]
    Params(#[from] ParamsError),
}
