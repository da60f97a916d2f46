// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

Times in measurement sets are MJD seconds (UTC), i.e. days since MJD 0
multiplied by [`SECONDS_PER_DAY`].
 */

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// The release date of an observation is this many days after its end.
pub const RELEASE_DELAY_DAYS: f64 = 365.25;

/// The number of receptors on each feed ("X" and "Y").
pub const NUM_RECEPTORS: usize = 2;

/// Bucket size of the standard storage manager used for scalar main-table
/// columns \[bytes\].
pub const STANDARD_BUCKET_BYTES: usize = 32768;

/// DATA, UVW, WEIGHT and SIGMA tiles hold this many time samples of rows.
pub const DATA_TILE_TIMES: usize = 2;

/// FLAG tiles hold this many time samples of rows.
pub const FLAG_TILE_TIMES: usize = 16;

/// The number of single-precision complex elements in a canonical scratch
/// column tile (1 MiB).
pub const CANONICAL_TILE_ELEMENTS: usize = 131072;

/// Frequency reference code for topocentric frequencies.
pub const MEAS_FREQ_REF_TOPO: i32 = 5;

/// Correlation type codes of linear polarisations (Stokes enumeration).
pub const CORR_TYPE_XX: i32 = 9;
pub const CORR_TYPE_XY: i32 = 10;
pub const CORR_TYPE_YX: i32 = 11;
pub const CORR_TYPE_YY: i32 = 12;

/// Mount type written for every station.
pub const STATION_MOUNT: &str = "ALT-AZ";

/// The seed used when none is specified.
pub const DEFAULT_SEED: u64 = 1;
