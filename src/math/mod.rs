// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Baseline arithmetic.


/// The number of cross-correlation baselines between `num_stations` stations.
pub fn num_cross_baselines(num_stations: usize) -> usize {
    num_stations * num_stations.saturating_sub(1) / 2
}

/// The number of rows written per time sample, given which kinds of
/// correlations are written. `None` is returned if neither kind is written.
pub fn num_output_baselines(
    num_stations: usize,
    write_autocorr: bool,
    write_crosscorr: bool,
) -> Option<usize> {
    match (write_autocorr, write_crosscorr) {
        (true, true) => Some(num_stations * (num_stations + 1) / 2),
        (false, true) => Some(num_cross_baselines(num_stations)),
        (true, false) => Some(num_stations),
        (false, false) => None,
    }
}

/// Station-pair indices of the cross-correlation baselines, upper-triangular
/// order, i.e. (0,1), (0,2), ..., (1,2), ...
pub fn cross_baseline_stations(num_stations: usize) -> (Vec<usize>, Vec<usize>) {
    let n = num_cross_baselines(num_stations);
    let mut station1 = Vec::with_capacity(n);
    let mut station2 = Vec::with_capacity(n);
    for s1 in 0..num_stations {
        for s2 in s1 + 1..num_stations {
            station1.push(s1);
            station2.push(s2);
        }
    }
    (station1, station2)
}

/// Where an output row's samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSource {
    /// An autocorrelation of this station.
    Auto(usize),

    /// A cross-correlation baseline with this index.
    Cross(usize),
}

/// A single row of the per-time output ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBaseline {
    pub station1: usize,
    pub station2: usize,
    pub source: RowSource,
}

/// The output ordering of a time sample's rows. For each station `a1`
/// ascending, its autocorrelation (if written) comes first, followed by its
/// cross-correlations with every `a2 > a1` (if written).
pub fn output_baselines(
    num_stations: usize,
    write_autocorr: bool,
    write_crosscorr: bool,
) -> Vec<OutputBaseline> {
    let mut out = Vec::with_capacity(
        num_output_baselines(num_stations, write_autocorr, write_crosscorr).unwrap_or(0),
    );
    let mut i_cross = 0;
    for a1 in 0..num_stations {
        if write_autocorr {
            out.push(OutputBaseline {
                station1: a1,
                station2: a1,
                source: RowSource::Auto(a1),
            });
        }
        for a2 in a1 + 1..num_stations {
            if write_crosscorr {
                out.push(OutputBaseline {
                    station1: a1,
                    station2: a2,
                    source: RowSource::Cross(i_cross),
                });
            }
            i_cross += 1;
        }
    }
    out
}
