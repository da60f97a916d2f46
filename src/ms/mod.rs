// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Measurement sets.
//!
//! A [`MeasurementSet`] owns a main table with one row per (time, baseline)
//! and the sub-tables describing the observation. Rows are only ever added.
//! The observation's time range is finalised when the measurement set is
//! closed (explicitly with [`MeasurementSet::close`], or when dropped).

mod error;
mod otf_model;
mod schema;
mod subtables;

pub use error::MsError;
pub use schema::SubTable;

use std::path::{Path, PathBuf};

use hifitime::Epoch;
use log::{debug, trace, warn};
use num_complex::Complex;
use strum::IntoEnumIterator;

use crate::{
    c32,
    constants::*,
    io::read::{get_column, GetColumnError},
    math::num_output_baselines,
    table::{
        CasaEngine, ColumnDesc, DataType, Keyword, StorageManager, Table, TableEngine, TableExt,
    },
    vis_block::VisFloat,
};
use subtables::HistoryEntry;

/// Everything needed to create a new measurement set.
#[derive(Debug, Clone, PartialEq)]
pub struct MsCreateParams {
    /// Recorded as the telescope name and as the application in HISTORY.
    pub app_name: String,
    pub observer: String,
    pub phase_centre_ra_rad: f64,
    pub phase_centre_dec_rad: f64,
    pub num_pols: usize,
    pub num_channels: usize,
    pub ref_freq_hz: f64,
    pub chan_width_hz: f64,
    pub num_stations: usize,
    pub write_autocorr: bool,
    pub write_crosscorr: bool,
}

/// The time metadata shared by the rows of one time sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMeta {
    /// \[MJD seconds (UTC)\]
    pub time: f64,
    /// \[seconds\]
    pub exposure: f64,
    /// \[seconds\]
    pub interval: f64,
}

/// The per-row contents of one time sample of the main table.
#[derive(Debug, Clone, Copy)]
pub struct TimeRows<'a> {
    pub uu: &'a [f64],
    pub vv: &'a [f64],
    pub ww: &'a [f64],
    pub antenna1: &'a [i32],
    pub antenna2: &'a [i32],
}

impl TimeRows<'_> {
    fn num_rows(&self) -> usize {
        self.uu.len()
    }

    fn check(&self) -> Result<(), MsError> {
        let n = self.num_rows();
        for (what, len) in [
            ("vv coordinates", self.vv.len()),
            ("ww coordinates", self.ww.len()),
            ("ANTENNA1 values", self.antenna1.len()),
            ("ANTENNA2 values", self.antenna2.len()),
        ] {
            if len != n {
                return Err(MsError::DimensionMismatch {
                    what,
                    expected: n,
                    got: len,
                });
            }
        }
        Ok(())
    }
}

/// The columns that [`MeasurementSet::copy_column`] can copy between.
const VIS_COLUMNS: [&str; 3] = ["DATA", "MODEL_DATA", "CORRECTED_DATA"];

pub struct MeasurementSet {
    path: PathBuf,
    main: Box<dyn Table>,
    /// Indexed by [`SubTable`].
    subtables: Vec<Box<dyn Table>>,

    app_name: String,
    num_pols: usize,
    num_channels: usize,
    num_stations: usize,
    ref_freq_hz: f64,
    chan_width_hz: f64,
    phase_centre_ra_rad: f64,
    phase_centre_dec_rad: f64,
    time_inc_sec: f64,
    write_autocorr: bool,
    write_crosscorr: bool,

    /// The time range stored in OBSERVATION \[MJD seconds (UTC)\].
    stored_time_range: [f64; 2],
    /// The range of times written through this handle, including half an
    /// interval either side.
    written_time_range: Option<[f64; 2]>,
    closed: bool,
}

/// Main-table keywords recording which kinds of correlations are written.
const AUTOCORR_KEYWORD: &str = "VISTABLE_WRITE_AUTOCORR";
const CROSSCORR_KEYWORD: &str = "VISTABLE_WRITE_CROSSCORR";

/// Work out which kinds of correlations a measurement set without
/// [`AUTOCORR_KEYWORD`] holds from its first time sample's worth of rows.
/// Empty sets are taken to hold cross-correlations only.
fn infer_correlations(main: &dyn Table, num_stations: usize) -> Result<(bool, bool), MsError> {
    let n = (num_stations * (num_stations + 1) / 2).min(main.num_rows() as usize) as u64;
    if n == 0 {
        return Ok((false, true));
    }
    let ant1: Vec<i32> = main.get_range("ANTENNA1", 0..n)?;
    let ant2: Vec<i32> = main.get_range("ANTENNA2", 0..n)?;
    Ok((
        ant1.iter().zip(&ant2).any(|(a1, a2)| a1 == a2),
        ant1.iter().zip(&ant2).any(|(a1, a2)| a1 != a2),
    ))
}

impl MeasurementSet {
    /// Create a new measurement set with the [`CasaEngine`]. Nothing may
    /// exist at `path`.
    pub fn create<P: AsRef<Path>>(path: P, params: &MsCreateParams) -> Result<Self, MsError> {
        Self::create_with_engine(&CasaEngine, path.as_ref(), params)
    }

    pub fn create_with_engine(
        engine: &dyn TableEngine,
        path: &Path,
        params: &MsCreateParams,
    ) -> Result<Self, MsError> {
        let num_baselines = num_output_baselines(
            params.num_stations,
            params.write_autocorr,
            params.write_crosscorr,
        )
        .ok_or_else(|| {
            MsError::InvalidArgument(
                "at least one of autocorrelations and cross-correlations must be written"
                    .to_string(),
            )
        })?;
        subtables::corr_types(params.num_pols)?;
        if params.num_channels == 0 {
            return Err(MsError::InvalidArgument(
                "the number of channels must be positive".to_string(),
            ));
        }
        debug!(
            "Creating measurement set {} ({} pols, {} channels, {} stations, {num_baselines} rows per time)",
            path.display(),
            params.num_pols,
            params.num_channels,
            params.num_stations
        );

        let mut main = engine.create(
            path,
            schema::main_table_desc(params.num_pols, params.num_channels, num_baselines),
        )?;
        let mut subtables = Vec::with_capacity(SubTable::iter().len());
        for sub in SubTable::iter() {
            let name: &'static str = sub.into();
            subtables.push(engine.create(&path.join(name), schema::subtable_desc(sub))?);
            main.keywords_mut()
                .insert(name, Keyword::Table(name.to_string()));
        }
        main.keywords_mut().insert("MS_VERSION", Keyword::Double(2.0));
        main.keywords_mut()
            .insert(AUTOCORR_KEYWORD, Keyword::Bool(params.write_autocorr));
        main.keywords_mut()
            .insert(CROSSCORR_KEYWORD, Keyword::Bool(params.write_crosscorr));

        let mut ms = MeasurementSet {
            path: path.to_path_buf(),
            main,
            subtables,
            app_name: params.app_name.clone(),
            num_pols: params.num_pols,
            num_channels: params.num_channels,
            num_stations: params.num_stations,
            ref_freq_hz: params.ref_freq_hz,
            chan_width_hz: params.chan_width_hz,
            phase_centre_ra_rad: params.phase_centre_ra_rad,
            phase_centre_dec_rad: params.phase_centre_dec_rad,
            time_inc_sec: 0.0,
            write_autocorr: params.write_autocorr,
            write_crosscorr: params.write_crosscorr,
            stored_time_range: [0.0; 2],
            written_time_range: None,
            closed: false,
        };

        subtables::add_observation(
            ms.sub_mut(SubTable::Observation),
            &params.app_name,
            &params.observer,
        )?;
        subtables::add_pol(ms.sub_mut(SubTable::Polarization), params.num_pols)?;
        subtables::add_field(
            ms.sub_mut(SubTable::Field),
            params.phase_centre_ra_rad,
            params.phase_centre_dec_rad,
        )?;

        let chan_freqs: Vec<f64> = (0..params.num_channels)
            .map(|c| params.ref_freq_hz + c as f64 * params.chan_width_hz)
            .collect();
        let chan_widths = vec![params.chan_width_hz; params.num_channels];
        {
            let (dd, spw) = ms.sub_pair_mut(SubTable::DataDescription, SubTable::SpectralWindow);
            subtables::add_band(dd, spw, 0, params.ref_freq_hz, &chan_freqs, &chan_widths)?;
        }

        let created = chrono::Local::now().format("%Y-%m-%d, %H:%M:%S (%Z)");
        let now = Epoch::now()?.to_mjd_utc_seconds();
        subtables::add_history(
            ms.sub_mut(SubTable::History),
            HistoryEntry {
                message: &format!("Measurement Set created at {created}"),
                application: &params.app_name,
                origin: &params.app_name,
                time: now,
                app_params: vec![],
            },
        )?;

        ms.sub_mut(SubTable::Antenna)
            .add_rows(params.num_stations as u64)?;
        let feed = ms.sub_mut(SubTable::Feed);
        feed.add_rows(params.num_stations as u64)?;
        subtables::set_antenna_feeds(feed, params.num_stations)?;

        ms.flush()?;
        Ok(ms)
    }

    /// Open an existing measurement set with the [`CasaEngine`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MsError> {
        Self::open_with_engine(&CasaEngine, path.as_ref())
    }

    pub fn open_with_engine(engine: &dyn TableEngine, path: &Path) -> Result<Self, MsError> {
        let main = engine.open(path)?;
        let mut subtables = Vec::with_capacity(SubTable::iter().len());
        for sub in SubTable::iter() {
            let name: &'static str = sub.into();
            let sub_path = match main.keywords().get(name) {
                Some(Keyword::Table(rel)) => path.join(rel),
                _ => {
                    return Err(MsError::MissingSubTable {
                        path: path.to_path_buf(),
                        name,
                    })
                }
            };
            if !engine.exists(&sub_path) {
                return Err(MsError::MissingSubTable {
                    path: path.to_path_buf(),
                    name,
                });
            }
            subtables.push(engine.open(&sub_path)?);
        }

        let sub = |s: SubTable| subtables[s as usize].as_ref();

        let pol = sub(SubTable::Polarization);
        let num_pols = if pol.num_rows() > 0 {
            pol.get_scalar::<i32>("NUM_CORR", 0)?.max(0) as usize
        } else {
            0
        };
        let spw = sub(SubTable::SpectralWindow);
        let (num_channels, ref_freq_hz, chan_width_hz) = if spw.num_rows() > 0 {
            (
                spw.get_scalar::<i32>("NUM_CHAN", 0)?.max(0) as usize,
                spw.get_scalar::<f64>("REF_FREQUENCY", 0)?,
                spw.get_vec::<f64>("CHAN_WIDTH", 0)?
                    .first()
                    .copied()
                    .unwrap_or(0.0),
            )
        } else {
            (0, 0.0, 0.0)
        };
        let num_stations = sub(SubTable::Antenna).num_rows() as usize;
        let time_inc_sec = if main.num_rows() > 0 {
            main.get_scalar("INTERVAL", 0)?
        } else {
            0.0
        };
        let field = sub(SubTable::Field);
        let phase_dir: Vec<f64> = if field.num_rows() > 0 {
            field.get_vec("PHASE_DIR", 0)?
        } else {
            vec![]
        };
        let obs = sub(SubTable::Observation);
        let time_range: Vec<f64> = if obs.num_rows() > 0 {
            obs.get_vec("TIME_RANGE", 0)?
        } else {
            vec![]
        };
        let history = sub(SubTable::History);
        let app_name = if history.num_rows() > 0 {
            history.get_scalar("APPLICATION", 0)?
        } else {
            String::new()
        };

        let (write_autocorr, write_crosscorr) = match (
            main.keywords().get_bool(AUTOCORR_KEYWORD),
            main.keywords().get_bool(CROSSCORR_KEYWORD),
        ) {
            (Some(autos), Some(cross)) => (autos, cross),
            _ => infer_correlations(main.as_ref(), num_stations)?,
        };

        let ms = MeasurementSet {
            path: path.to_path_buf(),
            main,
            subtables,
            app_name,
            num_pols,
            num_channels,
            num_stations,
            ref_freq_hz,
            chan_width_hz,
            phase_centre_ra_rad: phase_dir.first().copied().unwrap_or(0.0),
            phase_centre_dec_rad: phase_dir.get(1).copied().unwrap_or(0.0),
            time_inc_sec,
            write_autocorr,
            write_crosscorr,
            stored_time_range: match time_range.as_slice() {
                [start, end] => [*start, *end],
                _ => [0.0; 2],
            },
            written_time_range: None,
            closed: false,
        };
        debug!(
            "Opened measurement set {} ({} pols, {} channels, {} stations, {} rows)",
            path.display(),
            ms.num_pols,
            ms.num_channels,
            ms.num_stations,
            ms.main.num_rows()
        );
        Ok(ms)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The main table.
    pub fn main(&self) -> &dyn Table {
        self.main.as_ref()
    }

    pub fn sub(&self, sub: SubTable) -> &dyn Table {
        self.subtables[sub as usize].as_ref()
    }

    fn sub_mut(&mut self, sub: SubTable) -> &mut dyn Table {
        self.subtables[sub as usize].as_mut()
    }

    /// Two different sub-tables, mutably.
    fn sub_pair_mut(&mut self, a: SubTable, b: SubTable) -> (&mut dyn Table, &mut dyn Table) {
        let (a, b) = (a as usize, b as usize);
        debug_assert_ne!(a, b);
        if a < b {
            let (lo, hi) = self.subtables.split_at_mut(b);
            (lo[a].as_mut(), hi[0].as_mut())
        } else {
            let (lo, hi) = self.subtables.split_at_mut(a);
            (hi[0].as_mut(), lo[b].as_mut())
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn num_pols(&self) -> usize {
        self.num_pols
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn num_stations(&self) -> usize {
        self.num_stations
    }

    pub fn num_rows(&self) -> u64 {
        self.main.num_rows()
    }

    pub fn ref_freq_hz(&self) -> f64 {
        self.ref_freq_hz
    }

    pub fn channel_width_hz(&self) -> f64 {
        self.chan_width_hz
    }

    pub fn phase_centre_ra_rad(&self) -> f64 {
        self.phase_centre_ra_rad
    }

    pub fn phase_centre_dec_rad(&self) -> f64 {
        self.phase_centre_dec_rad
    }

    /// The interval of the most recently written time sample (or of the first
    /// row, when opened) \[seconds\].
    pub fn time_inc_sec(&self) -> f64 {
        self.time_inc_sec
    }

    pub fn write_autocorr(&self) -> bool {
        self.write_autocorr
    }

    pub fn write_crosscorr(&self) -> bool {
        self.write_crosscorr
    }

    /// The number of main-table rows per time sample.
    pub fn num_output_baselines(&self) -> usize {
        num_output_baselines(self.num_stations, self.write_autocorr, self.write_crosscorr)
            .unwrap_or(0)
    }

    /// The observation's time range, including everything written so far
    /// \[MJD seconds (UTC)\].
    pub fn time_range(&self) -> [f64; 2] {
        let [old_start, old_end] = self.stored_time_range;
        match self.written_time_range {
            None => self.stored_time_range,
            Some([start, end]) => [
                if old_start <= 0.0 || start < old_start {
                    start
                } else {
                    old_start
                },
                end.max(old_end),
            ],
        }
    }

    /// \[MJD (UTC) days\]
    pub fn start_time_mjd(&self) -> f64 {
        self.time_range()[0] / SECONDS_PER_DAY
    }

    /// \[MJD (UTC) days\]
    pub fn end_time_mjd(&self) -> f64 {
        self.time_range()[1] / SECONDS_PER_DAY
    }

    /// Grow the main table to `num_rows` rows. Tables never shrink, so a
    /// smaller number does nothing.
    pub fn set_num_rows(&mut self, num_rows: u64) -> Result<(), MsError> {
        let old = self.main.num_rows();
        if num_rows > old {
            self.main.add_rows(num_rows - old)?;
        }
        Ok(())
    }

    fn check_rows(&self, start_row: u64, num_rows: usize) -> Result<(), MsError> {
        let end = start_row + num_rows as u64;
        if end > self.main.num_rows() {
            return Err(MsError::OutOfRange {
                row: end - 1,
                num_rows: self.main.num_rows(),
            });
        }
        Ok(())
    }

    fn update_time_range(&mut self, meta: TimeMeta) {
        let start = meta.time - meta.interval / 2.0;
        let end = meta.time + meta.interval / 2.0;
        self.written_time_range = Some(match self.written_time_range {
            None => [start, end],
            Some([s, e]) => [s.min(start), e.max(end)],
        });
        self.time_inc_sec = meta.interval;
    }

    /// Write the coordinates, antennas, weights and time metadata of the rows
    /// starting at `start_row`.
    fn put_row_metadata(
        &mut self,
        start_row: u64,
        rows: &TimeRows,
        meta: TimeMeta,
    ) -> Result<(), MsError> {
        let n = rows.num_rows();
        let uvw: Vec<f64> = (0..n)
            .flat_map(|r| [rows.uu[r], rows.vv[r], rows.ww[r]])
            .collect();
        let main = self.main.as_mut();
        main.put_range("UVW", start_row, uvw)?;
        main.put_range("ANTENNA1", start_row, rows.antenna1.to_vec())?;
        main.put_range("ANTENNA2", start_row, rows.antenna2.to_vec())?;
        main.put_range("WEIGHT", start_row, vec![1.0_f32; n * self.num_pols])?;
        main.put_range("SIGMA", start_row, vec![1.0_f32; n * self.num_pols])?;
        main.put_range("EXPOSURE", start_row, vec![meta.exposure; n])?;
        main.put_range("INTERVAL", start_row, vec![meta.interval; n])?;
        main.put_range("TIME", start_row, vec![meta.time; n])?;
        main.put_range("TIME_CENTROID", start_row, vec![meta.time; n])?;
        self.update_time_range(meta);
        Ok(())
    }

    /// Write every column of one time sample's rows, which must already
    /// exist. `vis` holds all polarisations and channels of each row,
    /// polarisation fastest, then channel, then row.
    pub fn write_all_for_time(
        &mut self,
        start_row: u64,
        rows: &TimeRows,
        vis: &[c32],
        meta: TimeMeta,
    ) -> Result<(), MsError> {
        rows.check()?;
        let n = rows.num_rows();
        let expected = n * self.num_channels * self.num_pols;
        if vis.len() != expected {
            return Err(MsError::DimensionMismatch {
                what: "visibilities",
                expected,
                got: vis.len(),
            });
        }
        self.check_rows(start_row, n)?;
        trace!("Writing {n} rows from row {start_row} at time {}", meta.time);

        self.main.put_range("DATA", start_row, vis.to_vec())?;
        self.put_row_metadata(start_row, rows, meta)
    }

    /// Write coordinates, antennas and time metadata (but not visibilities)
    /// for time index `time_index`, growing the table if required.
    pub fn write_baselines(
        &mut self,
        time_index: usize,
        rows: &TimeRows,
        meta: TimeMeta,
    ) -> Result<(), MsError> {
        rows.check()?;
        let n = rows.num_rows() as u64;
        let start_row = time_index as u64 * n;
        self.set_num_rows(start_row + n)?;
        self.put_row_metadata(start_row, rows, meta)
    }

    /// Write a block of visibilities into a channel range of existing rows.
    /// `vis` is ordered polarisation fastest, then baseline, then channel,
    /// then time; each time covers `num_baselines` rows.
    pub fn write_vis<F: VisFloat>(
        &mut self,
        start_time: usize,
        start_channel: usize,
        num_times: usize,
        num_channels: usize,
        num_baselines: usize,
        vis: &[Complex<F>],
    ) -> Result<(), MsError> {
        let num_pols = self.num_pols;
        if start_channel + num_channels > self.num_channels {
            return Err(MsError::DimensionMismatch {
                what: "channels",
                expected: self.num_channels,
                got: start_channel + num_channels,
            });
        }
        let expected = num_times * num_channels * num_baselines * num_pols;
        if vis.len() != expected {
            return Err(MsError::DimensionMismatch {
                what: "visibilities",
                expected,
                got: vis.len(),
            });
        }
        let start_row = (start_time * num_baselines) as u64;
        let num_rows = num_times * num_baselines;
        self.check_rows(start_row, num_rows)?;
        if num_rows == 0 {
            return Ok(());
        }

        let mut data: Vec<c32> = self
            .main
            .get_range("DATA", start_row..start_row + num_rows as u64)?;
        let row_len = self.num_channels * num_pols;
        for t in 0..num_times {
            for c in 0..num_channels {
                for b in 0..num_baselines {
                    let row = t * num_baselines + b;
                    let src = num_pols * (num_baselines * (t * num_channels + c) + b);
                    let dst = row * row_len + (start_channel + c) * num_pols;
                    for p in 0..num_pols {
                        let v = vis[src + p];
                        data[dst + p] = c32::new(v.re.as_f32(), v.im.as_f32());
                    }
                }
            }
        }
        self.main.put_range("DATA", start_row, data)?;
        Ok(())
    }

    /// Fill the ANTENNA positions \[metres\] of every station.
    pub fn set_station_coords<F: VisFloat>(
        &mut self,
        x: &[F],
        y: &[F],
        z: &[F],
    ) -> Result<(), MsError> {
        let num_stations = self.num_stations;
        for len in [x.len(), y.len(), z.len()] {
            if len != num_stations {
                return Err(MsError::DimensionMismatch {
                    what: "station coordinates",
                    expected: num_stations,
                    got: len,
                });
            }
        }
        let antenna = self.sub_mut(SubTable::Antenna);
        for a in 0..num_stations {
            let row = a as u64;
            antenna.put_vec("POSITION", row, vec![x[a].as_f64(), y[a].as_f64(), z[a].as_f64()])?;
            antenna.put_scalar("MOUNT", row, STATION_MOUNT.to_string())?;
            antenna.put_scalar("DISH_DIAMETER", row, 1.0)?;
            antenna.put_scalar("FLAG_ROW", row, false)?;
        }
        Ok(())
    }

    /// Add a HISTORY row for each line of `text`.
    pub fn append_history(&mut self, origin: &str, text: &str) -> Result<(), MsError> {
        let time = Epoch::now()?.to_mjd_utc_seconds();
        let app_name = self.app_name.clone();
        let history = self.sub_mut(SubTable::History);
        for line in text.lines() {
            subtables::add_history(
                history,
                HistoryEntry {
                    message: line,
                    application: &app_name,
                    origin,
                    time,
                    app_params: vec![],
                },
            )?;
        }
        Ok(())
    }

    /// Add MODEL_DATA and/or CORRECTED_DATA. Columns that already exist are
    /// left alone.
    pub fn add_scratch_columns(&mut self, want_model: bool, want_corrected: bool) -> Result<(), MsError> {
        let add_model = want_model && !self.main.has_column("MODEL_DATA");
        let add_corrected = want_corrected && !self.main.has_column("CORRECTED_DATA");
        if !add_model && !add_corrected {
            return Ok(());
        }

        // A sorted view of the table wouldn't know about the new columns.
        self.main.keywords_mut().remove("SORT_COLUMNS");
        self.main.keywords_mut().remove("SORTED_TABLE");

        if add_model {
            let source = self.subtables[SubTable::Source as usize].as_mut();
            otf_model::remove_otf_model(self.main.as_mut(), source)?;
        }

        let data_column = if self.main.has_column("FLOAT_DATA") {
            "FLOAT_DATA"
        } else {
            "DATA"
        };
        let data_desc = self
            .main
            .column_desc(data_column)
            .cloned()
            .ok_or_else(|| MsError::ColumnNotFound(data_column.to_string()))?;
        let cell_shape = data_desc
            .fixed_shape()
            .map(|s| s.to_vec())
            .unwrap_or_else(|| vec![self.num_pols, self.num_channels]);
        let tile_shape = scratch_tile_shape(&data_desc, &cell_shape, self.sub(SubTable::SpectralWindow))?;
        debug!("Adding scratch columns with tile shape {tile_shape:?}");

        let mut add = |name: &str, comment: &str, manager: &str| {
            self.main.add_column(
                ColumnDesc::fixed_array(name, DataType::Complex, &cell_shape)
                    .comment(comment)
                    .storage(StorageManager::Tiled {
                        name: manager.to_string(),
                        tile_shape: tile_shape.clone(),
                    }),
            )
        };
        if add_model {
            add("MODEL_DATA", "model data", "ModelTiled")?;
        }
        if add_corrected {
            add("CORRECTED_DATA", "corrected data", "CorrectedTiled")?;
        }
        self.main.flush()?;
        Ok(())
    }

    /// Copy every row of one visibility column (DATA, MODEL_DATA or
    /// CORRECTED_DATA) into another. Other column names are ignored.
    pub fn copy_column(&mut self, source: &str, dest: &str) -> Result<(), MsError> {
        if !VIS_COLUMNS.contains(&source) || !VIS_COLUMNS.contains(&dest) {
            return Ok(());
        }
        for column in [source, dest] {
            if !self.main.has_column(column) {
                return Err(MsError::ColumnNotFound(column.to_string()));
            }
        }
        if source == dest {
            return Ok(());
        }
        let num_rows = self.main.num_rows();
        let chunk = (self.num_output_baselines().max(1) * DATA_TILE_TIMES) as u64;
        trace!("Copying {source} to {dest} ({num_rows} rows)");
        let mut row = 0;
        while row < num_rows {
            let end = (row + chunk).min(num_rows);
            let values = self.main.get_column_range(source, row..end)?;
            self.main.put_column_range(dest, row, &values)?;
            row = end;
        }
        Ok(())
    }

    /// Read a main-table column into `buffer`; see [`get_column`].
    pub fn get_column(
        &self,
        column: &str,
        start_row: u64,
        num_rows: u64,
        buffer: &mut [u8],
    ) -> Result<usize, GetColumnError> {
        get_column(self.main.as_ref(), column, start_row, num_rows, buffer)
    }

    pub fn flush(&mut self) -> Result<(), MsError> {
        self.main.flush()?;
        for sub in &mut self.subtables {
            sub.flush()?;
        }
        Ok(())
    }

    /// Record the observation's time range and release date.
    fn finalise_time_range(&mut self) -> Result<(), MsError> {
        if self.written_time_range.is_none() {
            return Ok(());
        }
        let range = self.time_range();
        let release_date = range[1] + RELEASE_DELAY_DAYS * SECONDS_PER_DAY;
        debug!("Observation time range: {range:?}");
        let obs = self.sub_mut(SubTable::Observation);
        if obs.num_rows() > 0 {
            obs.put_vec("TIME_RANGE", 0, range.to_vec())?;
            obs.put_scalar("RELEASE_DATE", 0, release_date)?;
        }
        self.stored_time_range = range;
        self.written_time_range = None;
        Ok(())
    }

    /// Finalise the time range and flush everything to disk.
    pub fn close(mut self) -> Result<(), MsError> {
        self.closed = true;
        self.finalise_time_range()?;
        self.flush()
    }
}

impl Drop for MeasurementSet {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.finalise_time_range().and_then(|_| self.flush()) {
            warn!(
                "Couldn't finalise measurement set {}: {e}",
                self.path.display()
            );
        }
    }
}

/// The tile shape of scratch columns: that of the data column if it's tiled
/// with a (pol, channel, row) tile, otherwise a canonical tile of about
/// 1 MiB.
pub(crate) fn scratch_tile_shape(
    data_desc: &ColumnDesc,
    cell_shape: &[usize],
    spectral_window: &dyn Table,
) -> Result<Vec<usize>, MsError> {
    if let StorageManager::Tiled { tile_shape, .. } = &data_desc.storage {
        if tile_shape.len() == 3 {
            return Ok(tile_shape.clone());
        }
    }
    let max_num_channels = spectral_window
        .get_column_as_vec::<i32>("NUM_CHAN")?
        .into_iter()
        .max()
        .unwrap_or(0)
        .max(0) as usize;
    let tile_chan = max_num_channels / 10 + 1;
    let num_corr = cell_shape.first().copied().unwrap_or(1).max(1);
    Ok(vec![
        num_corr,
        tile_chan,
        CANONICAL_TILE_ELEMENTS / num_corr / tile_chan + 1,
    ])
}
