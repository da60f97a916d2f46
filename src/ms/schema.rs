// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Table descriptions of the main table and its sub-tables.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    constants::*,
    table::{ColumnDesc, DataType, Keyword, Keywords, StorageManager, TableDesc},
};

/// The sub-tables of a measurement set. Each lives in a directory of the
/// same name inside the main table's directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum SubTable {
    #[strum(serialize = "ANTENNA")]
    Antenna,
    #[strum(serialize = "FEED")]
    Feed,
    #[strum(serialize = "FIELD")]
    Field,
    #[strum(serialize = "SPECTRAL_WINDOW")]
    SpectralWindow,
    #[strum(serialize = "DATA_DESCRIPTION")]
    DataDescription,
    #[strum(serialize = "POLARIZATION")]
    Polarization,
    #[strum(serialize = "OBSERVATION")]
    Observation,
    #[strum(serialize = "HISTORY")]
    History,
    #[strum(serialize = "SOURCE")]
    Source,
}

fn unit(u: &str) -> Keywords {
    let mut k = Keywords::new();
    k.insert("QuantumUnits", Keyword::Strings(vec![u.to_string()]));
    k
}

fn measure(u: &str, ty: &str, reference: &str) -> Keywords {
    let mut k = unit(u);
    let mut info = Keywords::new();
    info.insert("type", Keyword::String(ty.to_string()));
    info.insert("Ref", Keyword::String(reference.to_string()));
    k.insert("MEASINFO", Keyword::Record(info));
    k
}

fn tiled(name: &str, tile_shape: Vec<usize>) -> StorageManager {
    StorageManager::Tiled {
        name: name.to_string(),
        tile_shape,
    }
}

fn incremental() -> StorageManager {
    StorageManager::Standard {
        name: "ISMData".to_string(),
        bucket_bytes: STANDARD_BUCKET_BYTES,
    }
}

/// The main table. DATA, UVW, WEIGHT and SIGMA tiles span two time samples
/// of rows; FLAG tiles span sixteen.
pub(crate) fn main_table_desc(
    num_pols: usize,
    num_channels: usize,
    num_output_baselines: usize,
) -> TableDesc {
    use DataType::*;

    let data_rows = (DATA_TILE_TIMES * num_output_baselines).max(1);
    let flag_rows = (FLAG_TILE_TIMES * num_output_baselines).max(1);
    let standard = StorageManager::Standard {
        name: "SSMData".to_string(),
        bucket_bytes: STANDARD_BUCKET_BYTES,
    };
    let scalar = |name: &str, data_type: DataType| {
        ColumnDesc::scalar(name, data_type).storage(incremental())
    };
    let mut data_keywords = Keywords::new();
    data_keywords.insert("UNIT", Keyword::String("Jy".to_string()));

    TableDesc::new("MAIN")
        .with_column(
            ColumnDesc::fixed_array("UVW", Double, &[3])
                .comment("Vector with uvw coordinates (in meters)")
                .keywords(measure("m", "uvw", "ITRF"))
                .storage(tiled("TiledUVW", vec![3, data_rows])),
        )
        .with_column(
            ColumnDesc::fixed_array("FLAG", Bool, &[num_pols, num_channels])
                .comment("The data flags, array of bools with same shape as data")
                .storage(tiled("TiledFlag", vec![num_pols, num_channels, flag_rows])),
        )
        .with_column(
            ColumnDesc::variable_array("FLAG_CATEGORY", Bool, 3)
                .comment("The flag category, NUM_CAT flags for each datum"),
        )
        .with_column(
            ColumnDesc::fixed_array("WEIGHT", Float, &[num_pols])
                .comment("Weight for each polarization spectrum")
                .storage(tiled("TiledWeight", vec![num_pols, data_rows])),
        )
        .with_column(
            ColumnDesc::fixed_array("SIGMA", Float, &[num_pols])
                .comment("Estimated rms noise for channel with unity bandpass response")
                .storage(tiled("TiledSigma", vec![num_pols, data_rows])),
        )
        .with_column(
            ColumnDesc::scalar("ANTENNA1", Int)
                .comment("ID of first antenna in interferometer")
                .storage(standard.clone()),
        )
        .with_column(
            ColumnDesc::scalar("ANTENNA2", Int)
                .comment("ID of second antenna in interferometer")
                .storage(standard),
        )
        .with_column(scalar("ARRAY_ID", Int).comment("ID of array or subarray"))
        .with_column(scalar("DATA_DESC_ID", Int).comment("The data description table index"))
        .with_column(
            scalar("EXPOSURE", Double)
                .comment("The effective integration time")
                .keywords(unit("s")),
        )
        .with_column(scalar("FEED1", Int).comment("The feed index for ANTENNA1"))
        .with_column(scalar("FEED2", Int).comment("The feed index for ANTENNA2"))
        .with_column(scalar("FIELD_ID", Int).comment("Unique id for this pointing"))
        .with_column(scalar("FLAG_ROW", Bool).comment("Row flag - flag all data in this row if True"))
        .with_column(
            scalar("INTERVAL", Double)
                .comment("The sampling interval")
                .keywords(unit("s")),
        )
        .with_column(scalar("OBSERVATION_ID", Int).comment("ID for this observation, index in OBSERVATION table"))
        .with_column(scalar("PROCESSOR_ID", Int).comment("Id for backend processor, index in PROCESSOR table"))
        .with_column(scalar("SCAN_NUMBER", Int).comment("Sequential scan number from on-line system"))
        .with_column(scalar("STATE_ID", Int).comment("ID for this observing state"))
        .with_column(
            scalar("TIME", Double)
                .comment("Modified Julian Day")
                .keywords(measure("s", "epoch", "UTC")),
        )
        .with_column(
            scalar("TIME_CENTROID", Double)
                .comment("Modified Julian Day")
                .keywords(measure("s", "epoch", "UTC")),
        )
        .with_column(
            ColumnDesc::fixed_array("DATA", Complex, &[num_pols, num_channels])
                .comment("The data column")
                .keywords(data_keywords)
                .storage(tiled("TiledData", vec![num_pols, num_channels, data_rows])),
        )
}

pub(crate) fn subtable_desc(sub: SubTable) -> TableDesc {
    use DataType::*;

    let name: &'static str = sub.into();
    let desc = TableDesc::new(name);
    match sub {
        SubTable::Antenna => desc
            .with_column(ColumnDesc::scalar("NAME", String))
            .with_column(ColumnDesc::scalar("STATION", String))
            .with_column(ColumnDesc::scalar("TYPE", String))
            .with_column(ColumnDesc::scalar("MOUNT", String))
            .with_column(
                ColumnDesc::fixed_array("POSITION", Double, &[3])
                    .keywords(measure("m", "position", "ITRF")),
            )
            .with_column(ColumnDesc::fixed_array("OFFSET", Double, &[3]).keywords(unit("m")))
            .with_column(ColumnDesc::scalar("DISH_DIAMETER", Double).keywords(unit("m")))
            .with_column(ColumnDesc::scalar("FLAG_ROW", Bool)),

        SubTable::Feed => desc
            .with_column(ColumnDesc::scalar("ANTENNA_ID", Int))
            .with_column(ColumnDesc::scalar("FEED_ID", Int))
            .with_column(ColumnDesc::scalar("SPECTRAL_WINDOW_ID", Int))
            .with_column(ColumnDesc::scalar("TIME", Double).keywords(measure("s", "epoch", "UTC")))
            .with_column(ColumnDesc::scalar("INTERVAL", Double).keywords(unit("s")))
            .with_column(ColumnDesc::scalar("NUM_RECEPTORS", Int))
            .with_column(ColumnDesc::scalar("BEAM_ID", Int))
            .with_column(ColumnDesc::variable_array("BEAM_OFFSET", Double, 2).keywords(unit("rad")))
            .with_column(ColumnDesc::variable_array("POLARIZATION_TYPE", String, 1))
            .with_column(ColumnDesc::variable_array("POL_RESPONSE", Complex, 2))
            .with_column(ColumnDesc::fixed_array("POSITION", Double, &[3]).keywords(unit("m")))
            .with_column(ColumnDesc::variable_array("RECEPTOR_ANGLE", Double, 1).keywords(unit("rad"))),

        SubTable::Field => desc
            .with_column(ColumnDesc::scalar("NAME", String))
            .with_column(ColumnDesc::scalar("CODE", String))
            .with_column(ColumnDesc::scalar("TIME", Double).keywords(measure("s", "epoch", "UTC")))
            .with_column(ColumnDesc::scalar("NUM_POLY", Int))
            .with_column(
                ColumnDesc::variable_array("DELAY_DIR", Double, 2)
                    .keywords(measure("rad", "direction", "J2000")),
            )
            .with_column(
                ColumnDesc::variable_array("PHASE_DIR", Double, 2)
                    .keywords(measure("rad", "direction", "J2000")),
            )
            .with_column(
                ColumnDesc::variable_array("REFERENCE_DIR", Double, 2)
                    .keywords(measure("rad", "direction", "J2000")),
            )
            .with_column(ColumnDesc::scalar("SOURCE_ID", Int))
            .with_column(ColumnDesc::scalar("FLAG_ROW", Bool)),

        SubTable::SpectralWindow => desc
            .with_column(ColumnDesc::scalar("MEAS_FREQ_REF", Int))
            .with_column(ColumnDesc::variable_array("CHAN_FREQ", Double, 1).keywords(unit("Hz")))
            .with_column(ColumnDesc::scalar("REF_FREQUENCY", Double).keywords(unit("Hz")))
            .with_column(ColumnDesc::variable_array("CHAN_WIDTH", Double, 1).keywords(unit("Hz")))
            .with_column(ColumnDesc::variable_array("EFFECTIVE_BW", Double, 1).keywords(unit("Hz")))
            .with_column(ColumnDesc::variable_array("RESOLUTION", Double, 1).keywords(unit("Hz")))
            .with_column(ColumnDesc::scalar("TOTAL_BANDWIDTH", Double).keywords(unit("Hz")))
            .with_column(ColumnDesc::scalar("NET_SIDEBAND", Int))
            .with_column(ColumnDesc::scalar("IF_CONV_CHAIN", Int))
            .with_column(ColumnDesc::scalar("FREQ_GROUP", Int))
            .with_column(ColumnDesc::scalar("FREQ_GROUP_NAME", String))
            .with_column(ColumnDesc::scalar("NAME", String))
            .with_column(ColumnDesc::scalar("NUM_CHAN", Int))
            .with_column(ColumnDesc::scalar("FLAG_ROW", Bool)),

        SubTable::DataDescription => desc
            .with_column(ColumnDesc::scalar("SPECTRAL_WINDOW_ID", Int))
            .with_column(ColumnDesc::scalar("POLARIZATION_ID", Int))
            .with_column(ColumnDesc::scalar("FLAG_ROW", Bool)),

        SubTable::Polarization => desc
            .with_column(ColumnDesc::scalar("NUM_CORR", Int))
            .with_column(ColumnDesc::variable_array("CORR_TYPE", Int, 1))
            .with_column(ColumnDesc::variable_array("CORR_PRODUCT", Int, 2))
            .with_column(ColumnDesc::scalar("FLAG_ROW", Bool)),

        SubTable::Observation => desc
            .with_column(ColumnDesc::scalar("TELESCOPE_NAME", String))
            .with_column(
                ColumnDesc::fixed_array("TIME_RANGE", Double, &[2])
                    .keywords(measure("s", "epoch", "UTC")),
            )
            .with_column(ColumnDesc::scalar("OBSERVER", String))
            .with_column(ColumnDesc::variable_array("LOG", String, 1))
            .with_column(ColumnDesc::scalar("SCHEDULE_TYPE", String))
            .with_column(ColumnDesc::variable_array("SCHEDULE", String, 1))
            .with_column(ColumnDesc::scalar("PROJECT", String))
            .with_column(
                ColumnDesc::scalar("RELEASE_DATE", Double).keywords(measure("s", "epoch", "UTC")),
            )
            .with_column(ColumnDesc::scalar("FLAG_ROW", Bool)),

        SubTable::History => desc
            .with_column(ColumnDesc::scalar("TIME", Double).keywords(measure("s", "epoch", "UTC")))
            .with_column(ColumnDesc::scalar("OBSERVATION_ID", Int))
            .with_column(ColumnDesc::scalar("MESSAGE", String))
            .with_column(ColumnDesc::scalar("PRIORITY", String))
            .with_column(ColumnDesc::scalar("ORIGIN", String))
            .with_column(ColumnDesc::scalar("OBJECT_ID", Int))
            .with_column(ColumnDesc::scalar("APPLICATION", String))
            .with_column(ColumnDesc::variable_array("CLI_COMMAND", String, 1))
            .with_column(ColumnDesc::variable_array("APP_PARAMS", String, 1)),

        SubTable::Source => desc
            .with_column(ColumnDesc::scalar("SOURCE_ID", Int))
            .with_column(ColumnDesc::scalar("TIME", Double).keywords(measure("s", "epoch", "UTC")))
            .with_column(ColumnDesc::scalar("INTERVAL", Double).keywords(unit("s")))
            .with_column(ColumnDesc::scalar("SPECTRAL_WINDOW_ID", Int))
            .with_column(ColumnDesc::scalar("NUM_LINES", Int))
            .with_column(ColumnDesc::scalar("NAME", String))
            .with_column(ColumnDesc::scalar("CALIBRATION_GROUP", Int))
            .with_column(ColumnDesc::scalar("CODE", String))
            .with_column(
                ColumnDesc::fixed_array("DIRECTION", Double, &[2])
                    .keywords(measure("rad", "direction", "J2000")),
            )
            .with_column(ColumnDesc::fixed_array("PROPER_MOTION", Double, &[2]).keywords(unit("rad/s")))
            .with_column(ColumnDesc::variable_array("REST_FREQUENCY", Double, 1).keywords(unit("Hz")))
            .with_column(ColumnDesc::fixed_array("POSITION", Double, &[3]).keywords(unit("m"))),
    }
}
