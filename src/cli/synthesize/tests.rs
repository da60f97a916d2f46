// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use serial_test::serial;
use tempfile::{Builder, TempDir};

use super::*;
use crate::{constants::DEFAULT_SEED, MeasurementSet};

fn arg_file(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut f = Builder::new().suffix(suffix).tempfile().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

fn with_cli(synth_args: SynthesizeCliArgs) -> SynthesizeArgs {
    SynthesizeArgs {
        args_file: None,
        synth_args,
    }
}

#[test]
fn test_merge_prefers_cli_args() {
    let file = arg_file(
        indoc! {r#"
            [synthesize]
            num_stations = 3
            num_channels = 5
            autos = true
            observer = "from the file"
        "#},
        ".toml",
    );
    let args = SynthesizeArgs {
        args_file: Some(file.path().to_path_buf()),
        synth_args: SynthesizeCliArgs {
            num_stations: Some(6),
            observer: Some("from the CLI".to_string()),
            ..Default::default()
        },
    };

    let merged = args.merge().unwrap();
    assert!(merged.args_file.is_none());
    assert_eq!(merged.synth_args.num_stations, Some(6));
    assert_eq!(merged.synth_args.num_channels, Some(5));
    assert!(merged.synth_args.autos);
    assert!(!merged.synth_args.no_cross);
    assert_eq!(merged.synth_args.observer.as_deref(), Some("from the CLI"));
    assert!(merged.synth_args.num_times.is_none());
}

#[test]
fn test_merge_json_arg_file() {
    let file = arg_file(
        r#"{"synthesize": {"num_times": 7, "seed": "42", "precision": "double"}}"#,
        ".json",
    );
    let args = SynthesizeArgs {
        args_file: Some(file.path().to_path_buf()),
        synth_args: SynthesizeCliArgs::default(),
    };

    let params = args.merge().unwrap().parse().unwrap();
    assert_eq!(params.num_times, 7);
    assert_eq!(params.seed, 42);
    assert_eq!(params.precision, Precision::Double);
}

#[test]
fn test_bad_arg_files() {
    let file = arg_file("num_stations: 3\n", ".yaml");
    let args = SynthesizeArgs {
        args_file: Some(file.path().to_path_buf()),
        synth_args: SynthesizeCliArgs::default(),
    };
    assert!(matches!(args.merge(), Err(VistableError::ArgFile(_))));

    let file = arg_file("[synthesize\nnum_stations = 3\n", ".toml");
    let args = SynthesizeArgs {
        args_file: Some(file.path().to_path_buf()),
        synth_args: SynthesizeCliArgs::default(),
    };
    assert!(matches!(args.merge(), Err(VistableError::ArgFile(_))));
}

#[test]
fn test_parse_defaults() {
    let params = SynthesizeArgs::default().parse().unwrap();

    assert_eq!(params.output, PathBuf::from(DEFAULT_OUTPUT));
    assert_eq!(params.ms.num_stations, DEFAULT_NUM_STATIONS);
    assert_eq!(params.ms.num_channels, DEFAULT_NUM_CHANNELS);
    assert_eq!(params.ms.num_pols, 4);
    assert!(!params.ms.write_autocorr);
    assert!(params.ms.write_crosscorr);
    assert_eq!(params.ms.app_name, "vistable");
    assert_abs_diff_eq!(params.ms.ref_freq_hz, 150e6);
    assert_abs_diff_eq!(params.ms.chan_width_hz, 40e3);
    assert_abs_diff_eq!(params.ms.phase_centre_dec_rad, (-27.0f64).to_radians());
    assert_eq!(params.precision, Precision::Single);
    assert!(!params.full_pol);
    assert_eq!(params.num_times, DEFAULT_NUM_TIMES);
    assert_eq!(params.block_times, DEFAULT_BLOCK_TIMES);
    assert_abs_diff_eq!(params.time_inc_sec, 8.0);
    // The integration time follows the time resolution.
    assert_abs_diff_eq!(params.time_average_sec, 8.0);
    assert_eq!(params.seed, DEFAULT_SEED);
    assert!(params.settings.starts_with("[synthesize]"));
}

#[test]
fn test_parse_time_average_follows_time_res() {
    let params = with_cli(SynthesizeCliArgs {
        time_res: Some(2.0),
        ..Default::default()
    })
    .parse()
    .unwrap();
    assert_abs_diff_eq!(params.time_inc_sec, 2.0);
    assert_abs_diff_eq!(params.time_average_sec, 2.0);
}

#[test]
fn test_parse_rejects_bad_args() {
    let result = with_cli(SynthesizeCliArgs {
        num_pols: Some(2),
        ..Default::default()
    })
    .parse();
    assert!(matches!(result, Err(SynthesizeArgsError::BadNumPols(2))));

    let result = with_cli(SynthesizeCliArgs {
        num_pols: Some(1),
        full_pol: true,
        ..Default::default()
    })
    .parse();
    assert!(matches!(
        result,
        Err(SynthesizeArgsError::FullPolNeedsFourPols)
    ));

    let result = with_cli(SynthesizeCliArgs {
        no_cross: true,
        ..Default::default()
    })
    .parse();
    assert!(matches!(result, Err(SynthesizeArgsError::NoCorrelations)));

    let result = with_cli(SynthesizeCliArgs {
        num_stations: Some(1),
        ..Default::default()
    })
    .parse();
    assert!(matches!(
        result,
        Err(SynthesizeArgsError::TooFewStationsForCrosses)
    ));

    // A single station is fine when only autos are wanted.
    let result = with_cli(SynthesizeCliArgs {
        num_stations: Some(1),
        autos: true,
        no_cross: true,
        ..Default::default()
    })
    .parse();
    assert!(result.is_ok());

    let result = with_cli(SynthesizeCliArgs {
        num_channels: Some(0),
        ..Default::default()
    })
    .parse();
    assert!(matches!(result, Err(SynthesizeArgsError::ZeroChannels)));

    let result = with_cli(SynthesizeCliArgs {
        time_res: Some(0.0),
        ..Default::default()
    })
    .parse();
    assert!(matches!(
        result,
        Err(SynthesizeArgsError::NotPositive {
            arg: "time-res",
            ..
        })
    ));

    let result = with_cli(SynthesizeCliArgs {
        dec: Some(95.0),
        ..Default::default()
    })
    .parse();
    assert!(matches!(result, Err(SynthesizeArgsError::BadDec(_))));

    let result = with_cli(SynthesizeCliArgs {
        noise_rms: Some(-1.0),
        ..Default::default()
    })
    .parse();
    assert!(matches!(result, Err(SynthesizeArgsError::NegativeNoise(_))));

    let result = with_cli(SynthesizeCliArgs {
        precision: Some("quad".to_string()),
        ..Default::default()
    })
    .parse();
    assert!(matches!(result, Err(SynthesizeArgsError::BadPrecision(_))));

    let result = with_cli(SynthesizeCliArgs {
        seed: Some("abc".to_string()),
        ..Default::default()
    })
    .parse();
    assert!(matches!(
        result,
        Err(SynthesizeArgsError::Params(ParamsError::BadSeed(_)))
    ));
}

#[test]
fn test_precision_is_case_insensitive() {
    let params = with_cli(SynthesizeCliArgs {
        precision: Some("Double".to_string()),
        ..Default::default()
    })
    .parse()
    .unwrap();
    assert_eq!(params.precision, Precision::Double);
}

fn small_args(dir: &TempDir) -> SynthesizeArgs {
    with_cli(SynthesizeCliArgs {
        output: Some(dir.path().join("small.ms")),
        num_stations: Some(3),
        num_channels: Some(2),
        num_times: Some(2),
        ..Default::default()
    })
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let args = small_args(&dir);
    args.run(true).unwrap();
    assert!(!dir.path().join("small.ms").exists());
}

#[test]
fn test_run_writes_a_measurement_set() {
    let dir = TempDir::new().unwrap();
    let args = small_args(&dir);
    args.run(false).unwrap();

    let ms = MeasurementSet::open(dir.path().join("small.ms")).unwrap();
    assert_eq!(ms.num_stations(), 3);
    assert_eq!(ms.num_channels(), 2);
    assert_eq!(ms.num_pols(), 4);
    // 3 cross-correlation baselines for each of 2 time samples.
    assert_eq!(ms.num_rows(), 6);
}

#[test]
#[serial]
fn test_default_output_is_in_the_working_directory() {
    let dir = TempDir::new().unwrap();
    let old = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = with_cli(SynthesizeCliArgs {
        num_stations: Some(2),
        num_channels: Some(1),
        num_times: Some(1),
        ..Default::default()
    })
    .run(false);
    std::env::set_current_dir(old).unwrap();

    result.unwrap();
    assert!(dir.path().join(DEFAULT_OUTPUT).join("table.dat").exists());
}
