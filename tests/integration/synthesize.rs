// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use indoc::formatdoc;
use tempfile::TempDir;

use crate::{get_cmd_output, synthesize_small, vistable};

#[test]
fn test_synthesize_writes_a_measurement_set() {
    let dir = TempDir::new().unwrap();
    let ms = synthesize_small(&dir);
    assert!(ms.join("table.dat").exists());
    assert!(ms.join("ANTENNA").join("table.dat").exists());
}

#[test]
fn test_synthesize_dry_run() {
    let dir = TempDir::new().unwrap();
    let ms = dir.path().join("dry.ms");
    let cmd = vistable()
        .args([
            "synthesize",
            "--dry-run",
            "-o",
            &format!("{}", ms.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
    assert!(!ms.exists());
}

#[test]
fn test_synthesize_arg_file_and_save_toml() {
    let dir = TempDir::new().unwrap();
    let ms = dir.path().join("from_file.ms");
    let arg_file = dir.path().join("args.toml");
    fs::write(
        &arg_file,
        formatdoc! {r#"
            [synthesize]
            output = "{}"
            num_stations = 4
            num_channels = 8
        "#, ms.display()},
    )
    .unwrap();
    let saved = dir.path().join("saved.toml");

    // The CLI overrides the file.
    #[rustfmt::skip]
    let cmd = vistable()
        .args([
            "synthesize",
            &format!("{}", arg_file.display()),
            "--num-channels", "3",
            "--dry-run",
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));

    let saved = fs::read_to_string(saved).unwrap();
    assert!(saved.contains("[synthesize]"), "{saved}");
    assert!(saved.contains("num_stations = 4"), "{saved}");
    assert!(saved.contains("num_channels = 3"), "{saved}");
}

#[test]
fn test_synthesize_bad_num_pols() {
    let dir = TempDir::new().unwrap();
    #[rustfmt::skip]
    let cmd = vistable()
        .args([
            "synthesize",
            "-o", &format!("{}", dir.path().join("bad.ms").display()),
            "--num-pols", "2",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("must be 1 or 4"), "{stderr}");
}

#[test]
fn test_synthesize_unknown_arg_file_type() {
    let dir = TempDir::new().unwrap();
    let arg_file = dir.path().join("args.yaml");
    fs::write(&arg_file, "num_stations: 3\n").unwrap();
    let cmd = vistable()
        .args(["synthesize", &format!("{}", arg_file.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("recognised file extension"), "{stderr}");
}

#[test]
fn test_synthesize_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let ms = synthesize_small(&dir);
    let cmd = vistable()
        .args(["synthesize", "-o", &format!("{}", ms.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("already exists"), "{stderr}");
}
