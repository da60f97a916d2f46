// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{get_cmd_output, synthesize_small, vistable};

#[test]
fn test_dump_uvw_byte_count() {
    let dir = TempDir::new().unwrap();
    let ms = synthesize_small(&dir);

    let cmd = vistable()
        .args(["dump-column", &format!("{}", ms.display()), "UVW", "--bytes-only"])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    // 6 rows of 3 doubles.
    assert!(stdout.contains("Read 144 bytes from UVW"), "{stdout}");
}

#[test]
fn test_dump_antenna1_values() {
    let dir = TempDir::new().unwrap();
    let ms = synthesize_small(&dir);

    let cmd = vistable()
        .args(["dump-column", &format!("{}", ms.display()), "ANTENNA1"])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("ANTENNA1 (Int): [0, 0, 1, 0, 0, 1]"), "{stdout}");

    // Too many rows are clamped to those available.
    #[rustfmt::skip]
    let cmd = vistable()
        .args([
            "dump-column", &format!("{}", ms.display()), "ANTENNA2",
            "--start-row", "4",
            "--num-rows", "10",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Read 8 bytes from ANTENNA2"), "{stdout}");
    assert!(stdout.contains("ANTENNA2 (Int): [2, 2]"), "{stdout}");
}

#[test]
fn test_dump_sub_table_column() {
    let dir = TempDir::new().unwrap();
    let ms = synthesize_small(&dir);

    let cmd = vistable()
        .args([
            "dump-column",
            &format!("{}", ms.display()),
            "DISH_DIAMETER",
            "--table",
            "antenna",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("DISH_DIAMETER (Double): [1, 1, 1]"), "{stdout}");
}

#[test]
fn test_dump_column_errors() {
    let dir = TempDir::new().unwrap();
    let ms = synthesize_small(&dir);

    let cmd = vistable()
        .args(["dump-column", &format!("{}", ms.display()), "NOT_A_COLUMN"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Column 'NOT_A_COLUMN' not found"), "{stderr}");

    #[rustfmt::skip]
    let cmd = vistable()
        .args([
            "dump-column", &format!("{}", ms.display()), "ANTENNA1",
            "--start-row", "6",
            "--num-rows", "1",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("out of range"), "{stderr}");

    let cmd = vistable()
        .args([
            "dump-column",
            &format!("{}", ms.display()),
            "NAME",
            "--table",
            "ANTENNA",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Can't copy elements of type String"), "{stderr}");

    let cmd = vistable()
        .args([
            "dump-column",
            &format!("{}", ms.display()),
            "NAME",
            "--table",
            "NOT_A_TABLE",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Unknown sub-table"), "{stderr}");
}
