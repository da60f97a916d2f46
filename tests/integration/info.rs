// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{get_cmd_output, synthesize_small, vistable};

#[test]
fn test_info() {
    let dir = TempDir::new().unwrap();
    let ms = synthesize_small(&dir);

    let cmd = vistable()
        .args(["info", &format!("{}", ms.display())])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Stations:          3"), "{stdout}");
    assert!(stdout.contains("Channels:          2"), "{stdout}");
    assert!(stdout.contains("Polarisations:     4"), "{stdout}");
    assert!(stdout.contains("Rows:              6"), "{stdout}");
    assert!(stdout.contains("autos: false, crosses: true"), "{stdout}");
    assert!(stdout.contains("Time range (MJD):"), "{stdout}");
}

#[test]
fn test_info_on_missing_ms() {
    let dir = TempDir::new().unwrap();
    let cmd = vistable()
        .args(["info", &format!("{}", dir.path().join("nothing.ms").display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error:"), "{stderr}");
}
