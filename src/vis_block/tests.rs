// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use rand::{rngs::StdRng, SeedableRng};

use super::*;
use crate::{c32, c64};

fn dims() -> VisBlockDims {
    VisBlockDims {
        num_times: 2,
        num_channels: 3,
        num_stations: 4,
    }
}

#[test]
fn test_new_block_is_zeroed() {
    let block: VisBlock<Jones<f32>> = VisBlock::new(dims());
    assert_eq!(block.num_baselines(), 6);
    assert_eq!(block.num_pols(), 4);
    assert_eq!(block.cross_tfb().dim(), (2, 3, 6));
    assert_eq!(block.autos_tfs().dim(), (2, 3, 4));
    assert_eq!(block.uu_tb().dim(), (2, 6));
    assert!(block.cross_tfb().iter().all(|j| *j == Jones::default()));
    assert_eq!(block.baseline_station1(), &[0, 0, 0, 1, 1, 2]);
    assert_eq!(block.baseline_station2(), &[1, 2, 3, 2, 3, 3]);
}

#[test]
fn test_from_parts_layout() {
    let d = dims();
    let cross: Vec<c64> = (0..2 * 3 * 6).map(|i| c64::new(i as f64, 0.0)).collect();
    let uu: Vec<f64> = (0..12).map(|i| i as f64).collect();
    let block = VisBlock::from_parts(
        d,
        cross,
        vec![],
        uu.clone(),
        uu.clone(),
        uu,
    )
    .unwrap();
    // Baseline is the fastest-varying dimension, then channel, then time.
    assert_eq!(block.cross_tfb()[(0, 0, 1)], c64::new(1.0, 0.0));
    assert_eq!(block.cross_tfb()[(0, 1, 0)], c64::new(6.0, 0.0));
    assert_eq!(block.cross_tfb()[(1, 0, 0)], c64::new(18.0, 0.0));
    assert_abs_diff_eq!(block.uu_tb()[(1, 2)], 8.0);
    assert!(block.autos_tfs().iter().all(|a| *a == c64::default()));
}

#[test]
fn test_from_parts_rejects_bad_lengths() {
    let d = dims();
    let result = VisBlock::<c32>::from_parts(
        d,
        vec![c32::default(); 35],
        vec![],
        vec![0.0; 12],
        vec![0.0; 12],
        vec![0.0; 12],
    );
    assert!(matches!(
        result,
        Err(VisBlockError::InvalidArgument {
            expected: 36,
            got: 35,
            ..
        })
    ));

    let result = VisBlock::<c32>::from_parts(
        d,
        vec![c32::default(); 36],
        vec![c32::default(); 5],
        vec![0.0; 12],
        vec![0.0; 12],
        vec![0.0; 12],
    );
    assert!(matches!(result, Err(VisBlockError::InvalidArgument { .. })));

    let result = VisBlock::<c32>::from_parts(
        d,
        vec![c32::default(); 36],
        vec![c32::default(); 24],
        vec![0.0; 12],
        vec![0.0; 11],
        vec![0.0; 12],
    );
    assert!(matches!(
        result,
        Err(VisBlockError::InvalidArgument {
            what: "vv buffer",
            ..
        })
    ));
}

#[test]
fn test_from_stokes_i() {
    let s = c32::new(3.0, 4.0);
    assert_eq!(<c32 as Visibility>::from_stokes_i(s), s);
    let j = <Jones<f32> as Visibility>::from_stokes_i(s);
    assert_eq!(j.pols(), &[s, c32::default(), c32::default(), s]);
}

#[test]
fn test_system_noise_is_seeded_and_cross_only() {
    let mut block1: VisBlock<Jones<f64>> = VisBlock::new(dims());
    let mut block2: VisBlock<Jones<f64>> = VisBlock::new(dims());
    add_system_noise(&mut block1, 2.0, &mut StdRng::seed_from_u64(7)).unwrap();
    add_system_noise(&mut block2, 2.0, &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(block1.cross_tfb(), block2.cross_tfb());
    assert!(block1.cross_tfb().iter().any(|j| *j != Jones::default()));
    assert!(block1.autos_tfs().iter().all(|j| *j == Jones::default()));

    // The sample standard deviation should be close to the requested RMS.
    let mut block: VisBlock<c64> = VisBlock::new(VisBlockDims {
        num_times: 10,
        num_channels: 100,
        num_stations: 10,
    });
    add_system_noise(&mut block, 2.0, &mut StdRng::seed_from_u64(1)).unwrap();
    let n = block.cross_tfb().len() as f64;
    let var = block.cross_tfb().iter().map(|c| c.re * c.re).sum::<f64>() / n;
    assert_abs_diff_eq!(var.sqrt(), 2.0, epsilon = 0.1);
}

#[test]
fn test_system_noise_rejects_bad_rms() {
    let mut block: VisBlock<c32> = VisBlock::new(dims());
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        add_system_noise(&mut block, -1.0, &mut rng),
        Err(VisBlockError::BadNoiseRms(_))
    ));
    assert!(matches!(
        add_system_noise(&mut block, f64::NAN, &mut rng),
        Err(VisBlockError::BadNoiseRms(_))
    ));
    add_system_noise(&mut block, 0.0, &mut rng).unwrap();
    assert!(block.cross_tfb().iter().all(|c| *c == c32::default()));
}
