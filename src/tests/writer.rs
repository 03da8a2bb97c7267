use crate::output::FrameShape;
use crate::params::model::{ModelParams, TimeType};
use crate::rng::SimRng;
use crate::sim::Walker;
use crate::stats::SummaryStats;

use super::util::decode_frames;

fn fixed_pars() -> ModelParams {
    ModelParams {
        tbar: 1.0,
        kappa: f64::INFINITY,
        lambda: 0.0,
        p: 0.5,
        pinf: 1.0,
        tmax: 10.0,
        ..Default::default()
    }
}

fn run_one(pars: &ModelParams, seed: u64) -> SummaryStats {
    let mut walker = Walker::from_params(pars);
    let mut stats = SummaryStats::from_params(pars, false);
    let mut rng = SimRng::substream(seed, 0);
    stats.path_init();
    walker.run_path(&mut rng, &mut stats, None);
    stats
}

#[test]
fn reg_frame_round_trips() {
    let pars = fixed_pars();
    let stats = run_one(&pars, 3);
    let shape = FrameShape::select(&pars);
    assert_eq!(shape, FrameShape::Reg);

    let mut buf = Vec::new();
    shape.write_path(&stats, &mut buf).unwrap();

    let frames = decode_frames(&buf, shape);
    assert_eq!(frames.len(), 1);
    let f = &frames[0];

    // Trailing zero-inf bins are stripped: [0, 1] survives out of 11 bins.
    assert_eq!(f.nbins, 2);
    assert_eq!(f.negbins, 0);
    assert_eq!(f.inf, vec![1, 1]);
    assert_eq!(f.newinf, vec![0, 0]);
    assert_eq!(f.maxedout, i32::MAX as u32);
    assert_eq!(f.extinction, 1); // floor(extinction_time) = floor(1.0)

    // Re-encoding the same path is byte-identical (trimming is idempotent).
    let mut again = Vec::new();
    shape.write_path(&stats, &mut again).unwrap();
    assert_eq!(buf, again);
    assert_eq!(buf.len(), 12 + 2 * 2 * 4);
}

#[test]
fn reltime_frame_carries_negative_bins() {
    let pars = ModelParams {
        lbar: 2.5,
        kappal: f64::INFINITY,
        timetype: TimeType::PriInfectious,
        ..fixed_pars()
    };
    let stats = run_one(&pars, 5);
    let shape = FrameShape::select(&pars);
    assert_eq!(shape, FrameShape::Reltime);

    let mut buf = Vec::new();
    shape.write_path(&stats, &mut buf).unwrap();
    let frames = decode_frames(&buf, shape);
    let f = &frames[0];

    // Bins -3..=1 all hold one infectious individual.
    assert_eq!(f.negbins, 3);
    assert_eq!(f.nbins, 5);
    assert_eq!(f.inf, vec![1, 1, 1, 1, 1]);
    assert_eq!(f.newinf, vec![0; 5]);
    assert_eq!(f.extinction, 1);
    assert_eq!(buf.len(), 16 + 5 * 2 * 4);
}

#[test]
fn non_extinct_paths_write_the_sentinel_extinction_value() {
    let pars = ModelParams {
        tmax: 0.5, // the primary is still infectious at tmax
        ..fixed_pars()
    };
    let stats = run_one(&pars, 7);
    assert!(!stats.extinction);

    let mut buf = Vec::new();
    FrameShape::Reg.write_path(&stats, &mut buf).unwrap();
    let f = &decode_frames(&buf, FrameShape::Reg)[0];
    assert_eq!(f.extinction, -i32::MAX);
}

#[test]
fn postest_shape_appends_third_timeline() {
    let pars = ModelParams {
        lambda: 0.4,
        tbar: 4.0,
        kappa: 2.0,
        pit: 1.0,
        itbar: 1.0,
        kappait: 1.0,
        ttpr: 1.0,
        tdeltat: 2.0,
        tmax: 50.0,
        nstart: 4,
        ..fixed_pars()
    };
    assert!(pars.has_postest());
    let shape = FrameShape::select(&pars);
    assert_eq!(shape, FrameShape::RegPostest);

    let stats = run_one(&pars, 11);
    let mut buf = Vec::new();
    shape.write_path(&stats, &mut buf).unwrap();

    let f = &decode_frames(&buf, shape)[0];
    assert_eq!(f.newpostest.len(), f.nbins as usize);
    assert_eq!(buf.len(), 12 + f.nbins as usize * 3 * 4);

    // The decoded bins must reproduce the accumulator's window.
    for (i, &v) in f.inf.iter().enumerate() {
        assert_eq!(v, stats.inf_at(i as i32));
    }
    for (i, &v) in f.newpostest.iter().enumerate() {
        assert_eq!(v, stats.newpostest_at(i as i32));
    }
}
