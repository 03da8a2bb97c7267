use crate::rng::SimRng;

#[test]
fn substreams_are_reproducible_and_distinct() {
    let mut a = SimRng::substream(42, 3);
    let mut b = SimRng::substream(42, 3);
    let mut c = SimRng::substream(42, 4);

    let xs: Vec<f64> = (0..64).map(|_| a.uniform_pu01()).collect();
    let ys: Vec<f64> = (0..64).map(|_| b.uniform_pu01()).collect();
    let zs: Vec<f64> = (0..64).map(|_| c.uniform_pu01()).collect();

    assert_eq!(xs, ys, "same (seed, substream) must replay identically");
    assert_ne!(xs, zs, "distinct substreams must diverge");
}

#[test]
fn uniform_pu01_is_half_open_above_zero() {
    let mut rng = SimRng::substream(1, 0);
    for _ in 0..10_000 {
        let u = rng.uniform_pu01();
        assert!(u > 0.0 && u <= 1.0);
    }
}

#[test]
fn poisson_zero_rate_yields_zero() {
    let mut rng = SimRng::substream(7, 0);
    for _ in 0..100 {
        assert_eq!(rng.poisson(0.0), 0);
    }
}

#[test]
fn poisson_mean_tracks_rate() {
    let mut rng = SimRng::substream(7, 1);
    let n = 50_000;
    let total: u64 = (0..n).map(|_| rng.poisson(3.5) as u64).sum();
    let mean = total as f64 / n as f64;
    assert!((mean - 3.5).abs() < 0.05, "poisson mean {mean}");
}

#[test]
fn gamma_infinite_shape_degenerates() {
    let mut rng = SimRng::substream(7, 2);
    assert_eq!(rng.gamma(f64::INFINITY, 2.5), 2.5);
}

#[test]
fn gamma_mean_tracks_shape_times_scale() {
    let mut rng = SimRng::substream(7, 3);
    let n = 50_000;
    let total: f64 = (0..n).map(|_| rng.gamma(2.0, 1.5)).sum();
    let mean = total / n as f64;
    assert!((mean - 3.0).abs() < 0.05, "gamma mean {mean}");
}

#[test]
fn logarithmic_p_zero_is_always_one() {
    let mut rng = SimRng::substream(7, 4);
    for _ in 0..100 {
        assert_eq!(rng.logarithmic(0.0), 1);
    }
}

#[test]
fn logarithmic_mean_matches_identity() {
    let p: f64 = 0.5;
    let expected = -p / ((1.0 - p) * (1.0 - p).ln()); // 1.4427...
    let mut rng = SimRng::substream(7, 5);

    let n = 100_000;
    let total: u64 = (0..n).map(|_| rng.logarithmic(p) as u64).sum();
    let mean = total as f64 / n as f64;
    assert!((mean - expected).abs() < 0.03, "logarithmic mean {mean} vs {expected}");
}

#[test]
fn truncated_logarithmic_never_below_two() {
    let mut rng = SimRng::substream(7, 6);
    for _ in 0..10_000 {
        assert!(rng.logarithmic_trunc2(0.4) >= 2);
    }
    assert_eq!(rng.logarithmic_trunc2(0.0), 2);
}

#[test]
fn binomial_edges() {
    let mut rng = SimRng::substream(7, 7);
    assert_eq!(rng.binomial(10, 0.0), 0);
    assert_eq!(rng.binomial(10, 1.0), 10);
    assert_eq!(rng.binomial(0, 0.5), 0);

    let n = 50_000;
    let total: u64 = (0..n).map(|_| rng.binomial(10, 0.3) as u64).sum();
    let mean = total as f64 / n as f64;
    assert!((mean - 3.0).abs() < 0.05, "binomial mean {mean}");
}
