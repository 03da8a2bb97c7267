use crate::params::model::{ModelParams, TimeType};
use crate::rng::SimRng;
use crate::sim::Walker;
use crate::stats::SummaryStats;
use crate::trace::CtLog;

/// A record that skips the solver: every field the walker reads is set
/// directly.
fn manual_pars() -> ModelParams {
    ModelParams {
        tbar: 1.0,
        kappa: f64::INFINITY,
        lambda: 1.0,
        p: 0.3,
        pinf: 1.0,
        tmax: 50.0,
        ..Default::default()
    }
}

fn newinf_sum(stats: &SummaryStats) -> u64 {
    (-stats.shift()..stats.npos()).map(|b| stats.newinf_at(b) as u64).sum()
}

#[test]
fn zero_event_trivial_path() {
    // One primary, no transmission events, a fixed unit communicable period.
    let pars = ModelParams {
        lambda: 0.0,
        p: 0.5,
        tmax: 10.0,
        ..manual_pars()
    };

    let mut walker = Walker::from_params(&pars);
    let mut stats = SummaryStats::from_params(&pars, false);
    let mut rng = SimRng::substream(11, 0);

    for _ in 0..20 {
        stats.path_init();
        walker.run_path(&mut rng, &mut stats, None);

        assert!(stats.extinction);
        assert_eq!(stats.rsum, 0);
        assert_eq!(stats.nindividuals, 1);
        assert_eq!(newinf_sum(&stats), 0);
        assert_eq!(stats.nimaxedoutmintimeindex, i32::MAX);
        assert!((stats.extinction_time - 1.0).abs() < 1e-12);

        // The primary is infectious over [0, 1]: a contiguous block of ones.
        assert_eq!(stats.inf_at(0), 1);
        assert_eq!(stats.inf_at(1), 1); // the period ends exactly on the bin boundary
        for b in 2..stats.npos() {
            assert_eq!(stats.inf_at(b), 0);
        }
    }
}

#[test]
fn extinct_paths_balance_infections_against_rsum() {
    // Subcritical cascade: R0 = lambda * tbar * mu ~ 0.84.
    let pars = ModelParams {
        lambda: 0.8,
        p: 0.1,
        nstart: 2,
        kappa: 2.0,
        ..manual_pars()
    };

    let mut walker = Walker::from_params(&pars);
    let mut stats = SummaryStats::from_params(&pars, false);
    let mut rng = SimRng::substream(23, 0);

    let mut n_ext = 0;
    for _ in 0..200 {
        stats.path_init();
        walker.run_path(&mut rng, &mut stats, None);

        assert_eq!(stats.nimaxedoutmintimeindex, i32::MAX); // no cap configured
        assert!(stats.nindividuals >= pars.nstart);

        if stats.extinction {
            n_ext += 1;
            // Every drawn infection was accepted, so the timeline total must
            // equal the offspring sum.
            assert_eq!(newinf_sum(&stats), stats.rsum as u64);
            assert!(stats.extinction_time > 0.0);
        }
    }
    assert!(n_ext > 100, "subcritical run should mostly go extinct ({n_ext}/200)");
}

#[test]
fn offspring_histogram_counts_individuals() {
    let pars = ModelParams {
        lambda: 0.8,
        p: 0.1,
        ..manual_pars()
    };

    let mut walker = Walker::from_params(&pars);
    let mut stats = SummaryStats::from_params(&pars, true);
    let mut rng = SimRng::substream(29, 0);

    let mut individuals = 0u64;
    for _ in 0..50 {
        stats.path_init();
        walker.run_path(&mut rng, &mut stats, None);
        individuals += stats.nindividuals as u64;
    }

    let hist = stats.ngeninfs().expect("histogram enabled");
    assert_eq!(hist.iter().sum::<u64>(), individuals);
    assert!(hist[0] > 0, "some individuals generate no offspring");
}

#[test]
fn nimax_cap_marks_paths_non_extinct() {
    // 500 primaries against a cap of 20 new infections per bin: the first
    // bin overflows essentially immediately, with an infinite time horizon.
    let pars = ModelParams {
        lambda: 0.5,
        p: 0.0, // every event infects exactly one susceptible
        nstart: 500,
        nimax: 20,
        tmax: f64::INFINITY,
        ..manual_pars()
    };

    let mut walker = Walker::from_params(&pars);
    let mut stats = SummaryStats::from_params(&pars, false);
    let mut rng = SimRng::substream(31, 0);

    for _ in 0..20 {
        stats.path_init();
        walker.run_path(&mut rng, &mut stats, None);

        assert!(!stats.extinction);
        assert!(stats.maxed_out());
        assert!(stats.nimaxedoutmintimeindex >= 0 && stats.nimaxedoutmintimeindex <= 1);
    }
}

#[test]
fn infinite_tmax_grows_the_positive_window() {
    // A long fixed latent period pushes bins far to the right of the initial
    // allocation.
    let pars = ModelParams {
        lambda: 0.0,
        lbar: 100.0,
        kappal: f64::INFINITY,
        tmax: f64::INFINITY,
        ..manual_pars()
    };

    let mut walker = Walker::from_params(&pars);
    let mut stats = SummaryStats::from_params(&pars, false);
    let mut rng = SimRng::substream(37, 0);

    stats.path_init();
    walker.run_path(&mut rng, &mut stats, None);

    assert!(stats.npos() > 100);
    assert_eq!(stats.inf_at(100), 1); // alive over [100, 101]
    assert_eq!(stats.inf_at(101), 1);
    assert_eq!(stats.inf_at(99), 1);
    assert_eq!(stats.inf_at(0), 1);
}

#[test]
fn shifted_origin_grows_negative_bins() {
    // Time origin where the primary becomes infectious: a fixed latent
    // period of 2.5 lives entirely in negative bins.
    let pars = ModelParams {
        lambda: 0.0,
        lbar: 2.5,
        kappal: f64::INFINITY,
        tmax: 10.0,
        timetype: TimeType::PriInfectious,
        ..manual_pars()
    };

    let mut walker = Walker::from_params(&pars);
    let mut stats = SummaryStats::from_params(&pars, false);
    let mut rng = SimRng::substream(41, 0);

    stats.path_init();
    walker.run_path(&mut rng, &mut stats, None);

    assert!(stats.shift() >= 3, "timelineshift must cover ceil(latent)");
    assert_eq!(stats.inf_at(-3), 1);
    assert_eq!(stats.inf_at(-1), 1);
    assert_eq!(stats.inf_at(0), 1);
    assert_eq!(stats.inf_at(1), 1); // communicable period ends at exactly 1
    assert_eq!(stats.inf_at(2), 0);
    assert!((stats.extinction_time - 1.0).abs() < 1e-12);
}

#[test]
fn positive_tests_feed_timeline_and_tracing_log() {
    // Interruptions always happen, are always shorter on average, and always
    // test positive two bins later.
    let pars = ModelParams {
        lambda: 0.4,
        p: 0.2,
        tbar: 4.0,
        kappa: 2.0,
        pit: 1.0,
        itbar: 1.0,
        kappait: 1.0,
        ttpr: 1.0,
        tdeltat: 2.0,
        nstart: 3,
        ..manual_pars()
    };

    let mut walker = Walker::from_params(&pars);
    let mut stats = SummaryStats::from_params(&pars, false);
    let mut ct = CtLog::new();
    let mut rng = SimRng::substream(43, 0);

    let mut saw_entries = false;
    for _ in 0..50 {
        stats.path_init();
        ct.path_init();
        walker.run_path(&mut rng, &mut stats, Some(&mut ct));

        let postest_total: u64 =
            (-stats.shift()..stats.npos()).map(|b| stats.newpostest_at(b) as u64).sum();

        // Every timeline test corresponds to a logged entry; the log also
        // carries tests of individuals without transmission events.
        assert!(ct.len() as u64 >= postest_total);
        if !ct.is_empty() {
            saw_entries = true;

            let mut buf = Vec::new();
            ct.write_path(stats.nimaxedoutmintimeindex, &mut buf).unwrap();
            let records = super::util::decode_ct(&buf);
            assert!(records.windows(2).all(|w| w[0][0] <= w[1][0]), "sorted by test time");

            let traced: u64 = records.iter().map(|r| r[4] as u64).sum();
            assert!(traced < records.len() as u64, "roots cannot be traced");
        }
    }
    assert!(saw_entries, "interruptions with ttpr = 1 must log tests");
}
