use std::fs;

use crate::config::parse;
use crate::params::model::{pri_period, GroupType, TimeType};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn option_separators_and_dashes_are_interchangeable() {
    let (pars, cfg) = parse(
        "outbreaksim",
        &args(&["--tbar=1.5", "kappa:2", "--lambda", "0.5", "mu", "2", "npaths=5"]),
    )
    .unwrap()
    .expect("not a help request");

    assert_eq!(pars.tbar, 1.5);
    assert_eq!(pars.kappa, 2.0);
    assert_eq!(pars.lambda, 0.5);
    assert_eq!(pars.mu, 2.0);
    assert_eq!(cfg.npaths, 5);
}

#[test]
fn flags_toggle_model_switches() {
    let (pars, cfg) = parse(
        "outbreaksim",
        &args(&[
            "--group_log_attendees",
            "--pri_no_alt_period",
            "--pri_no_main_period_int",
            "--time_pri_infectious",
            "--ninfhist",
            "--nimax", "100",
            "--seed", "99",
        ]),
    )
    .unwrap()
    .expect("not a help request");

    assert_eq!(pars.grouptype, GroupType::LogAttendees);
    assert_eq!(pars.timetype, TimeType::PriInfectious);
    assert_eq!(pars.pricommpertype & pri_period::ALT, 0);
    assert_eq!(pars.pricommpertype & pri_period::MAIN_INT, 0);
    assert_ne!(pars.pricommpertype & pri_period::MAIN, 0);
    assert_eq!(pars.nimax, 100);
    assert!(cfg.ninfhist);
    assert_eq!(cfg.seed, 99);
}

#[test]
fn nsetsperthread_default_depends_on_nthreads() {
    let (_, cfg) = parse("x", &args(&["--nthreads", "4"])).unwrap().unwrap();
    assert_eq!(cfg.nsetsperthread, 100);

    let (_, cfg) = parse("x", &args(&[])).unwrap().unwrap();
    assert_eq!(cfg.nsetsperthread, 1);

    let (_, cfg) = parse("x", &args(&["--nthreads", "4", "--nsetsperthread", "7"]))
        .unwrap()
        .unwrap();
    assert_eq!(cfg.nsetsperthread, 7);
}

#[test]
fn unknown_option_is_fatal() {
    assert!(parse("x", &args(&["--no_such_option"])).is_err());
    assert!(parse("x", &args(&["--tbar", "not-a-number"])).is_err());
    assert!(parse("x", &args(&["--tbar"])).is_err()); // missing argument
}

#[test]
fn help_short_circuits() {
    assert!(parse("x", &args(&["--help"])).unwrap().is_none());
}

#[test]
fn nested_config_files_are_read_depth_first() {
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("inner.cfg");
    let outer = dir.path().join("outer.cfg");

    fs::write(&inner, "kappa 3.0   # comment after values\n").unwrap();
    fs::write(
        &outer,
        format!(
            "# a configuration file\ntbar = 2.5\nconfig {}\nlambda: 0.25\n",
            inner.display()
        ),
    )
    .unwrap();

    let (pars, _) = parse(
        "x",
        &args(&["--config", outer.to_str().unwrap(), "--npaths", "9"]),
    )
    .unwrap()
    .unwrap();

    assert_eq!(pars.tbar, 2.5);
    assert_eq!(pars.kappa, 3.0);
    assert_eq!(pars.lambda, 0.25);
}

#[test]
fn missing_config_file_is_fatal() {
    assert!(parse("x", &args(&["--config", "/no/such/file.cfg"])).is_err());
}
