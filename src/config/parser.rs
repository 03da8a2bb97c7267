/// ==============================================================================================
/// ================================ Configuration Parser ========================================
/// ==============================================================================================

use std::collections::VecDeque;
use std::fs;
use std::io::{Error, ErrorKind, Result};
use std::path::{Path, PathBuf};

use crate::params::model::{pri_period, GroupType, ModelParams, TimeType};

use super::options::{print_usage, RunConfig};

/// Token stream over the command line and any number of nested configuration
/// files. Included files are drained depth-first before the including stream
/// resumes.
struct Tokens {
    args: VecDeque<String>,
    files: Vec<VecDeque<String>>,
}

impl Tokens {
    fn new(args: &[String]) -> Self {
        Self {
            args: args.iter().map(|a| split_separator(a)).collect::<Vec<_>>().concat().into(),
            files: Vec::new(),
        }
    }

    /// Push a configuration file onto the inclusion stack.
    ///     `#` starts a line comment; words may be glued to their argument
    ///     with `=` or `:`.
    fn push_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::new(
                e.kind(),
                format!("config: cannot open file '{}' in read mode: {e}", path.display()),
            )
        })?;

        let mut toks = VecDeque::new();
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("");
            toks.extend(
                line.split(|c: char| c.is_whitespace() || c == '=' || c == ':')
                    .filter(|w| !w.is_empty())
                    .map(str::to_string),
            );
        }
        self.files.push(toks);
        Ok(())
    }

    fn next(&mut self) -> Option<String> {
        while let Some(top) = self.files.last_mut() {
            if let Some(tok) = top.pop_front() {
                return Some(tok);
            }
            self.files.pop();
        }
        self.args.pop_front()
    }

    /// The argument of option `name`.
    fn value(&mut self, name: &str) -> Result<String> {
        self.next().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("config: option '{name}' requires an argument"),
            )
        })
    }

    fn f64_value(&mut self, name: &str) -> Result<f64> {
        let v = self.value(name)?;
        v.parse().map_err(|_| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("config: option '{name}': cannot parse '{v}' as a real number"),
            )
        })
    }

    fn u32_value(&mut self, name: &str) -> Result<u32> {
        let v = self.value(name)?;
        v.parse().map_err(|_| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("config: option '{name}': cannot parse '{v}' as a non-negative integer"),
            )
        })
    }

    fn u64_value(&mut self, name: &str) -> Result<u64> {
        let v = self.value(name)?;
        v.parse().map_err(|_| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("config: option '{name}': cannot parse '{v}' as a non-negative integer"),
            )
        })
    }
}

/// Split a raw word at its first `=` or `:` into (name, argument) tokens.
fn split_separator(word: &str) -> Vec<String> {
    match word.find(['=', ':']) {
        Some(i) if i + 1 <= word.len() => {
            vec![word[..i].to_string(), word[i + 1..].to_string()]
        }
        _ => vec![word.to_string()],
    }
}

/// Parse the full option stream into a parameter record and run controls.
///     Returns None when `--help` was requested. Every failure carries the
///     offending option in its message and maps to a nonzero process exit.
pub fn parse(program: &str, args: &[String]) -> Result<Option<(ModelParams, RunConfig)>> {
    let mut pars = ModelParams::default();
    let mut cfg = RunConfig::default();
    let mut toks = Tokens::new(args);

    while let Some(tok) = toks.next() {
        let name = tok.trim_start_matches('-');
        match name {
            "config" => {
                let f = toks.value(name)?;
                toks.push_file(Path::new(&f))?;
            }
            "olog" => cfg.olog = Some(PathBuf::from(toks.value(name)?)),
            "elog" => cfg.elog = Some(PathBuf::from(toks.value(name)?)),

            "tbar" => pars.tbar = toks.f64_value(name)?,
            "kappa" => pars.kappa = toks.f64_value(name)?,
            "t95" => pars.t95 = toks.f64_value(name)?,
            "lambda" => pars.lambda = toks.f64_value(name)?,
            "lambdap" => pars.lambdap = toks.f64_value(name)?,
            "p" => pars.p = toks.f64_value(name)?,
            "mu" => pars.mu = toks.f64_value(name)?,
            "pinf" => pars.pinf = toks.f64_value(name)?,
            "R0" => pars.r0 = toks.f64_value(name)?,
            "lbar" => pars.lbar = toks.f64_value(name)?,
            "kappal" => pars.kappal = toks.f64_value(name)?,
            "l95" => pars.l95 = toks.f64_value(name)?,
            "q" => pars.q = toks.f64_value(name)?,
            "mbar" => pars.mbar = toks.f64_value(name)?,
            "kappaq" => pars.kappaq = toks.f64_value(name)?,
            "m95" => pars.m95 = toks.f64_value(name)?,
            "pit" => pars.pit = toks.f64_value(name)?,
            "itbar" => pars.itbar = toks.f64_value(name)?,
            "kappait" => pars.kappait = toks.f64_value(name)?,
            "it95" => pars.it95 = toks.f64_value(name)?,
            "pim" => pars.pim = toks.f64_value(name)?,
            "imbar" => pars.imbar = toks.f64_value(name)?,
            "kappaim" => pars.kappaim = toks.f64_value(name)?,
            "im95" => pars.im95 = toks.f64_value(name)?,
            "ttpr" => pars.ttpr = toks.f64_value(name)?,
            "mtpr" => pars.mtpr = toks.f64_value(name)?,
            "tdeltat" => pars.tdeltat = toks.f64_value(name)?,
            "tmax" => pars.tmax = toks.f64_value(name)?,

            "group_log_attendees_plus_1" => pars.grouptype = GroupType::LogAttendeesPlus1,
            "group_log_attendees" => pars.grouptype = GroupType::LogAttendees,
            "group_log_invitees" => pars.grouptype = GroupType::LogInvitees,

            "pri_no_main_period" => pars.pricommpertype &= !pri_period::MAIN,
            "pri_no_alt_period" => pars.pricommpertype &= !pri_period::ALT,
            "pri_no_main_period_int" => pars.pricommpertype &= !pri_period::MAIN_INT,
            "pri_no_alt_period_int" => pars.pricommpertype &= !pri_period::ALT_INT,

            "time_pri_created" => pars.timetype = TimeType::PriCreated,
            "time_pri_infectious" => pars.timetype = TimeType::PriInfectious,
            "time_pri_end" => pars.timetype = TimeType::PriEnd,

            "nstart" => pars.nstart = toks.u32_value(name)?,
            "popsize" => pars.popsize = toks.u32_value(name)?,
            "nimax" => pars.nimax = toks.u32_value(name)?,
            "lmax" => pars.lmax = toks.u32_value(name)?,

            "ninfhist" => cfg.ninfhist = true,
            "npaths" => cfg.npaths = toks.u32_value(name)?,
            "nthreads" => cfg.nthreads = toks.u32_value(name)?,
            "nsetsperthread" => cfg.nsetsperthread = toks.u32_value(name)?,
            "seed" => cfg.seed = toks.u64_value(name)?,
            "out" => cfg.output = PathBuf::from(toks.value(name)?),
            "ctout" => cfg.ctout = Some(PathBuf::from(toks.value(name)?)),
            "summary" => cfg.summary = Some(PathBuf::from(toks.value(name)?)),

            "help" => {
                print_usage(program);
                return Ok(None);
            }
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("config: option '{tok}' is unknown"),
                ));
            }
        }
    }

    if cfg.nsetsperthread == 0 {
        cfg.nsetsperthread = if cfg.nthreads > 1 { 100 } else { 1 };
    }
    if cfg.nthreads == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "config: nthreads must be at least 1",
        ));
    }
    if cfg.npaths == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "config: npaths must be at least 1",
        ));
    }

    Ok(Some((pars, cfg)))
}
