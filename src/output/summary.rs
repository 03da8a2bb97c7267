/// ==============================================================================================
/// ===================================== Run Summary ============================================
/// ==============================================================================================

use std::fs::File;
use std::io::{Error, ErrorKind, Result, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::params::model::ModelParams;
use crate::stats::ThreadStats;

/// Mean / sample-std pair per integer time bin.
#[derive(Clone, Debug, Serialize)]
pub struct TimelineSummary {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Final aggregates of one run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub pars: ModelParams,
    pub npaths: u64,
    pub nthreads: u32,
    pub nsetsperthread: u32,
    pub seed: u64,

    pub extinction_probability: f64,
    pub maxedout_fraction: f64,
    pub r_effective: f64,
    pub comm_period_mean: f64,
    pub nevents_mean: f64,
    pub total_infections_mean: f64,
    pub total_infections_std: f64,
    pub extinction_time_mean: f64,
    pub extinction_time_std: f64,

    pub negbins: u32, // leading negative bins of every timeline below
    pub inf_ext: TimelineSummary,
    pub newinf_ext: TimelineSummary,
    pub newpostest_ext: TimelineSummary,
    pub inf_noext: TimelineSummary,
    pub newinf_noext: TimelineSummary,
    pub newpostest_noext: TimelineSummary,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngeninfs: Option<Vec<u64>>,
}

impl RunSummary {
    /// Assemble the summary from the folded per-thread partials.
    pub fn build(
        pars: &ModelParams,
        nthreads: u32,
        nsetsperthread: u32,
        seed: u64,
        total: &ThreadStats,
        ngeninfs: Option<Vec<u64>>,
    ) -> Self {
        let npaths = total.npaths;
        let div = |num: f64, den: f64| if den > 0.0 { num / den } else { f64::NAN };

        let timeline = |mean: &ndarray::Array1<f64>, m2: &ndarray::Array1<f64>, n: u64| {
            let std = m2
                .iter()
                .map(|&v| if n > 1 { (v / (n - 1) as f64).sqrt() } else { 0.0 })
                .collect();
            TimelineSummary { mean: mean.to_vec(), std }
        };

        Self {
            pars: pars.clone(),
            npaths,
            nthreads,
            nsetsperthread,
            seed,
            extinction_probability: div(total.n_ext as f64, npaths as f64),
            maxedout_fraction: div(total.nmaxedout as f64, npaths as f64),
            r_effective: div(total.rsum as f64, total.nindividuals as f64),
            comm_period_mean: div(total.commpersum, total.nindividuals as f64),
            nevents_mean: div(total.neventssum as f64, total.nindividuals as f64),
            total_infections_mean: total.totinf.mean,
            total_infections_std: total.totinf.std(),
            extinction_time_mean: total.te.mean,
            extinction_time_std: total.te.std(),
            negbins: total.shift(),
            inf_ext: timeline(&total.ext.inf_mean, &total.ext.inf_m2, total.n_ext),
            newinf_ext: timeline(&total.ext.newinf_mean, &total.ext.newinf_m2, total.n_ext),
            newpostest_ext: timeline(
                &total.ext.newpostest_mean,
                &total.ext.newpostest_m2,
                total.n_ext,
            ),
            inf_noext: timeline(&total.noext.inf_mean, &total.noext.inf_m2, total.n_noext),
            newinf_noext: timeline(&total.noext.newinf_mean, &total.noext.newinf_m2, total.n_noext),
            newpostest_noext: timeline(
                &total.noext.newpostest_mean,
                &total.noext.newpostest_m2,
                total.n_noext,
            ),
            ngeninfs,
        }
    }

    /// Write the summary as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("RunSummary::save: serialize {}: {e}", path.display()),
            )
        })?;

        let mut file = File::create(path).map_err(|e| {
            Error::new(e.kind(), format!("RunSummary::save: create {}: {e}", path.display()))
        })?;
        file.write_all(json.as_bytes()).map_err(|e| {
            Error::new(e.kind(), format!("RunSummary::save: write {}: {e}", path.display()))
        })?;
        Ok(())
    }

    /// Report the headline aggregates through the logger.
    pub fn log_report(&self) {
        info!(
            "{} paths: extinction probability {:.6}, maxed-out fraction {:.6}",
            self.npaths, self.extinction_probability, self.maxedout_fraction
        );
        info!(
            "R-effective {:.6}, mean communicable period {:.6}, mean events per individual {:.6}",
            self.r_effective, self.comm_period_mean, self.nevents_mean
        );
        info!(
            "total infections per path {:.6} +- {:.6}",
            self.total_infections_mean, self.total_infections_std
        );
        info!(
            "extinction time {:.6} +- {:.6} over {} extinct paths",
            self.extinction_time_mean,
            self.extinction_time_std,
            (self.extinction_probability * self.npaths as f64).round() as u64
        );
    }
}
