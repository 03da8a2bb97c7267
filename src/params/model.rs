/// ==============================================================================================
/// ===================================== Model Parameters =======================================
/// ==============================================================================================

use serde::{Deserialize, Serialize};

/// Bit flags restricting which communicable-period variants may apply to a
/// primary infectious individual.
pub mod pri_period {
    pub const MAIN: u8 = 1 << 0;
    pub const ALT: u8 = 1 << 1;
    pub const MAIN_INT: u8 = 1 << 2;
    pub const ALT_INT: u8 = 1 << 3;
    pub const ALL: u8 = MAIN | ALT | MAIN_INT | ALT_INT;
}

/// Group model:
///     Distribution of the number of individuals present at a transmission
///     event, and therefore the mapping from the logarithmic mean mu to the
///     effective offspring mean g_ave:
///         - `LogAttendeesPlus1`: attendees = L + 1, the +1 being the
///           infectious individual (g_ave = mu + 1),
///         - `LogAttendees`: attendees = L | L >= 2, infectious included
///           (g_ave = -p^2 / ((1 - p) (ln(1 - p) + p))),
///         - `LogInvitees`: accepted on the command line, rejected at
///           validation (no supported g_ave expression).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GroupType {
    LogAttendeesPlus1,
    LogAttendees,
    LogInvitees,
}

/// Origin of the integer time bins:
///     - `PriCreated`: bin 0 starts when a primary is created (no negative bins),
///     - `PriInfectious`: bin 0 starts when a primary becomes infectious
///       (its latent period extends into negative bins),
///     - `PriEnd`: bin 0 starts when a primary ceases to be infectious
///       (its whole history lives in negative bins).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TimeType {
    PriCreated,
    PriInfectious,
    PriEnd,
}

/// Model parameter record.
///     Real-valued fields default to NaN ("unknown, to be solved"); each is
///     either provided through configuration or derived exactly once by
///     `solve`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelParams {
    pub tbar: f64,   // mean main communicable period
    pub kappa: f64,  // gamma shape of the main communicable period
    pub t95: f64,    // 95th percentile of the main communicable period
    pub lambda: f64, // rate of transmission events per infectious individual
    pub lambdap: f64, // total event rate for a finite population (unsupported)
    pub p: f64,      // logarithmic group-size parameter
    pub mu: f64,     // mean of the unbounded logarithmic distribution
    pub g_ave: f64,  // effective mean group size, derived from mu and the group model
    pub pinf: f64,   // per-contact infection probability
    pub r0: f64,     // basic reproduction number

    pub lbar: f64,   // mean latent period
    pub kappal: f64, // gamma shape of the latent period
    pub l95: f64,    // 95th percentile of the latent period

    pub q: f64,      // probability of the alternate communicable period
    pub mbar: f64,   // mean alternate communicable period
    pub kappaq: f64, // gamma shape of the alternate communicable period
    pub m95: f64,    // 95th percentile of the alternate communicable period

    pub pit: f64,     // probability of main-period interruption
    pub itbar: f64,   // mean interrupted main period
    pub kappait: f64, // gamma shape of the interrupted main period
    pub it95: f64,    // 95th percentile of the interrupted main period

    pub pim: f64,     // probability of alternate-period interruption (defaults to pit)
    pub imbar: f64,   // mean interrupted alternate period (defaults to itbar)
    pub kappaim: f64, // gamma shape of the interrupted alternate period
    pub im95: f64,    // 95th percentile of the interrupted alternate period

    pub ttpr: f64,    // true-positive probability of an interrupted main period test
    pub mtpr: f64,    // true-positive probability of an interrupted alternate period test
    pub tdeltat: f64, // delay between end of communicable period and test result

    pub tmax: f64,           // inclusive upper time bound for new events
    pub nstart: u32,         // number of primary infectious individuals
    pub popsize: u32,        // population size, 0 meaning infinite
    pub nimax: u32,          // cap on new infections per integer time bin
    pub lmax: u32,           // maximum tree depth contributing to the timelines
    pub pricommpertype: u8,  // pri_period bit mask for primaries
    pub grouptype: GroupType,
    pub timetype: TimeType,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            tbar: f64::NAN,
            kappa: f64::NAN,
            t95: f64::NAN,
            lambda: f64::NAN,
            lambdap: f64::NAN,
            p: f64::NAN,
            mu: f64::NAN,
            g_ave: f64::NAN,
            pinf: f64::NAN,
            r0: f64::NAN,
            lbar: f64::NAN,
            kappal: f64::NAN,
            l95: f64::NAN,
            q: 0.0,
            mbar: f64::NAN,
            kappaq: f64::NAN,
            m95: f64::NAN,
            pit: 0.0,
            itbar: f64::NAN,
            kappait: f64::NAN,
            it95: f64::NAN,
            pim: f64::NAN,
            imbar: f64::NAN,
            kappaim: f64::NAN,
            im95: f64::NAN,
            ttpr: f64::NAN,
            mtpr: f64::NAN,
            tdeltat: f64::NAN,
            tmax: f64::INFINITY,
            nstart: 1,
            popsize: 0,
            nimax: u32::MAX,
            lmax: u32::MAX,
            pricommpertype: pri_period::ALL,
            grouptype: GroupType::LogAttendeesPlus1,
            timetype: TimeType::PriCreated,
        }
    }
}

impl ModelParams {
    /// True when the latent period is part of the model.
    #[inline]
    pub fn has_latent(&self) -> bool {
        !self.lbar.is_nan() || !self.kappal.is_nan() || !self.l95.is_nan()
    }

    /// True when the positive-test model is configured (interruptions with a
    /// nonzero true-positive probability and a result delay).
    #[inline]
    pub fn has_postest(&self) -> bool {
        !self.tdeltat.is_nan()
            && ((self.pit > 0.0 && self.ttpr > 0.0) || (self.pim > 0.0 && self.mtpr > 0.0))
    }

    /// Number of positive integer bins covered by a finite tmax.
    ///     Infinite (or absurdly large) tmax timelines grow on demand
    ///     instead of being preallocated.
    #[inline]
    pub fn npers(&self) -> Option<u32> {
        if self.tmax.is_finite() && self.tmax < (u32::MAX - 1) as f64 {
            Some(self.tmax as u32 + 1)
        } else {
            None
        }
    }
}
