/// ==============================================================================================
/// ================================ Per-Path Summary Statistics =================================
/// ==============================================================================================

use crate::params::model::{ModelParams, TimeType};
use crate::sim::individual::{comm_period, InfIndividual};

const INIT_NINF_ALLOC: usize = 16; // initial offspring-histogram buckets
const INIT_POS_ALLOC: u32 = 16; // initial positive bins when tmax is infinite

/// Per-path summary statistics.
///     Three parallel u32 timelines indexed by integer time bin, with
///     `timelineshift` negative bins to the left of the origin. The buffers
///     survive `path_init` so a worker allocates them once; the origin shift
///     and (for infinite tmax) the positive extent only ever grow.
pub struct SummaryStats {
    inf_timeline: Vec<u32>,
    newinf_timeline: Vec<u32>,
    newpostest_timeline: Vec<u32>,
    timelineshift: u32, // negative bins currently allocated
    npos: u32,          // positive bins currently allocated

    npers: u32,      // logical number of positive bins (u32::MAX when tmax is infinite)
    grow_right: bool, // infinite tmax: extend the positive side on demand
    shifting: bool,   // time origin allows negative bins (timetype != PriCreated)

    tmax: f64,
    tmax_floor: f64,
    lmax: u32,
    nimax: u32,
    tdeltat: f64,

    pub extinction: bool,
    pub extinction_time: f64,
    pub rsum: u32,
    pub commpersum: f64,
    pub neventssum: u64,
    pub nindividuals: u32,
    pub nimaxedoutmintimeindex: i32,

    ngeninfs: Option<Vec<u64>>, // offspring histogram, accumulated across paths
}

impl SummaryStats {
    /// Requires a record already processed by the parameter solver.
    pub fn from_params(pars: &ModelParams, ninfhist: bool) -> Self {
        let (npers, npos, grow_right) = match pars.npers() {
            Some(n) => (n, n, false),
            None => (u32::MAX, INIT_POS_ALLOC, true),
        };

        Self {
            inf_timeline: vec![0; npos as usize],
            newinf_timeline: vec![0; npos as usize],
            newpostest_timeline: vec![0; npos as usize],
            timelineshift: 0,
            npos,
            npers,
            grow_right,
            shifting: pars.timetype != TimeType::PriCreated,
            tmax: pars.tmax,
            tmax_floor: pars.tmax.floor(),
            lmax: pars.lmax,
            nimax: pars.nimax,
            tdeltat: pars.tdeltat,
            extinction: true,
            extinction_time: 0.0,
            rsum: 0,
            commpersum: 0.0,
            neventssum: 0,
            nindividuals: 0,
            nimaxedoutmintimeindex: i32::MAX,
            ngeninfs: ninfhist.then(|| vec![0; INIT_NINF_ALLOC]),
        }
    }

    /// Reset the per-path values, keeping every buffer (and the offspring
    /// histogram, which spans the whole run).
    pub fn path_init(&mut self) {
        self.inf_timeline.fill(0);
        self.newinf_timeline.fill(0);
        self.newpostest_timeline.fill(0);
        self.extinction = true;
        self.extinction_time = 0.0;
        self.rsum = 0;
        self.commpersum = 0.0;
        self.neventssum = 0;
        self.nindividuals = 0;
        self.nimaxedoutmintimeindex = i32::MAX;
    }

    // ------------------------------------------------------------------
    // Window accessors (negative bins first).

    #[inline]
    pub fn shift(&self) -> i32 {
        self.timelineshift as i32
    }

    #[inline]
    pub fn npos(&self) -> i32 {
        self.npos as i32
    }

    #[inline]
    fn index(&self, bin: i32) -> usize {
        (bin + self.timelineshift as i32) as usize
    }

    /// Timeline values at `bin`; 0 outside the allocated window.
    #[inline]
    pub fn inf_at(&self, bin: i32) -> u32 {
        self.at(&self.inf_timeline, bin)
    }

    #[inline]
    pub fn newinf_at(&self, bin: i32) -> u32 {
        self.at(&self.newinf_timeline, bin)
    }

    #[inline]
    pub fn newpostest_at(&self, bin: i32) -> u32 {
        self.at(&self.newpostest_timeline, bin)
    }

    #[inline]
    fn at(&self, tl: &[u32], bin: i32) -> u32 {
        if bin < -(self.timelineshift as i32) || bin >= self.npos as i32 {
            0
        } else {
            tl[(bin + self.timelineshift as i32) as usize]
        }
    }

    #[inline]
    pub fn maxed_out(&self) -> bool {
        self.nimaxedoutmintimeindex != i32::MAX
    }

    pub fn ngeninfs(&self) -> Option<&[u64]> {
        self.ngeninfs.as_deref()
    }

    // ------------------------------------------------------------------
    // Growth.

    /// Make sure positive bin `bin` is allocated (infinite-tmax runs only;
    /// finite runs preallocate every reachable positive bin).
    #[inline]
    fn ensure_pos(&mut self, bin: i32) {
        if bin >= self.npos as i32 {
            debug_assert!(self.grow_right);
            let newpos = (self.npos * 2).max(bin as u32 + 1);
            let newlen = (self.timelineshift + newpos) as usize;
            self.inf_timeline.resize(newlen, 0);
            self.newinf_timeline.resize(newlen, 0);
            self.newpostest_timeline.resize(newlen, 0);
            self.npos = newpos;
        }
    }

    /// Grow the negative prefix so that `required` negative bins exist:
    /// zero-fill the new prefix, keep existing content, swap the origin.
    fn grow_shift(&mut self, required: u32) {
        let newshift = required.max(self.timelineshift * 2);
        let add = (newshift - self.timelineshift) as usize;

        for tl in [
            &mut self.inf_timeline,
            &mut self.newinf_timeline,
            &mut self.newpostest_timeline,
        ] {
            let mut grown = vec![0u32; add + tl.len()];
            grown[add..].copy_from_slice(tl);
            *tl = grown;
        }
        self.timelineshift = newshift;
    }

    // ------------------------------------------------------------------
    // Events fed by the walker.

    /// Process a transmission event drawn for `frame` at depth `depth`.
    ///     The frame's offspring counter absorbs the draw regardless of
    ///     acceptance; the new-infection timeline only absorbs it when the
    ///     event's bin is within tmax, the depth within lmax, and (when a cap
    ///     is configured) the bin below nimax. Returns whether the walker may
    ///     descend into the event's children.
    pub fn new_event(&mut self, frame: &mut InfIndividual, depth: u32) -> bool {
        if frame.ninfections == 0 {
            return false;
        }
        frame.ninf += frame.ninfections;

        // The bin-level bound is looser than the returned, exact one: the
        // last interval also covers events between floor(tmax) and tmax.
        if frame.event_time.floor() <= self.tmax_floor && depth <= self.lmax {
            let eti = frame.event_time.floor() as i32;
            self.ensure_pos(eti);
            let i = self.index(eti);

            if self.nimax != u32::MAX && self.newinf_timeline[i] > self.nimax {
                self.extinction = false;
                if eti < self.nimaxedoutmintimeindex {
                    self.nimaxedoutmintimeindex = eti;
                }
                return false;
            }
            self.newinf_timeline[i] += frame.ninfections;
            return frame.event_time <= self.tmax;
        }
        false
    }

    /// A new infectious individual that participates in at least one event:
    /// reset its offspring counter and record its positive test, if any.
    pub fn new_inf(&mut self, frame: &mut InfIndividual) {
        frame.ninf = 0;

        if frame.commpertype & comm_period::TRUE_POSITIVE_TEST != 0 && !self.tdeltat.is_nan() {
            let trt = (frame.end_comm_period + self.tdeltat).floor() as i64;
            if trt < self.npers as i64 && trt >= -(self.timelineshift as i64) {
                self.ensure_pos(trt as i32);
                let i = self.index(trt as i32);
                self.newpostest_timeline[i] += 1;
            }
        }
    }

    /// A new primary: expand the negative prefix when its earliest point
    /// precedes the allocated origin, then proceed as `new_inf`.
    pub fn new_pri_inf(&mut self, frame: &mut InfIndividual) {
        if self.shifting {
            let start = frame.end_comm_period - frame.comm_period - frame.latent_period;
            let required = (-start).ceil();
            if required > self.timelineshift as f64 {
                self.grow_shift(required as u32);
            }
        }
        self.new_inf(frame);
    }

    /// Close out an individual that participated in transmission events.
    pub fn end_inf(&mut self, frame: &InfIndividual) {
        self.rsum += frame.ninf;
        self.finish_infectious(frame);
    }

    /// Close out an individual without any transmission event.
    pub fn noevent_inf(&mut self, frame: &InfIndividual) {
        self.finish_infectious(frame);
    }

    fn finish_infectious(&mut self, frame: &InfIndividual) {
        self.commpersum += frame.comm_period;
        self.neventssum += frame.nevents as u64;
        self.nindividuals += 1;

        if frame.commpertype & comm_period::TMAX != 0 {
            // Still infectious at tmax: the path cannot have gone extinct.
            self.extinction = false;
        } else if frame.end_comm_period > self.extinction_time {
            self.extinction_time = frame.end_comm_period;
        }

        // One count for every integer bin the individual is alive in.
        let end_bin = if self.npers != u32::MAX && frame.end_comm_period >= self.npers as f64 {
            (self.npers - 1) as i32
        } else {
            frame.end_comm_period.floor() as i32
        };
        let start =
            (frame.end_comm_period - frame.comm_period - frame.latent_period).floor() as i32;
        let start = if -start > self.timelineshift as i32 { 0 } else { start };

        if start <= end_bin {
            self.ensure_pos(end_bin);
            for b in start..=end_bin {
                let i = self.index(b);
                self.inf_timeline[i] += 1;
            }
        }

        if let Some(hist) = &mut self.ngeninfs {
            let n = frame.ninf as usize;
            if n >= hist.len() {
                hist.resize((n + 1).max(hist.len() * 2), 0);
            }
            hist[n] += 1;
        }
    }
}
