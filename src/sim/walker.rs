/// ==============================================================================================
/// ================================== Infection-Tree Walker =====================================
/// ==============================================================================================

use crate::params::model::{GroupType, ModelParams, TimeType};
use crate::rng::SimRng;
use crate::stats::SummaryStats;
use crate::trace::CtLog;

use super::individual::{comm_period, InfIndividual};
use super::periods::{PeriodSampler, SampledPeriod};

const INIT_N_LAYERS: usize = 16;
const LAYER_GROW_FACT: f64 = 1.5; // growing factor for the layer array

/// Depth-first generator of one branching path.
///     `frames[0]` is a sentinel holding only the time origin for the current
///     primary; `frames[d]` for d >= 1 is the infectious individual at depth
///     d. The array grows geometrically and is reused across paths; the walk
///     itself is an explicit stack machine (paths can reach thousands of
///     layers, so native recursion is out).
pub struct Walker {
    lambda: f64,
    tmax: f64,
    nstart: u32,
    p: f64,
    pinf: f64,
    grouptype: GroupType,
    timetype: TimeType,
    tdeltat: f64,
    periods: PeriodSampler,
    frames: Vec<InfIndividual>,
}

impl Walker {
    /// Requires a record already processed by the parameter solver.
    pub fn from_params(pars: &ModelParams) -> Self {
        Self {
            lambda: pars.lambda,
            tmax: pars.tmax,
            nstart: pars.nstart,
            p: pars.p,
            pinf: pars.pinf,
            grouptype: pars.grouptype,
            timetype: pars.timetype,
            tdeltat: pars.tdeltat,
            periods: PeriodSampler::from_params(pars),
            frames: vec![InfIndividual::default(); INIT_N_LAYERS],
        }
    }

    /// Grow the layer array so that `frames[depth]` exists.
    #[inline]
    fn ensure_layers(&mut self, depth: usize) {
        if depth >= self.frames.len() {
            let newlen = ((self.frames.len() as f64 * LAYER_GROW_FACT) as usize).max(depth + 1);
            self.frames.resize_with(newlen, InfIndividual::default);
        }
    }

    /// Offspring count for one transmission event: a logarithmic group-size
    /// draw mapped through the group model, thinned by the per-contact
    /// infection probability.
    #[inline]
    fn draw_ninfections(grouptype: GroupType, p: f64, pinf: f64, rng: &mut SimRng) -> u32 {
        let susceptibles = match grouptype {
            GroupType::LogAttendeesPlus1 => rng.logarithmic(p),
            // The infectious individual is one of the (>= 2) attendees.
            GroupType::LogAttendees | GroupType::LogInvitees => rng.logarithmic_trunc2(p) - 1,
        };
        if pinf < 1.0 {
            rng.binomial(susceptibles, pinf)
        } else {
            susceptibles
        }
    }

    /// Initialise `frames[depth]` as a freshly infected individual whose
    /// parent sits at `depth - 1`.
    fn init_frame(
        &mut self,
        depth: usize,
        sp: SampledPeriod,
        rng: &mut SimRng,
        ct: Option<&mut CtLog>,
    ) {
        let parent_event = self.frames[depth - 1].event_time;
        let parent_id = self.frames[depth - 1].id;
        let parent_entry = self.frames[depth - 1].ct_entry;

        let f = &mut self.frames[depth];
        f.latent_period = sp.latent;
        f.comm_period = sp.comm;
        f.commpertype = sp.kind;
        f.end_comm_period = parent_event + sp.latent + sp.comm;
        f.infectious_at_tmax = f.end_comm_period > self.tmax;
        if f.infectious_at_tmax {
            f.commpertype |= comm_period::TMAX;
        }
        f.nevents = rng.poisson(self.lambda * sp.comm);
        f.curevent = 0;
        f.curinfection = 0;
        f.ninfections = 0;
        f.ninf = 0;

        if let Some(ct) = ct {
            f.id = ct.next_frame_id();
            f.ct_entry = if f.commpertype & comm_period::TRUE_POSITIVE_TEST != 0 {
                ct.record_positive(
                    f.end_comm_period + self.tdeltat,
                    f.end_comm_period - f.comm_period,
                    f.id,
                    parent_id,
                    parent_entry,
                )
            } else {
                parent_entry
            };
        } else {
            f.id = u32::MAX;
            f.ct_entry = u32::MAX;
        }
    }

    /// Generate transmission events for `frames[depth]` until one is accepted
    /// or the frame's events are exhausted.
    ///     Returns true when an accepted event leaves the frame ready for its
    ///     first child; on exhaustion the frame's statistics are closed out.
    fn gen_events(&mut self, depth: usize, rng: &mut SimRng, stats: &mut SummaryStats) -> bool {
        loop {
            let (head, tail) = self.frames.split_at_mut(depth);
            let parent_event = head[depth - 1].event_time;
            let f = &mut tail[0];

            // U in (0, 1] maps the event into (parent + latent, parent + latent + comm].
            f.event_time = parent_event + f.latent_period + f.comm_period * rng.uniform_pu01();
            f.ninfections = Self::draw_ninfections(self.grouptype, self.p, self.pinf, rng);

            if stats.new_event(f, depth as u32) {
                f.curinfection = 0;
                return true;
            }
            if f.curevent + 1 < f.nevents {
                f.curevent += 1;
                continue;
            }
            stats.end_inf(f);
            return false;
        }
    }

    /// Generate one full path rooted at `nstart` primaries.
    pub fn run_path(
        &mut self,
        rng: &mut SimRng,
        stats: &mut SummaryStats,
        mut ct: Option<&mut CtLog>,
    ) {
        'primaries: for _ in 0..self.nstart {
            let mut depth = 1usize;
            self.ensure_layers(depth);

            // The sentinel anchors this primary's clock to the configured
            // time origin.
            let sp = self.periods.sample(rng, true);
            self.frames[0].event_time = match self.timetype {
                TimeType::PriCreated => 0.0,
                TimeType::PriInfectious => -sp.latent,
                TimeType::PriEnd => -(sp.latent + sp.comm),
            };
            self.init_frame(1, sp, rng, ct.as_deref_mut());
            stats.new_pri_inf(&mut self.frames[1]);

            if self.frames[1].nevents == 0 {
                stats.noevent_inf(&self.frames[1]);
                continue 'primaries;
            }
            if !self.gen_events(1, rng, stats) {
                continue 'primaries;
            }

            'tree: loop {
                // Descend: infect one child of the current event.
                depth += 1;
                self.ensure_layers(depth);
                let sp = self.periods.sample(rng, false);
                self.init_frame(depth, sp, rng, ct.as_deref_mut());

                if self.frames[depth].nevents > 0 {
                    stats.new_inf(&mut self.frames[depth]);
                    if self.gen_events(depth, rng, stats) {
                        continue 'tree;
                    }
                } else {
                    stats.noevent_inf(&self.frames[depth]);
                }

                // Ascend until a frame still has siblings or events left.
                'pop: loop {
                    if depth == 1 {
                        continue 'primaries;
                    }
                    depth -= 1;

                    let f = &mut self.frames[depth];
                    if f.curinfection + 1 < f.ninfections {
                        f.curinfection += 1;
                        continue 'tree;
                    }
                    if f.curevent + 1 < f.nevents {
                        f.curevent += 1;
                        if self.gen_events(depth, rng, stats) {
                            continue 'tree;
                        }
                        continue 'pop;
                    }
                    stats.end_inf(&mut self.frames[depth]);
                }
            }
        }
    }
}
