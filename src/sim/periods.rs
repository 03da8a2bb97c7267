/// ==============================================================================================
/// =================================== Period Generation ========================================
/// ==============================================================================================

use crate::params::model::{pri_period, ModelParams};
use crate::rng::SimRng;

use super::individual::comm_period;

/// A gamma-distributed time period, degenerate at its mean when the shape is
/// infinite.
#[derive(Clone, Copy, Debug)]
struct GammaPeriod {
    mean: f64,
    shape: f64,
    scale: f64, // mean / shape
}

impl GammaPeriod {
    #[inline]
    fn new(mean: f64, shape: f64) -> Self {
        let scale = if shape.is_finite() { mean / shape } else { 0.0 };
        Self { mean, shape, scale }
    }

    #[inline]
    fn sample(&self, rng: &mut SimRng) -> f64 {
        if self.shape.is_infinite() || self.mean == 0.0 {
            self.mean
        } else {
            rng.gamma(self.shape, self.scale)
        }
    }
}

/// One sampled (latent, communicable) pair with its type flags.
#[derive(Clone, Copy, Debug)]
pub struct SampledPeriod {
    pub latent: f64,
    pub comm: f64,
    pub kind: u8,
}

/// Samples the per-frame time periods.
///     Built once per worker from the solved parameter record; every
///     distribution parameter is fixed for the whole run, so the gamma
///     shapes/scales are precomputed here.
#[derive(Clone, Debug)]
pub struct PeriodSampler {
    latent: Option<GammaPeriod>,
    main: GammaPeriod,
    alt: Option<GammaPeriod>,
    it: Option<GammaPeriod>, // interrupted main
    im: Option<GammaPeriod>, // interrupted alternate
    q: f64,
    pit: f64,
    pim: f64,
    ttpr: f64,
    mtpr: f64,
    primask: u8,
}

impl PeriodSampler {
    /// Requires a record already processed by the parameter solver.
    pub fn from_params(pars: &ModelParams) -> Self {
        let latent =
            (!pars.lbar.is_nan() && pars.lbar > 0.0).then(|| GammaPeriod::new(pars.lbar, pars.kappal));
        let alt = (pars.q > 0.0).then(|| GammaPeriod::new(pars.mbar, pars.kappaq));
        let it = (pars.pit > 0.0).then(|| GammaPeriod::new(pars.itbar, pars.kappait));
        let im =
            (pars.q > 0.0 && pars.pim > 0.0).then(|| GammaPeriod::new(pars.imbar, pars.kappaim));

        Self {
            latent,
            main: GammaPeriod::new(pars.tbar, pars.kappa),
            alt,
            it,
            im,
            q: pars.q,
            pit: pars.pit,
            pim: pars.pim,
            ttpr: if pars.ttpr.is_nan() { 0.0 } else { pars.ttpr },
            mtpr: if pars.mtpr.is_nan() { 0.0 } else { pars.mtpr },
            primask: pars.pricommpertype,
        }
    }

    /// Draw the latent and communicable periods for one individual.
    ///     Primaries honour the pri_period mask: a masked-out branch is never
    ///     taken, a masked-out interruption is never attempted.
    pub fn sample(&self, rng: &mut SimRng, primary: bool) -> SampledPeriod {
        let latent = self.latent.as_ref().map_or(0.0, |g| g.sample(rng));

        let allow_main = !primary || self.primask & pri_period::MAIN != 0;
        let allow_alt =
            self.alt.is_some() && (!primary || self.primask & pri_period::ALT != 0);

        let use_alt = match (allow_main, allow_alt) {
            (true, true) => rng.bernoulli(self.q),
            (false, _) => true,
            (_, false) => false,
        };

        let (mut comm, mut kind) = if use_alt {
            (self.alt.as_ref().map_or(0.0, |g| g.sample(rng)), comm_period::ALT)
        } else {
            (self.main.sample(rng), comm_period::MAIN)
        };

        let (pint, intper, tpr, int_bit) = if use_alt {
            (self.pim, self.im.as_ref(), self.mtpr, pri_period::ALT_INT)
        } else {
            (self.pit, self.it.as_ref(), self.ttpr, pri_period::MAIN_INT)
        };
        let allow_int = !primary || self.primask & int_bit != 0;

        if allow_int && pint > 0.0 && rng.bernoulli(pint) {
            if let Some(g) = intper {
                let cut = g.sample(rng);

                // An interruption only matters if it ends the period early.
                if cut < comm {
                    comm = cut;
                    kind |= comm_period::INTERRUPTED;
                    if tpr > 0.0 && rng.bernoulli(tpr) {
                        kind |= comm_period::TRUE_POSITIVE_TEST;
                    }
                }
            }
        }

        SampledPeriod { latent, comm, kind }
    }
}
