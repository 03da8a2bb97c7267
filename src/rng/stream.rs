/// ==============================================================================================
/// ================================ Substream RNG Facade ========================================
/// ==============================================================================================

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rand_distr::{Binomial, Distribution, Gamma, Poisson};

/// Default master seed when none is configured.
pub const DEFAULT_SEED: u64 = 5489;

/// One statistically independent random stream.
///     A run owns `nthreads * nsetsperthread` substreams, all derived from a
///     single master seed through the ChaCha stream parameter; a substream is
///     consumed by exactly one thread, which makes every draw a pure function
///     of (seed, substream index).
pub struct SimRng {
    rng: ChaCha12Rng,
}

impl SimRng {
    /// Substream `i` of the master `seed`.
    #[inline]
    pub fn substream(seed: u64, i: u64) -> Self {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        rng.set_stream(i);
        Self { rng }
    }

    /// Uniform variate on (0, 1].
    #[inline]
    pub fn uniform_pu01(&mut self) -> f64 {
        1.0 - self.rng.random::<f64>()
    }

    /// Uniform variate on [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Bernoulli draw with success probability `p`.
    #[inline]
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.rng.random::<f64>() < p
    }

    /// Poisson event count with the given rate; a vanishing rate yields 0
    /// without consuming randomness.
    #[inline]
    pub fn poisson(&mut self, rate: f64) -> u32 {
        if rate <= 0.0 {
            return 0;
        }
        let d = Poisson::new(rate).unwrap();
        let n: f64 = d.sample(&mut self.rng);
        n as u32
    }

    /// Gamma variate with the given shape and scale; an infinite shape
    /// degenerates to the mean.
    #[inline]
    pub fn gamma(&mut self, shape: f64, scale: f64) -> f64 {
        if shape.is_infinite() {
            return scale; // caller passes the mean as scale in this case
        }
        let d = Gamma::new(shape, scale).unwrap();
        d.sample(&mut self.rng)
    }

    /// Binomial thinning: number of successes among `n` trials with
    /// per-trial probability `p`.
    #[inline]
    pub fn binomial(&mut self, n: u32, p: f64) -> u32 {
        if n == 0 || p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return n;
        }
        let d = Binomial::new(n as u64, p).unwrap();
        d.sample(&mut self.rng) as u32
    }

    /// Logarithmic-series variate on {1, 2, ...} with parameter `p`.
    ///     Kemp's accelerated generation method, as in GSL's
    ///     gsl_ran_logarithmic. p = 0 collapses the distribution onto 1.
    pub fn logarithmic(&mut self, p: f64) -> u32 {
        if p <= 0.0 {
            return 1;
        }
        let c = (1.0 - p).ln();
        let v = self.uniform_pu01();

        if v >= p {
            return 1;
        }
        let u = self.uniform_pu01();
        let q = 1.0 - (c * u).exp();

        if v <= q * q {
            return (1.0 + v.ln() / q.ln()) as u32;
        }
        if v <= q {
            return 2;
        }
        1
    }

    /// Logarithmic-series variate truncated below 2, for the attendee and
    /// invitee group models.
    #[inline]
    pub fn logarithmic_trunc2(&mut self, p: f64) -> u32 {
        if p <= 0.0 {
            return 2; // the p -> 0 limit of the truncated distribution
        }
        loop {
            let n = self.logarithmic(p);
            if n >= 2 {
                return n;
            }
        }
    }
}
