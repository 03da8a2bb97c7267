/// ==============================================================================================
/// ================================ Cross-Path Aggregates =======================================
/// ==============================================================================================

use ndarray::Array1;

use super::accumulator::SummaryStats;

/// Running mean / M2 over a scalar stream (Welford; M2 is the sum of squared
/// deviations, kept until final emission).
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarMoments {
    pub n: u64,
    pub mean: f64,
    pub m2: f64,
}

impl ScalarMoments {
    #[inline]
    pub fn push(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Chan's parallel combine.
    pub fn merge(&mut self, other: &ScalarMoments) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            *self = *other;
            return;
        }
        let (na, nb) = (self.n as f64, other.n as f64);
        let n = na + nb;
        let delta = other.mean - self.mean;
        self.mean += delta * nb / n;
        self.m2 += other.m2 + delta * delta * na * nb / n;
        self.n += other.n;
    }

    /// Sample standard deviation (n - 1 form).
    pub fn std(&self) -> f64 {
        if self.n > 1 {
            (self.m2 / (self.n - 1) as f64).sqrt()
        } else {
            0.0
        }
    }
}

/// Mean / M2 arrays over one timeline stream, sharing its owner's window
/// (shift negative bins + npos positive bins) and path count.
#[derive(Clone, Debug)]
pub struct TimelineMoments {
    pub inf_mean: Array1<f64>,
    pub inf_m2: Array1<f64>,
    pub newinf_mean: Array1<f64>,
    pub newinf_m2: Array1<f64>,
    pub newpostest_mean: Array1<f64>,
    pub newpostest_m2: Array1<f64>,
}

impl TimelineMoments {
    fn zeros(len: usize) -> Self {
        Self {
            inf_mean: Array1::zeros(len),
            inf_m2: Array1::zeros(len),
            newinf_mean: Array1::zeros(len),
            newinf_m2: Array1::zeros(len),
            newpostest_mean: Array1::zeros(len),
            newpostest_m2: Array1::zeros(len),
        }
    }

    /// Re-home every array into a window grown by `ndiff` bins on the left
    /// and `pdiff` on the right. New bins start at mean = M2 = 0, which is
    /// exactly the state they would hold had every earlier path sampled 0
    /// there.
    fn regrow(&mut self, ndiff: usize, pdiff: usize) {
        for a in [
            &mut self.inf_mean,
            &mut self.inf_m2,
            &mut self.newinf_mean,
            &mut self.newinf_m2,
            &mut self.newpostest_mean,
            &mut self.newpostest_m2,
        ] {
            let mut grown = Array1::zeros(ndiff + a.len() + pdiff);
            grown.slice_mut(ndarray::s![ndiff..ndiff + a.len()]).assign(a);
            *a = grown;
        }
    }

    #[inline]
    fn update(&mut self, i: usize, n: u64, inf: f64, newinf: f64, newpostest: f64) {
        let nf = n as f64;

        let delta = inf - self.inf_mean[i];
        self.inf_mean[i] += delta / nf;
        self.inf_m2[i] += delta * (inf - self.inf_mean[i]);

        let delta = newinf - self.newinf_mean[i];
        self.newinf_mean[i] += delta / nf;
        self.newinf_m2[i] += delta * (newinf - self.newinf_mean[i]);

        let delta = newpostest - self.newpostest_mean[i];
        self.newpostest_mean[i] += delta / nf;
        self.newpostest_m2[i] += delta * (newpostest - self.newpostest_mean[i]);
    }

    /// Chan's combine per bin; both sides must already share the window.
    fn merge(&mut self, other: &TimelineMoments, na: u64, nb: u64) {
        if nb == 0 {
            return;
        }
        if na == 0 {
            self.clone_from(other);
            return;
        }
        let (naf, nbf) = (na as f64, nb as f64);
        let n = naf + nbf;

        for (sm, s2, om, o2) in [
            (&mut self.inf_mean, &mut self.inf_m2, &other.inf_mean, &other.inf_m2),
            (&mut self.newinf_mean, &mut self.newinf_m2, &other.newinf_mean, &other.newinf_m2),
            (
                &mut self.newpostest_mean,
                &mut self.newpostest_m2,
                &other.newpostest_mean,
                &other.newpostest_m2,
            ),
        ] {
            for i in 0..sm.len() {
                let delta = om[i] - sm[i];
                sm[i] += delta * nbf / n;
                s2[i] += o2[i] + delta * delta * naf * nbf / n;
            }
        }
    }
}

/// Per-thread aggregate state, folded into the run total in thread-index
/// order after the pool joins.
#[derive(Clone, Debug)]
pub struct ThreadStats {
    shift: u32,
    npos: u32,
    pub npaths: u64,
    pub n_ext: u64,
    pub n_noext: u64,
    pub nmaxedout: u64,
    pub ext: TimelineMoments,
    pub noext: TimelineMoments,
    pub te: ScalarMoments,     // extinction time, extinct paths only
    pub totinf: ScalarMoments, // total new infections per path, all paths
    pub rsum: u64,
    pub commpersum: f64,
    pub neventssum: u64,
    pub nindividuals: u64,
}

impl ThreadStats {
    pub fn new() -> Self {
        Self {
            shift: 0,
            npos: 0,
            npaths: 0,
            n_ext: 0,
            n_noext: 0,
            nmaxedout: 0,
            ext: TimelineMoments::zeros(0),
            noext: TimelineMoments::zeros(0),
            te: ScalarMoments::default(),
            totinf: ScalarMoments::default(),
            rsum: 0,
            commpersum: 0.0,
            neventssum: 0,
            nindividuals: 0,
        }
    }

    #[inline]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    #[inline]
    pub fn npos(&self) -> u32 {
        self.npos
    }

    /// Widen the window to cover at least (shift, npos).
    fn align(&mut self, shift: u32, npos: u32) {
        let ndiff = shift.saturating_sub(self.shift) as usize;
        let pdiff = npos.saturating_sub(self.npos) as usize;
        if ndiff > 0 || pdiff > 0 {
            self.ext.regrow(ndiff, pdiff);
            self.noext.regrow(ndiff, pdiff);
            self.shift += ndiff as u32;
            self.npos += pdiff as u32;
        }
    }

    /// Absorb one finished path.
    pub fn record_path(&mut self, s: &SummaryStats) {
        self.align(s.shift() as u32, s.npos() as u32);

        self.npaths += 1;
        self.rsum += s.rsum as u64;
        self.commpersum += s.commpersum;
        self.neventssum += s.neventssum;
        self.nindividuals += s.nindividuals as u64;
        if s.maxed_out() {
            self.nmaxedout += 1;
        }

        let mut total = 0u64;
        for b in -(s.shift())..s.npos() {
            total += s.newinf_at(b) as u64;
        }
        self.totinf.push(total as f64);

        let shift = self.shift as i32;
        let npos = self.npos as i32;

        let (n, tl) = if s.extinction {
            self.n_ext += 1;
            self.te.push(s.extinction_time);
            (self.n_ext, &mut self.ext)
        } else {
            self.n_noext += 1;
            (self.n_noext, &mut self.noext)
        };

        for b in -shift..npos {
            tl.update(
                (b + shift) as usize,
                n,
                s.inf_at(b) as f64,
                s.newinf_at(b) as f64,
                s.newpostest_at(b) as f64,
            );
        }
    }

    /// Fold another thread's partial into this one (Chan's combine; the
    /// caller fixes the fold order for bitwise determinism).
    pub fn merge(&mut self, other: &ThreadStats) {
        let mut other = other.clone();
        self.align(other.shift, other.npos);
        other.align(self.shift, self.npos);

        self.ext.merge(&other.ext, self.n_ext, other.n_ext);
        self.noext.merge(&other.noext, self.n_noext, other.n_noext);
        self.te.merge(&other.te);
        self.totinf.merge(&other.totinf);

        self.npaths += other.npaths;
        self.n_ext += other.n_ext;
        self.n_noext += other.n_noext;
        self.nmaxedout += other.nmaxedout;
        self.rsum += other.rsum;
        self.commpersum += other.commpersum;
        self.neventssum += other.neventssum;
        self.nindividuals += other.nindividuals;
    }
}

impl Default for ThreadStats {
    fn default() -> Self {
        Self::new()
    }
}
