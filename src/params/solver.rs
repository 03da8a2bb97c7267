/// ==============================================================================================
/// ==================================== Parameter Solver ========================================
/// ==============================================================================================

use std::io::{Error, ErrorKind, Result};

use log::info;
use statrs::function::gamma::gamma_lr;

use super::model::{pri_period, GroupType, ModelParams};
use super::roots::{bisect, grow_upper, shrink_lower};

const RF_P_EPSF: f64 = 1e-12; // f-tolerance for the p(mu) root
const RF_GAMMA_EPSF: f64 = 1e-12; // f-tolerance for the gamma quantile roots
const RF_MAXITER: u32 = 100;
const BRACKET_GROW: f64 = 2.0;

#[inline]
fn known(x: f64) -> bool {
    !x.is_nan()
}

#[inline]
fn invalid(msg: String) -> Error {
    Error::new(ErrorKind::InvalidInput, msg)
}

/// Derive every missing model parameter, exactly once.
///     Order follows the dependency chain: basic reproduction group first,
///     then the gamma groups (main, interrupted main, alternate, interrupted
///     alternate, latent), then the scalar probability checks. Idempotent:
///     a second call on the solved record is a no-op.
pub fn solve(pars: &mut ModelParams) -> Result<()> {
    if (known(pars.tbar) as u8)
        + (known(pars.lambda) as u8)
        + ((known(pars.p) || known(pars.mu)) as u8)
        + (known(pars.r0) as u8)
        != 3
    {
        return Err(invalid(
            "ModelParams::solve: an invalid combination of tbar, lambda, p, mu and R0 \
             parameters was provided (exactly three of the four must be known)"
                .to_string(),
        ));
    }

    solve_r0_group(pars)?;
    info!(
        "basic reproduction parameters: lambda={:.15e} tbar={:.15e} mu={:.15e} p={:.15e} R0={:.15e} g_ave={:.15e}",
        pars.lambda, pars.tbar, pars.mu, pars.p, pars.r0, pars.g_ave
    );

    if (known(pars.kappa) as u8) + (known(pars.t95) as u8) != 1 {
        return Err(invalid(
            "ModelParams::solve: either the kappa parameter or the t95 parameter must be provided"
                .to_string(),
        ));
    }
    solve_gamma_group(&mut pars.tbar, &mut pars.kappa, &mut pars.t95)
        .map_err(|e| invalid(format!("ModelParams::solve: main period: {e}")))?;
    info!(
        "main communicable period: tbar={:.15e} kappa={:.15e} t95={:.15e}",
        pars.tbar, pars.kappa, pars.t95
    );

    if !(0.0..=1.0).contains(&pars.pit) {
        return Err(invalid("ModelParams::solve: pit must be within [0, 1]".to_string()));
    }

    if pars.pit > 0.0 {
        if (known(pars.kappait) as u8) + (known(pars.it95) as u8) != 1 {
            return Err(invalid(
                "ModelParams::solve: either the kappait parameter or the it95 parameter must be \
                 provided"
                    .to_string(),
            ));
        }
        solve_gamma_group(&mut pars.itbar, &mut pars.kappait, &mut pars.it95)
            .map_err(|e| invalid(format!("ModelParams::solve: interrupted main period: {e}")))?;
        info!(
            "interrupted main period: pit={:.15e} itbar={:.15e} kappait={:.15e} it95={:.15e}",
            pars.pit, pars.itbar, pars.kappait, pars.it95
        );
    }

    if !(0.0..=1.0).contains(&pars.q) {
        return Err(invalid("ModelParams::solve: q must be within [0, 1]".to_string()));
    }

    if pars.q > 0.0 {
        if (known(pars.kappaq) as u8) + (known(pars.m95) as u8) != 1 {
            return Err(invalid(
                "ModelParams::solve: either the kappaq parameter or the m95 parameter must be \
                 provided"
                    .to_string(),
            ));
        }
        solve_gamma_group(&mut pars.mbar, &mut pars.kappaq, &mut pars.m95)
            .map_err(|e| invalid(format!("ModelParams::solve: alternate period: {e}")))?;
        info!(
            "alternate period: q={:.15e} mbar={:.15e} kappaq={:.15e} m95={:.15e}",
            pars.q, pars.mbar, pars.kappaq, pars.m95
        );

        if pars.pim.is_nan() {
            pars.pim = pars.pit;
        }
        if !(0.0..=1.0).contains(&pars.pim) {
            return Err(invalid("ModelParams::solve: pim must be within [0, 1]".to_string()));
        }

        if pars.pim > 0.0 {
            if pars.imbar.is_nan() && pars.kappaim.is_nan() && pars.im95.is_nan() {
                // Full fallback onto the interrupted main period.
                pars.imbar = pars.itbar;
                pars.kappaim = pars.kappait;
                pars.im95 = pars.it95;
            } else {
                if pars.imbar.is_nan() {
                    pars.imbar = pars.itbar;
                }
                if (known(pars.kappaim) as u8) + (known(pars.im95) as u8) != 1 {
                    return Err(invalid(
                        "ModelParams::solve: either the kappaim parameter or the im95 parameter \
                         must be provided"
                            .to_string(),
                    ));
                }
                solve_gamma_group(&mut pars.imbar, &mut pars.kappaim, &mut pars.im95).map_err(
                    |e| invalid(format!("ModelParams::solve: interrupted alternate period: {e}")),
                )?;
            }
            info!(
                "interrupted alternate period: pim={:.15e} imbar={:.15e} kappaim={:.15e} im95={:.15e}",
                pars.pim, pars.imbar, pars.kappaim, pars.im95
            );
        }
    } else if known(pars.pim) && pars.pim > 0.0 {
        return Err(invalid(
            "ModelParams::solve: pim requires an alternate period (q > 0)".to_string(),
        ));
    }

    if known(pars.kappal) || known(pars.l95) || known(pars.lbar) {
        if pars.lbar.is_nan() {
            return Err(invalid(
                "ModelParams::solve: a latent period requires the lbar parameter".to_string(),
            ));
        }
        if (known(pars.kappal) as u8) + (known(pars.l95) as u8) != 1 {
            return Err(invalid(
                "ModelParams::solve: either the kappal parameter or the l95 parameter must be \
                 provided"
                    .to_string(),
            ));
        }
        solve_gamma_group(&mut pars.lbar, &mut pars.kappal, &mut pars.l95)
            .map_err(|e| invalid(format!("ModelParams::solve: latent period: {e}")))?;
        info!(
            "latent period: lbar={:.15e} kappal={:.15e} l95={:.15e}",
            pars.lbar, pars.kappal, pars.l95
        );
    }

    solve_scalars(pars)
}

/// Basic reproduction group: R0 = lambda * tbar * mu, with mu <-> p tied by
/// the logarithmic-mean identity mu = -p / ((1 - p) ln(1 - p)).
fn solve_r0_group(pars: &mut ModelParams) -> Result<()> {
    if known(pars.p) {
        if !(0.0..1.0).contains(&pars.p) {
            return Err(invalid(
                "ModelParams::solve: p must be within [0, 1)".to_string(),
            ));
        }
        let mu = if pars.p > 0.0 {
            -pars.p / ((1.0 - pars.p) * (1.0 - pars.p).ln())
        } else {
            1.0
        };
        if known(pars.mu) && (pars.mu - mu).abs() > 1e-9 * mu {
            return Err(invalid(
                "ModelParams::solve: p and mu were both provided and disagree".to_string(),
            ));
        }
        pars.mu = mu;
    }

    if known(pars.tbar) && pars.tbar <= 0.0 {
        return Err(invalid("ModelParams::solve: tbar must be greater than 0".to_string()));
    }
    if known(pars.lambda) && pars.lambda <= 0.0 {
        return Err(invalid("ModelParams::solve: lambda must be greater than 0".to_string()));
    }
    if known(pars.r0) && pars.r0 <= 0.0 {
        return Err(invalid("ModelParams::solve: R0 must be greater than 0".to_string()));
    }

    if pars.r0.is_nan() {
        pars.r0 = pars.lambda * pars.tbar * pars.mu;
    } else if pars.lambda.is_nan() {
        pars.lambda = pars.r0 / (pars.tbar * pars.mu);
    } else if pars.tbar.is_nan() {
        pars.tbar = pars.r0 / (pars.lambda * pars.mu);
    } else if pars.mu.is_nan() {
        pars.mu = pars.r0 / (pars.lambda * pars.tbar);
    }

    // p from mu, numerically: mu (1 - p) ln(1 - p) + p = 0 on (0, 1).
    // p = 0 is a trivial root of the same expression, so the lower bracket
    // end is walked down from 0.5 to stay clear of it.
    if pars.p.is_nan() {
        if pars.mu > 1.0 {
            let mu = pars.mu;
            let f = |p: f64| mu * (1.0 - p) * (1.0 - p).ln() + p;
            let lo = if f(0.5) < 0.0 {
                0.5
            } else {
                shrink_lower(f, 0.25, 0.5, 2.0, RF_P_EPSF)
                    .map_err(|e| invalid(format!("ModelParams::solve: p from mu: {e}")))?
            };
            pars.p = bisect(f, lo, 1.0 - RF_P_EPSF, RF_P_EPSF, RF_MAXITER)
                .map_err(|e| invalid(format!("ModelParams::solve: p from mu: {e}")))?;
        } else {
            pars.p = 0.0;
        }
    }

    pars.g_ave = match pars.grouptype {
        GroupType::LogAttendeesPlus1 => pars.mu + 1.0,
        GroupType::LogAttendees => {
            if pars.p > 0.0 {
                let l = (1.0 - pars.p).ln();
                -pars.p * pars.p / ((1.0 - pars.p) * (l + pars.p))
            } else {
                2.0
            }
        }
        GroupType::LogInvitees => {
            return Err(invalid(
                "ModelParams::solve: the invitee group model is not supported".to_string(),
            ));
        }
    };

    Ok(())
}

/// Gamma group: exactly one of {kappa, x95} is known; the other is derived by
/// inverting the regularised lower incomplete gamma at the 0.95 quantile.
///     A distribution with x95 equal to its mean degenerates to kappa = inf.
pub fn solve_gamma_group(ave: &mut f64, kappa: &mut f64, x95: &mut f64) -> Result<()> {
    if !(*ave >= 0.0) {
        return Err(invalid(
            "solve_gamma_group: the average of the distribution must be non-negative".to_string(),
        ));
    }

    if x95.is_nan() {
        if !(*kappa > 0.0) {
            return Err(invalid(
                "solve_gamma_group: the kappa parameter of the distribution must be positive"
                    .to_string(),
            ));
        }

        if kappa.is_finite() {
            let (a, m) = (*kappa, *ave);
            let f = move |x: f64| gamma_lr(a, x * a / m) - 0.95;

            let hi = grow_upper(f, m, m * BRACKET_GROW, BRACKET_GROW, 1e100)?;
            *x95 = bisect(f, m, hi, RF_GAMMA_EPSF, RF_MAXITER)?;
        } else {
            *x95 = *ave;
        }
    } else {
        if !(*x95 >= *ave) {
            return Err(invalid(
                "solve_gamma_group: the 95th percentile of the distribution cannot be smaller \
                 than the average"
                    .to_string(),
            ));
        }

        // Both known (e.g. a record solved earlier): verify consistency and
        // leave the pair untouched, so re-solving is a no-op.
        if !kappa.is_nan() {
            let consistent = if *x95 == *ave {
                kappa.is_infinite()
            } else {
                kappa.is_finite() && (gamma_lr(*kappa, *x95 * *kappa / *ave) - 0.95).abs() < 1e-9
            };
            return if consistent {
                Ok(())
            } else {
                Err(invalid(
                    "solve_gamma_group: kappa and the 95th percentile were both provided and \
                     disagree"
                        .to_string(),
                ))
            };
        }

        if *x95 != *ave {
            let (t, m) = (*x95, *ave);
            let f = move |k: f64| gamma_lr(k, t * k / m) - 0.95;

            // The physical inverse lies on the branch where the CDF at x95
            // increases with kappa; bracket it from kappa = 1 outward.
            let (lo, hi) = if f(1.0) >= 0.0 {
                (shrink_lower(f, 0.5, 1.0, BRACKET_GROW, 1e-100)?, 1.0)
            } else {
                (1.0, grow_upper(f, 1.0, BRACKET_GROW, BRACKET_GROW, 1e100)?)
            };
            *kappa = bisect(f, lo, hi, RF_GAMMA_EPSF, RF_MAXITER)?;
        } else {
            *kappa = f64::INFINITY;
        }
    }
    Ok(())
}

/// Scalar probabilities, delays and model restrictions.
fn solve_scalars(pars: &mut ModelParams) -> Result<()> {
    if pars.pinf.is_nan() {
        pars.pinf = 1.0;
    }
    if !(0.0..=1.0).contains(&pars.pinf) {
        return Err(invalid("ModelParams::solve: pinf must be within [0, 1]".to_string()));
    }

    for (name, val) in [("ttpr", pars.ttpr), ("mtpr", pars.mtpr)] {
        if known(val) && !(0.0..=1.0).contains(&val) {
            return Err(invalid(format!(
                "ModelParams::solve: {name} must be within [0, 1]"
            )));
        }
    }
    if known(pars.tdeltat) && pars.tdeltat < 0.0 {
        return Err(invalid(
            "ModelParams::solve: tdeltat must be non-negative".to_string(),
        ));
    }

    if !(pars.tmax >= 0.0) {
        return Err(invalid("ModelParams::solve: tmax must be non-negative".to_string()));
    }
    if pars.nstart == 0 {
        return Err(invalid("ModelParams::solve: nstart must be at least 1".to_string()));
    }
    if pars.popsize > 0 {
        return Err(invalid(
            "ModelParams::solve: finite populations (popsize > 0) are not supported".to_string(),
        ));
    }
    if known(pars.lambdap) {
        return Err(invalid(
            "ModelParams::solve: lambdap requires a finite population and is not supported"
                .to_string(),
        ));
    }
    let pri_main = pars.pricommpertype & pri_period::MAIN != 0;
    let pri_alt = pars.q > 0.0 && pars.pricommpertype & pri_period::ALT != 0;
    if !pri_main && !pri_alt {
        return Err(invalid(
            "ModelParams::solve: every communicable period type was excluded for primaries"
                .to_string(),
        ));
    }

    Ok(())
}
