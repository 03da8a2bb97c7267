/// ==============================================================================================
/// ================================= Bracketed Root Finding =====================================
/// ==============================================================================================

use std::io::{Error, ErrorKind, Result};

use num_traits::Float;

/// Find a root of `f` inside the bracket `[lo, hi]` by bisection.
///     Termination:
///         - |f(mid)| <= epsf, or
///         - the bracket width shrinks below epsf * max(|lo|, |hi|, 1).
///     Requires f(lo) and f(hi) of opposite signs (an endpoint already within
///     epsf is returned as-is). Fails after `maxiter` iterations.
pub fn bisect<T, F>(mut f: F, mut lo: T, mut hi: T, epsf: T, maxiter: u32) -> Result<T>
where
    T: Float + std::fmt::Display,
    F: FnMut(T) -> T,
{
    let flo = f(lo);
    let mut fhi = f(hi);

    if flo.abs() <= epsf {
        return Ok(lo);
    }
    if fhi.abs() <= epsf {
        return Ok(hi);
    }
    if (flo > T::zero()) == (fhi > T::zero()) {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("bisect: no sign change over [{lo}, {hi}]"),
        ));
    }

    let one = T::one();
    let half = one / (one + one);
    let wtol = epsf * lo.abs().max(hi.abs()).max(one);

    for _ in 0..maxiter {
        let mid = (lo + hi) * half;
        let fmid = f(mid);

        if fmid.abs() <= epsf || (hi - lo).abs() <= wtol {
            return Ok(mid);
        }

        if (fmid > T::zero()) == (fhi > T::zero()) {
            hi = mid;
            fhi = fmid;
        } else {
            lo = mid;
        }
    }

    Err(Error::new(
        ErrorKind::InvalidInput,
        format!("bisect: no convergence in {maxiter} iterations over [{lo}, {hi}]"),
    ))
}

/// Grow `hi` geometrically away from `lo` until `f(hi)` changes sign.
///     Returns the first hi with f(hi) on the opposite side of zero from
///     f(lo). Fails when `cap` is exceeded.
pub fn grow_upper<T, F>(mut f: F, lo: T, mut hi: T, factor: T, cap: T) -> Result<T>
where
    T: Float + std::fmt::Display,
    F: FnMut(T) -> T,
{
    let want = f(lo) <= T::zero();

    loop {
        if (f(hi) > T::zero()) == want {
            return Ok(hi);
        }
        hi = hi * factor;
        if hi > cap {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("grow_upper: no sign change below {cap}"),
            ));
        }
    }
}

/// Shrink `lo` geometrically toward zero until `f(lo)` changes sign.
///     Counterpart of `grow_upper` for left-open brackets. Fails when `lo`
///     drops below `floor`.
pub fn shrink_lower<T, F>(mut f: F, mut lo: T, hi: T, factor: T, floor: T) -> Result<T>
where
    T: Float + std::fmt::Display,
    F: FnMut(T) -> T,
{
    let want = f(hi) <= T::zero();

    loop {
        if (f(lo) > T::zero()) == want {
            return Ok(lo);
        }
        lo = lo / factor;
        if lo < floor {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("shrink_lower: no sign change above {floor}"),
            ));
        }
    }
}
