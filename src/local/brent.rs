//! Bounded scalar minimization (Brent's method).
//!
//! Golden-section steps guarantee progress; parabolic interpolation through
//! the three best points speeds up convergence on smooth objectives. Only
//! interior points of the interval are ever evaluated.
//!
//! # Reference
//!
//! Brent, R. P. (1973). *Algorithms for Minimization without Derivatives*,
//! Chapter 5. Prentice-Hall.

use crate::error::TuneError;

/// Result of [`minimize_bounded`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    /// Best point found.
    pub x: f64,
    /// Objective value at `x`.
    pub fx: f64,
    /// Number of objective evaluations.
    pub evaluations: usize,
    /// False if the evaluation budget ran out first.
    pub converged: bool,
}

/// Minimizes `f` over `[lower, upper]` to absolute tolerance `xtol`.
///
/// Objective errors abort the search and are returned unchanged. An empty
/// or NaN interval fails with [`TuneError::EmptyInterval`], a zero budget
/// with [`TuneError::InvalidConfig`], before `f` is called.
pub fn minimize_bounded<F, E>(
    mut f: F,
    lower: f64,
    upper: f64,
    xtol: f64,
    max_evaluations: usize,
) -> Result<Minimum, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<TuneError>,
{
    if lower.is_nan() || upper.is_nan() || lower > upper {
        return Err(TuneError::EmptyInterval { lower, upper }.into());
    }
    if max_evaluations == 0 {
        return Err(TuneError::InvalidConfig("max_evaluations must be at least 1".into()).into());
    }

    let sqrt_eps = 2.2e-16f64.sqrt();
    let golden_mean = 0.5 * (3.0 - 5.0f64.sqrt());

    let (mut a, mut b) = (lower, upper);
    let mut fulc = a + golden_mean * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat = 0.0f64;
    let mut e = 0.0f64;

    let mut fx = f(xf)?;
    let mut evaluations = 1;
    let mut ffulc = fx;
    let mut fnfc = fx;

    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + xtol / 3.0;
    let mut tol2 = 2.0 * tol1;
    let mut converged = true;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        if evaluations >= max_evaluations {
            converged = false;
            break;
        }

        let mut golden = true;

        if e.abs() > tol1 {
            // Parabola through (xf, fx), (nfc, fnfc), (fulc, ffulc).
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = tol1 * sign_or_one(xm - xf);
                }
                golden = false;
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = golden_mean * e;
        }

        let x = xf + sign_or_one(rat) * rat.abs().max(tol1);
        let fu = f(x)?;
        evaluations += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + xtol / 3.0;
        tol2 = 2.0 * tol1;
    }

    Ok(Minimum {
        x: xf,
        fx,
        evaluations,
        converged,
    })
}

fn sign_or_one(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}
