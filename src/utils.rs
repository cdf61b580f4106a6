//! Shared constants and the two numeric primitives the per-step pipeline
//! leans on repeatedly: piecewise-linear segment lookup and the closed-form
//! cubic solve used when road load outstrips available traction.

/// Standard gravity, m/s^2.
pub const GRAVITY_MPS2: f64 = 9.80665;
/// Sea-level air density, kg/m^3.
pub const AIR_DENSITY_KG_PER_M3: f64 = 1.2;
/// mph per m/s.
pub const MPH_PER_MPS: f64 = 2.2369363;
/// Meters per mile.
pub const M_PER_MI: f64 = 1609.34;
/// kWh per gallon-of-gasoline-equivalent.
pub const KWH_PER_GGE: f64 = 33.7;
/// Shape parameters of the regen-control-limit curve; fixed across vehicles.
pub const REGEN_A: f64 = 500.0;
pub const REGEN_B: f64 = 0.99;

/// Largest index `k` such that `arr[k] <= x`, clamped to `[0, arr.len() - 2]`.
///
/// `arr` must be non-decreasing and have at least two elements. The `-0.01`
/// margin keeps `x == arr[last]` from walking off the end of the table.
pub fn segment_index(arr: &[f64], x: f64) -> usize {
    let n = arr.len();
    debug_assert!(n >= 2, "segment_index needs at least two breakpoints");
    let cap = x.min(arr[n - 1] - 0.01);
    let mut k = 0usize;
    for (i, &v) in arr.iter().enumerate() {
        if v <= cap {
            k = i;
        } else {
            break;
        }
    }
    k.min(n - 2)
}

/// Linear interpolation of `y` over breakpoints `x` at query point `xq`,
/// clamped to the endpoint values outside `[x[0], x[last]]`.
pub fn interp(xq: f64, x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    if xq <= x[0] {
        return y[0];
    }
    if xq >= x[x.len() - 1] {
        return y[y.len() - 1];
    }
    let k = segment_index(x, xq);
    let (x0, x1) = (x[k], x[k + 1]);
    let (y0, y1) = (y[k], y[k + 1]);
    if (x1 - x0).abs() < f64::EPSILON {
        y0
    } else {
        y0 + (xq - x0) / (x1 - x0) * (y1 - y0)
    }
}

/// `n` evenly spaced points from `start` to `stop`, inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![start];
    }
    let step = (stop - start) / (n as f64 - 1.0);
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Trapezoidal integral of `y` sampled at `x`.
pub fn trapz(y: &[f64], x: &[f64]) -> f64 {
    debug_assert_eq!(y.len(), x.len());
    y.windows(2)
        .zip(x.windows(2))
        .map(|(yw, xw)| 0.5 * (yw[0] + yw[1]) * (xw[1] - xw[0]))
        .sum()
}

/// Real roots of `a3*v^3 + a2*v^2 + a1*v + a0 = 0`, via Cardano's formula on
/// the depressed cubic. Falls back to quadratic/linear solves when leading
/// coefficients vanish. Returns between 1 and 3 roots; never empty unless
/// every coefficient is (numerically) zero.
pub fn real_cubic_roots(a3: f64, a2: f64, a1: f64, a0: f64) -> Vec<f64> {
    const TINY: f64 = 1e-12;
    if a3.abs() < TINY {
        return real_quadratic_roots(a2, a1, a0);
    }
    // normalize to v^3 + b*v^2 + c*v + d = 0
    let b = a2 / a3;
    let c = a1 / a3;
    let d = a0 / a3;
    // depress: v = t - b/3
    let shift = b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b.powi(3) / 27.0 - b * c / 3.0 + d;
    let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    if disc > TINY {
        let sqrt_disc = disc.sqrt();
        let u = cbrt(-q / 2.0 + sqrt_disc);
        let v = cbrt(-q / 2.0 - sqrt_disc);
        vec![u + v - shift]
    } else if disc.abs() <= TINY {
        // repeated real roots
        let u = cbrt(-q / 2.0);
        vec![2.0 * u - shift, -u - shift]
    } else {
        // three distinct real roots, trigonometric form
        let r = (-(p / 3.0).powi(3)).sqrt();
        let phi = (-q / (2.0 * r)).clamp(-1.0, 1.0).acos();
        let m = 2.0 * (-p / 3.0).sqrt();
        (0..3)
            .map(|k| m * ((phi + 2.0 * std::f64::consts::PI * k as f64) / 3.0).cos() - shift)
            .collect()
    }
}

fn cbrt(x: f64) -> f64 {
    x.signum() * x.abs().powf(1.0 / 3.0)
}

fn real_quadratic_roots(a2: f64, a1: f64, a0: f64) -> Vec<f64> {
    const TINY: f64 = 1e-12;
    if a2.abs() < TINY {
        if a1.abs() < TINY {
            return vec![];
        }
        return vec![-a0 / a1];
    }
    let disc = a1 * a1 - 4.0 * a2 * a0;
    if disc < 0.0 {
        vec![]
    } else {
        let sq = disc.sqrt();
        vec![(-a1 + sq) / (2.0 * a2), (-a1 - sq) / (2.0 * a2)]
    }
}

/// Pick the real root closest to `target`, after clamping every candidate to
/// `[lo, hi]`. Returns `None` if `roots` is empty (no finite root).
pub fn closest_clamped_root(roots: &[f64], target: f64, lo: f64, hi: f64) -> Option<f64> {
    roots
        .iter()
        .copied()
        .map(|r| r.clamp(lo, hi))
        .min_by(|a, b| {
            (a - target)
                .abs()
                .partial_cmp(&(b - target).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_index_clamps_to_last_segment() {
        let arr = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(segment_index(&arr, 10.0), 2);
        assert_eq!(segment_index(&arr, 0.0), 0);
        assert_eq!(segment_index(&arr, 1.5), 1);
    }

    #[test]
    fn interp_matches_breakpoints() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 10.0, 20.0];
        assert!((interp(0.5, &x, &y) - 5.0).abs() < 1e-9);
        assert!((interp(-1.0, &x, &y) - 0.0).abs() < 1e-9);
        assert!((interp(5.0, &x, &y) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn cubic_roots_find_known_root() {
        // (v - 2)(v - 3)(v - 5) = v^3 - 10v^2 + 31v - 30
        let roots = real_cubic_roots(1.0, -10.0, 31.0, -30.0);
        assert_eq!(roots.len(), 3);
        let mut sorted = roots.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((sorted[0] - 2.0).abs() < 1e-6);
        assert!((sorted[1] - 3.0).abs() < 1e-6);
        assert!((sorted[2] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn closest_clamped_root_picks_nearest() {
        let roots = [1.0, 10.0, -5.0];
        let picked = closest_clamped_root(&roots, 9.0, 0.0, 20.0).unwrap();
        assert!((picked - 10.0).abs() < 1e-9);
    }
}
