//! Canonical breakpoint efficiency curves used to build a vehicle's
//! `fcEffArray` and `mcFullEffArray` on construction. These are process-wide
//! read-only tables, matching the source's module-level calibration curves.

use crate::utils::{interp, linspace};

/// Breakpoints (fraction of max rated power) shared by every fuel-converter
/// type's efficiency curve.
const FC_PCT_POWER: [f64; 12] = [
    0.00, 0.005, 0.015, 0.04, 0.06, 0.10, 0.14, 0.20, 0.40, 0.60, 0.80, 1.00,
];

const EFF_SI: [f64; 12] = [
    0.10, 0.12, 0.16, 0.22, 0.28, 0.33, 0.35, 0.36, 0.35, 0.34, 0.32, 0.30,
];
const EFF_ATKINSON: [f64; 12] = [
    0.12, 0.16, 0.20, 0.26, 0.32, 0.36, 0.38, 0.39, 0.38, 0.37, 0.35, 0.33,
];
const EFF_DIESEL: [f64; 12] = [
    0.15, 0.18, 0.22, 0.28, 0.33, 0.37, 0.39, 0.40, 0.39, 0.38, 0.37, 0.36,
];
const EFF_FUEL_CELL: [f64; 12] = [
    0.30, 0.42, 0.50, 0.55, 0.58, 0.59, 0.59, 0.58, 0.56, 0.54, 0.52, 0.50,
];
const EFF_HD_DIESEL: [f64; 12] = [
    0.20, 0.24, 0.28, 0.34, 0.38, 0.42, 0.44, 0.45, 0.44, 0.43, 0.42, 0.40,
];

/// Breakpoints (fraction of max motor power) for the size-blended motor
/// baseline curves.
const MC_PCT_POWER: [f64; 11] = [
    0.00, 0.01, 0.02, 0.03, 0.05, 0.10, 0.20, 0.40, 0.60, 0.80, 1.00,
];
const SMALL_BASELINE_EFF: [f64; 11] = [
    0.0, 0.50, 0.60, 0.68, 0.74, 0.80, 0.85, 0.89, 0.91, 0.92, 0.93,
];
const LARGE_BASELINE_EFF: [f64; 11] = [
    0.0, 0.55, 0.65, 0.72, 0.78, 0.83, 0.88, 0.91, 0.93, 0.94, 0.95,
];
/// Ceiling the large-baseline curve is lifted to before blending, matching
/// the source's "modern_max" adjustment.
const MODERN_MAX: f64 = 0.97;

/// Number of bins resampled into `Vehicle::fc_kw_out_array`.
pub const FC_ARRAY_LEN: usize = 100;
/// Number of bins resampled into `Vehicle::mc_kw_out_array`.
pub const MC_ARRAY_LEN: usize = 101;

pub fn engine_baseline_curve(fc_eff_type: u8) -> anyhow::Result<&'static [f64; 12]> {
    Ok(match fc_eff_type {
        1 => &EFF_SI,
        2 => &EFF_ATKINSON,
        3 => &EFF_DIESEL,
        4 => &EFF_FUEL_CELL,
        5 => &EFF_HD_DIESEL,
        other => anyhow::bail!("unsupported fcEffType {other}"),
    })
}

/// Resample the canonical engine curve for `fc_eff_type` onto
/// `FC_ARRAY_LEN` uniform bins over `[0, max_fuel_conv_kw]`, adding
/// `fc_abs_eff_impr`. Returns `(fc_kw_out_array, fc_eff_array)`.
pub fn build_fc_eff_array(
    fc_eff_type: u8,
    max_fuel_conv_kw: f64,
    fc_abs_eff_impr: f64,
) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
    let baseline = engine_baseline_curve(fc_eff_type)?;
    let eff: Vec<f64> = baseline.iter().map(|e| e + fc_abs_eff_impr).collect();
    let input_kw_out: Vec<f64> = FC_PCT_POWER.iter().map(|p| p * max_fuel_conv_kw).collect();
    let fc_kw_out_array = linspace(0.0, max_fuel_conv_kw, FC_ARRAY_LEN);
    let fc_eff_array: Vec<f64> = fc_kw_out_array
        .iter()
        .map(|&kw| interp(kw, &input_kw_out, &eff))
        .collect();
    Ok((fc_kw_out_array, fc_eff_array))
}

/// Resample the size-blended motor baseline curve onto `MC_ARRAY_LEN`
/// uniform bins over `[0, max_motor_kw]`. Returns
/// `(mc_kw_out_array, mc_full_eff_array, mc_kw_in_array)`.
pub fn build_mc_eff_arrays(max_motor_kw: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let modern_diff = MODERN_MAX - LARGE_BASELINE_EFF.iter().cloned().fold(f64::MIN, f64::max);
    let large_adj: Vec<f64> = LARGE_BASELINE_EFF.iter().map(|e| e + modern_diff).collect();
    let blend = ((max_motor_kw - 7.5) / 67.5).clamp(0.0, 1.0);
    let mc_eff_array: Vec<f64> = (0..MC_PCT_POWER.len())
        .map(|k| blend * large_adj[k] + (1.0 - blend) * SMALL_BASELINE_EFF[k])
        .collect();
    let input_kw_out: Vec<f64> = MC_PCT_POWER.iter().map(|p| p * max_motor_kw).collect();

    let mc_kw_out_array = linspace(0.0, max_motor_kw, MC_ARRAY_LEN);
    let mut mc_full_eff_array = vec![0.0; MC_ARRAY_LEN];
    for (m, &kw) in mc_kw_out_array.iter().enumerate().skip(1).take(MC_ARRAY_LEN - 2) {
        mc_full_eff_array[m] = interp(kw, &input_kw_out, &mc_eff_array);
    }
    mc_full_eff_array[0] = 0.0;
    mc_full_eff_array[MC_ARRAY_LEN - 1] = *mc_eff_array.last().unwrap();

    let mut mc_kw_in_array = vec![0.0; MC_ARRAY_LEN];
    for k in 1..MC_ARRAY_LEN {
        mc_kw_in_array[k] = mc_kw_out_array[k] / mc_full_eff_array[k];
    }
    (mc_kw_out_array, mc_full_eff_array, mc_kw_in_array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fc_array_is_monotone_length() {
        let (kw_out, eff) = build_fc_eff_array(1, 100.0, 0.0).unwrap();
        assert_eq!(kw_out.len(), FC_ARRAY_LEN);
        assert_eq!(eff.len(), FC_ARRAY_LEN);
        assert!(eff.iter().all(|&e| (0.0..=1.0).contains(&e)));
    }

    #[test]
    fn mc_arrays_zero_at_origin() {
        let (kw_out, full_eff, kw_in) = build_mc_eff_arrays(80.0);
        assert_eq!(kw_out[0], 0.0);
        assert_eq!(full_eff[0], 0.0);
        assert_eq!(kw_in[0], 0.0);
        assert!(full_eff[MC_ARRAY_LEN - 1] > 0.0);
    }

    #[test]
    fn unsupported_fc_eff_type_errors() {
        assert!(build_fc_eff_array(9, 100.0, 0.0).is_err());
    }
}
