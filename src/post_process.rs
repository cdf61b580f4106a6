//! C9: turns a finished [StepState] trace into the headline results —
//! fuel/electric economy, an energy-balance audit, a battery-wear proxy, and
//! acceleration statistics — without re-running the pipeline.

use crate::cycle::Cycle;
use crate::step_state::StepState;
use crate::utils::{trapz, KWH_PER_GGE, MPH_PER_MPS};
use crate::vehicle::Vehicle;

/// The outcome of [crate::driver::Driver::run]: the full step trace plus
/// whether the HEV charge-balance loop (if applicable) actually converged.
/// A `false` flag is a warning, not a failure — `state` is still a complete,
/// physically consistent run, just not one where starting and ending SOC
/// line up within `essToFuelOkError`.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub state: StepState,
    pub converged: bool,
}

impl RunResult {
    pub fn summary(&self, veh: &Vehicle, cyc: &Cycle) -> Summary {
        summarize(&self.state, veh, cyc)
    }

    pub fn diagnostics(&self, cyc: &Cycle) -> Diagnostics {
        diagnostics(&self.state, cyc)
    }
}

/// Headline fuel/electric economy and distance results for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub dist_mi: f64,
    pub fuel_kwh: f64,
    pub ess_dischg_kwh: f64,
    pub mpgge: f64,
    pub kwh_per_mi: f64,
    pub soc_start: f64,
    pub soc_end: f64,
    /// Seconds to reach 60 mph from a standing start; `None` if the run
    /// never reaches that speed.
    pub zero_to_sixty_secs: Option<f64>,
    /// Mean acceleration over the run, in mph/s.
    pub avg_accel_mphps: f64,
}

/// Trapezoidal energy audit of every named power series over the cycle,
/// split into the energy delivered (positive) and absorbed (negative).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyFlow {
    pub positive_kj: f64,
    pub negative_kj: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub fc: EnergyFlow,
    pub mc: EnergyFlow,
    pub ess: EnergyFlow,
    pub trans: EnergyFlow,
    /// `(energy in) - (energy out)` across fuel storage, fuel converter,
    /// motor/generator, and battery; should be within numerical noise of
    /// zero for a correctly dispatched step sequence.
    pub imbalance_kj: f64,
}

fn flow(series: &[f64], t_s: &[f64]) -> EnergyFlow {
    let pos: Vec<f64> = series.iter().map(|&v| v.max(0.0)).collect();
    let neg: Vec<f64> = series.iter().map(|&v| v.min(0.0)).collect();
    EnergyFlow {
        positive_kj: trapz(&pos, t_s),
        negative_kj: trapz(&neg, t_s),
    }
}

pub fn summarize(state: &StepState, veh: &Vehicle, cyc: &Cycle) -> Summary {
    let n = state.len - 1;
    let dist_mi = state.dist_mi[n];
    let fuel_kwh = state.fs_kwh_out_ach[n];
    let ess_dischg_kwh = (state.soc[0] - state.soc[n]).max(0.0) * veh.params.max_ess_kwh;
    let fuel_gge = fuel_kwh / KWH_PER_GGE;
    let mpgge = if fuel_gge > 1e-9 { dist_mi / fuel_gge } else { f64::INFINITY };
    let kwh_per_mi = if dist_mi > 1e-9 {
        (ess_dischg_kwh.max(0.0)) / dist_mi
    } else {
        0.0
    };
    let accel = accel_stats(state, cyc);
    Summary {
        dist_mi,
        fuel_kwh,
        ess_dischg_kwh,
        mpgge,
        kwh_per_mi,
        soc_start: state.soc[0],
        soc_end: state.soc[n],
        zero_to_sixty_secs: accel.zero_to_sixty_s,
        avg_accel_mphps: accel.avg_accel_mps2 * MPH_PER_MPS,
    }
}

pub fn diagnostics(state: &StepState, cyc: &Cycle) -> Diagnostics {
    let t = cyc.t_s();
    let fc = flow(&state.fc_kw_out_ach, t);
    let mc = flow(&state.mc_mech_kw_out_ach, t);
    let ess = flow(&state.ess_kw_out_ach, t);
    let trans = flow(&state.trans_kw_in_ach, t);
    let fs_in = trapz(&state.fs_kw_out_ach, t);
    let fc_out = fc.positive_kj;
    let ess_out = ess.positive_kj + ess.negative_kj;
    let mc_out = mc.positive_kj + mc.negative_kj;
    let imbalance_kj = fs_in - fc_out - ess_out - mc_out;
    Diagnostics { fc, mc, ess, trans, imbalance_kj }
}

/// Battery-wear proxy: accumulated charge throughput and an approximate
/// percentage of calendar life consumed, per the pack's Arrhenius-style
/// `essLifeCoefA`/`essLifeCoefB` cycle-life curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryWear {
    pub add_kwh: f64,
    pub dod_cycs: f64,
    pub ess_perc_dead: f64,
}

pub fn battery_wear(state: &StepState, veh: &Vehicle) -> BatteryWear {
    let p = &veh.params;
    if p.max_ess_kwh <= 0.0 {
        return BatteryWear { add_kwh: 0.0, dod_cycs: 0.0, ess_perc_dead: 0.0 };
    }
    let add_kwh: f64 = state
        .ess_kw_out_ach
        .windows(2)
        .zip(state.soc.windows(2))
        .filter(|(_, soc)| soc[1] > soc[0])
        .map(|(ess, _)| -ess[1].min(0.0))
        .sum();
    let dod_cycs = add_kwh / (p.max_ess_kwh * (p.max_soc - p.min_soc)).max(1e-9);
    let ess_perc_dead = if dod_cycs > 1e-9 {
        (p.ess_life_coef_a.powf(1.0 / p.ess_life_coef_b)) / dod_cycs.powf(1.0 / p.ess_life_coef_b)
    } else {
        0.0
    };
    BatteryWear { add_kwh, dod_cycs, ess_perc_dead }
}

/// Estimate the fuel energy a non-charge-sustaining run (PHEV/BEV, or an
/// HEV run seeded away from its converged initial SOC) would have consumed
/// had its net battery draw instead been displaced by the fuel converter,
/// so different initial-SOC runs remain comparable on a fuel basis.
///
/// Approximation: net discharged battery energy is converted to fuel energy
/// at the cycle's achieved average fuel-converter efficiency, falling back
/// to the vehicle's peak tabulated efficiency if the FC never ran.
pub fn estimate_corrected_fuel_kj(state: &StepState, veh: &Vehicle, cyc: &Cycle) -> f64 {
    let n = state.len - 1;
    let fuel_kj = trapz(&state.fs_kw_out_ach, cyc.t_s());
    let net_ess_discharge_kwh = (state.soc[0] - state.soc[n]) * veh.params.max_ess_kwh;
    if net_ess_discharge_kwh <= 0.0 {
        return fuel_kj;
    }
    let fc_kw_in: f64 = trapz(&state.fc_kw_in_ach, cyc.t_s());
    let fc_kw_out: f64 = trapz(&state.fc_kw_out_ach, cyc.t_s());
    let avg_eff = if fc_kw_in > 1e-9 {
        fc_kw_out / fc_kw_in
    } else {
        veh.fc_eff_array.iter().cloned().fold(f64::MIN, f64::max)
    };
    let avg_eff = avg_eff.max(1e-3);
    fuel_kj + net_ess_discharge_kwh * 3600.0 / avg_eff
}

/// Elapsed time to reach 60 mph from a standing start, and the mean
/// acceleration over the run, both read off the achieved-speed trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelStats {
    pub zero_to_sixty_s: Option<f64>,
    pub avg_accel_mps2: f64,
}

pub fn accel_stats(state: &StepState, cyc: &Cycle) -> AccelStats {
    const SIXTY_MPH_MPS: f64 = 60.0 / MPH_PER_MPS;
    let t = cyc.t_s();
    let zero_to_sixty_s = state
        .mps_ach
        .iter()
        .position(|&v| v >= SIXTY_MPH_MPS)
        .map(|idx| t[idx]);
    let n = state.len - 1;
    let dv = state.mps_ach[n] - state.mps_ach[0];
    let dt = (t[n] - t[0]).max(1e-9);
    AccelStats { zero_to_sixty_s, avg_accel_mps2: dv / dt }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleRow;
    use crate::driver::Driver;
    use crate::vehicle::fixtures;

    fn short_cycle() -> Cycle {
        Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 5.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 2.0, v_mps: 8.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 3.0, v_mps: 5.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 4.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap()
    }

    #[test]
    fn conv_summary_has_finite_mpg() {
        let veh = fixtures::conv();
        let cyc = short_cycle();
        let result = Driver::new(&cyc, &veh).run(None).unwrap();
        let summary = result.summary(&veh, &cyc);
        assert!(summary.mpgge.is_finite());
        assert!(summary.dist_mi > 0.0);
    }

    #[test]
    fn battery_wear_zero_for_conv() {
        let veh = fixtures::conv();
        let cyc = short_cycle();
        let result = Driver::new(&cyc, &veh).run(None).unwrap();
        let wear = battery_wear(&result.state, &veh);
        assert_eq!(wear.add_kwh, 0.0);
    }

    #[test]
    fn diagnostics_available_from_run_result() {
        let veh = fixtures::hev();
        let cyc = short_cycle();
        let result = Driver::new(&cyc, &veh).run(None).unwrap();
        let diag = result.diagnostics(&cyc);
        assert!(diag.fc.positive_kj >= 0.0);
    }
}
