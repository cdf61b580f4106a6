//! C8: drives a [Cycle] against a [Vehicle] through the C4-C7 pipeline,
//! picking the initial SOC appropriate to the powertrain and, for charge
//! -sustaining hybrids, iterating that initial SOC until the pack ends the
//! cycle where it started.

use crate::controller::{set_fc_forced_state, set_hybrid_cont_calcs, set_hybrid_cont_decisions};
use crate::cycle::Cycle;
use crate::error::SimError;
use crate::integrator::integrate;
use crate::limits::set_comp_lims;
use crate::post_process::RunResult;
use crate::road_load::{set_power_calcs, set_speed_dist_calcs};
use crate::step_state::StepState;
use crate::vehicle::{PowertrainType, Vehicle};

/// Maximum number of charge-balance iterations before giving up.
pub const MAX_CHARGE_BALANCE_ITERS: u32 = 30;

/// Runs a single (cycle, vehicle) simulation.
pub struct Driver<'a> {
    pub cyc: &'a Cycle,
    pub veh: &'a Vehicle,
}

impl<'a> Driver<'a> {
    pub fn new(cyc: &'a Cycle, veh: &'a Vehicle) -> Self {
        Self { cyc, veh }
    }

    /// Run the cycle. `init_soc_override`, if given, seeds the initial SOC
    /// instead of the powertrain's default; an out-of-range override is
    /// logged and ignored rather than failing the run. Charge-balance
    /// non-convergence is likewise non-fatal: the last completed run is
    /// returned with `RunResult::converged` set to `false`. Only a
    /// numerically unsolvable step ([SimError::NumericFailure]) is fatal.
    pub fn run(&self, init_soc_override: Option<f64>) -> Result<RunResult, SimError> {
        let p = &self.veh.params;
        let default_init_soc = match self.veh.veh_pt_type {
            PowertrainType::Conventional | PowertrainType::Hybrid => (p.max_soc + p.min_soc) / 2.0,
            PowertrainType::PlugInHybrid | PowertrainType::BatteryElectric => p.max_soc,
        };
        let init_soc = match init_soc_override {
            Some(s) if (0.0..=1.0).contains(&s) => s,
            Some(s) => {
                log::warn!("{}", SimError::InvalidInitialSoc(s));
                default_init_soc
            }
            None => default_init_soc,
        };

        if self.veh.veh_pt_type != PowertrainType::Hybrid {
            let state = self.run_one_pass(init_soc)?;
            return Ok(RunResult { state, converged: true });
        }

        let mut soc_guess = init_soc;
        let mut state = self.run_one_pass(soc_guess)?;
        let mut converged = false;
        for iter in 0..MAX_CHARGE_BALANCE_ITERS {
            let fuel_kj: f64 = state
                .fs_kw_out_ach
                .iter()
                .zip(self.cyc.dt())
                .map(|(kw, dt)| kw * dt)
                .sum();
            let roadway_chg_kj: f64 = state
                .roadway_chg_kw_out_ach
                .iter()
                .zip(self.cyc.dt())
                .map(|(kw, dt)| kw * dt)
                .sum();
            let denom = fuel_kj + roadway_chg_kj;
            let soc_delta = state.soc[state.len - 1] - state.soc[0];
            let ess2fuel_kwh = if denom.abs() > 1e-9 {
                (soc_delta * p.max_ess_kwh * 3600.0 / denom).abs()
            } else {
                0.0
            };
            log::debug!(
                "charge-balance iter {iter}: soc0={:.4} socN={:.4} ess2fuel={:.6}",
                state.soc[0],
                state.soc[state.len - 1],
                ess2fuel_kwh
            );
            if ess2fuel_kwh <= p.ess_to_fuel_ok_error {
                converged = true;
                break;
            }
            soc_guess = state.soc[state.len - 1].clamp(0.0, 1.0);
            state = self.run_one_pass(soc_guess)?;
        }

        if !converged {
            log::warn!("{}", SimError::NonConvergence(MAX_CHARGE_BALANCE_ITERS));
            return Ok(RunResult { state, converged: false });
        }

        // Re-run once more with the converged initial SOC, matching the
        // source's habit of never returning an iteration's own trial state.
        let state = self.run_one_pass(soc_guess)?;
        Ok(RunResult { state, converged: true })
    }

    fn run_one_pass(&self, init_soc: f64) -> Result<StepState, SimError> {
        let mut state = StepState::new(self.cyc.len());
        state.soc[0] = init_soc;
        state.ess_cur_kwh[0] = init_soc * self.veh.params.max_ess_kwh;
        state.mps_ach[0] = self.cyc.v_mps()[0];
        state.mph_ach[0] = self.cyc.v_mph()[0];

        for i in 1..self.cyc.len() {
            set_comp_lims(&mut state, self.veh, self.cyc, i);
            set_power_calcs(&mut state, self.veh, self.cyc, i);
            set_speed_dist_calcs(&mut state, self.veh, self.cyc, i)?;
            set_hybrid_cont_calcs(&mut state, self.veh, self.cyc, i);
            set_fc_forced_state(&mut state, self.veh, self.cyc, i);
            set_hybrid_cont_decisions(&mut state, self.veh, self.cyc, i);
            integrate(&mut state, self.veh, self.cyc, i);
        }
        Ok(state)
    }
}
