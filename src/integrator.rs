//! C7: rolls this step's achieved powers forward into the state carried to
//! the next step — battery SOC, cumulative fuel burned, and the fuel
//! converter's continuous-run clock the forced-on rule in
//! [crate::controller] checks.

use crate::cycle::Cycle;
use crate::step_state::StepState;
use crate::vehicle::Vehicle;

/// Update `ess_cur_kwh[i]`, `soc[i]`, `fs_kwh_out_ach[i]`, and `fc_time_on[i]`
/// from this step's achieved powers.
pub fn integrate(state: &mut StepState, veh: &Vehicle, cyc: &Cycle, i: usize) {
    let p = &veh.params;
    let dt_h = cyc.dt()[i] / 3.6e3;

    if p.max_ess_kwh > 0.0 {
        let rt_eff_sqrt = p.ess_round_trip_eff.sqrt();
        state.ess_cur_kwh[i] = if state.ess_kw_out_ach[i] < 0.0 {
            state.ess_cur_kwh[i - 1] - state.ess_kw_out_ach[i] * dt_h * rt_eff_sqrt
        } else {
            state.ess_cur_kwh[i - 1] - state.ess_kw_out_ach[i] * dt_h / rt_eff_sqrt
        };
        state.soc[i] = (state.ess_cur_kwh[i] / p.max_ess_kwh).clamp(0.0, 1.0);
    } else {
        state.ess_cur_kwh[i] = 0.0;
        state.soc[i] = state.soc[i - 1];
    }

    state.fs_kwh_out_ach[i] = state.fs_kwh_out_ach[i - 1] + state.fs_kw_out_ach[i] * dt_h;

    state.fc_time_on[i] = if state.fc_kw_out_ach[i] > 0.0 {
        state.fc_time_on[i - 1] + cyc.dt()[i]
    } else {
        0.0
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleRow;
    use crate::vehicle::fixtures;

    fn one_step_cycle() -> Cycle {
        Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 10.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap()
    }

    #[test]
    fn discharge_reduces_soc() {
        let veh = fixtures::hev();
        let cyc = one_step_cycle();
        let mut state = StepState::new(2);
        state.soc[0] = 0.6;
        state.ess_cur_kwh[0] = 0.6 * veh.params.max_ess_kwh;
        state.ess_kw_out_ach[1] = 10.0;
        integrate(&mut state, &veh, &cyc, 1);
        assert!(state.soc[1] < state.soc[0]);
    }

    #[test]
    fn charge_increases_soc() {
        let veh = fixtures::hev();
        let cyc = one_step_cycle();
        let mut state = StepState::new(2);
        state.soc[0] = 0.4;
        state.ess_cur_kwh[0] = 0.4 * veh.params.max_ess_kwh;
        state.ess_kw_out_ach[1] = -10.0;
        integrate(&mut state, &veh, &cyc, 1);
        assert!(state.soc[1] > state.soc[0]);
    }

    #[test]
    fn fc_time_on_resets_when_fc_off() {
        let veh = fixtures::conv();
        let cyc = one_step_cycle();
        let mut state = StepState::new(2);
        state.fc_time_on[0] = 15.0;
        state.fc_kw_out_ach[1] = 0.0;
        integrate(&mut state, &veh, &cyc, 1);
        assert_eq!(state.fc_time_on[1], 0.0);
    }
}
