//! C4: per-step component power limits. Runs first in the pipeline so C5's
//! road-load solve and C6's hybrid dispatch both see this step's ceilings.

use crate::cycle::Cycle;
use crate::step_state::StepState;
use crate::utils::GRAVITY_MPS2;
use crate::vehicle::Vehicle;

/// Fill every `cur_max_*`/`ess_cap_lim_*` slot of `state[i]` from `state[i-1]`
/// and the vehicle's static ratings. Mirrors the source's ramp-rate-limited
/// cascade: fuel storage -> fuel converter -> battery -> electrical bus ->
/// motor -> driveline. Also carries the per-step misc calcs (aux draw, the
/// high-accel engine-on tag, traction-limited top speed) the source computes
/// just ahead of its own component-limit pass, since the traction and
/// trans-out limits below need them this same step.
pub fn set_comp_lims(state: &mut StepState, veh: &Vehicle, cyc: &Cycle, i: usize) {
    let p = &veh.params;
    let dt = cyc.dt()[i];

    state.aux_in_kw[i] = if veh.no_elec_aux { 0.0 } else { p.aux_kw };
    state.reached_buff[i] = state.soc[i - 1] >= p.min_soc + p.perc_high_acc_buf;
    state.high_acc_fc_on_tag[i] = state.soc[i - 1] < p.min_soc
        || (state.high_acc_fc_on_tag[i - 1] && !state.reached_buff[i]);
    state.max_trac_mps[i] = state.mps_ach[i - 1] + veh.max_trac_mps2 * dt;

    state.cur_max_fs_kw_out[i] = p.max_fuel_stor_kw.min(
        state.fs_kw_out_ach[i - 1] + (p.max_fuel_stor_kw / p.fuel_stor_secs_to_peak_pwr) * dt,
    );
    let fc_trans_lim_kw =
        state.fc_kw_out_ach[i - 1] + (p.max_fuel_conv_kw / p.fuel_conv_secs_to_peak_pwr) * dt;
    state.cur_max_fc_kw_out[i] = p
        .max_fuel_conv_kw
        .min(state.cur_max_fs_kw_out[i])
        .min(fc_trans_lim_kw);

    state.ess_cap_lim_dischg_kw[i] = if p.max_ess_kwh == 0.0 || state.soc[i - 1] < p.min_soc {
        0.0
    } else {
        p.max_ess_kwh * p.ess_round_trip_eff.sqrt() * 3.6e3 * (state.soc[i - 1] - p.min_soc) / dt
    };
    state.cur_max_ess_kw_out[i] = p.max_ess_kw.min(state.ess_cap_lim_dischg_kw[i]);

    state.ess_cap_lim_chg_kw[i] = if p.max_ess_kwh == 0.0 || p.max_ess_kw == 0.0 {
        0.0
    } else {
        ((p.max_soc - state.soc[i - 1]) * p.max_ess_kwh / p.ess_round_trip_eff.sqrt()
            / (dt / 3.6e3))
            .max(0.0)
    };
    state.cur_max_ess_chg_kw[i] = state.ess_cap_lim_chg_kw[i].min(p.max_ess_kw);

    state.cur_max_roadway_chg_kw[i] = p.max_roadway_chg_kw[cyc.road_chg_class()[i]];

    state.cur_max_elec_kw[i] = if p.fc_eff_type == 4 {
        state.cur_max_fc_kw_out[i] + state.cur_max_roadway_chg_kw[i] + state.cur_max_ess_kw_out[i]
            - state.aux_in_kw[i]
    } else {
        state.cur_max_roadway_chg_kw[i] + state.cur_max_ess_kw_out[i] - state.aux_in_kw[i]
    }
    .max(0.0);

    state.cur_max_avail_elec_kw[i] = state.cur_max_elec_kw[i].min(veh.mc_max_elec_in_kw);

    state.mc_elec_in_lim_kw[i] = if state.cur_max_elec_kw[i] > 0.0 {
        if state.cur_max_avail_elec_kw[i] >= veh.mc_max_elec_in_kw - 1e-9 {
            veh.mc_kw_out_array.last().copied().unwrap_or(0.0).min(p.max_motor_kw)
        } else {
            let k = crate::utils::segment_index(&veh.mc_kw_in_array, state.cur_max_avail_elec_kw[i]);
            veh.mc_kw_out_array[k].min(p.max_motor_kw)
        }
    } else {
        0.0
    };

    let mc_transi_lim_kw =
        state.mc_mech_kw_out_ach[i - 1].abs() + (p.max_motor_kw / p.motor_secs_to_peak_pwr) * dt;
    // stopStart vehicles carry no motor assist at all; the engine alone
    // handles the idle-stop/restart transient instead.
    let stop_start_motor_kw = if p.stop_start { 0.0 } else { p.max_motor_kw };
    state.cur_max_mc_kw_out[i] = state
        .mc_elec_in_lim_kw[i]
        .min(mc_transi_lim_kw)
        .min(stop_start_motor_kw)
        .max(-p.max_motor_kw);

    state.cur_max_mc_elec_kw_in[i] = if state.cur_max_mc_kw_out[i] == 0.0 {
        0.0
    } else if state.cur_max_mc_kw_out[i] >= p.max_motor_kw - 1e-9 {
        state.cur_max_mc_kw_out[i] / veh.mc_full_eff_array.last().copied().unwrap_or(1.0)
    } else {
        let k = crate::utils::segment_index(&veh.mc_kw_out_array, state.cur_max_mc_kw_out[i]).max(1);
        state.cur_max_mc_kw_out[i] / veh.mc_full_eff_array[k]
    };

    let ess_lim_mc_regen_kw = if p.max_motor_kw == 0.0 || state.cur_max_ess_chg_kw[i] == 0.0 {
        0.0
    } else {
        let arg = state.cur_max_ess_chg_kw[i] - state.cur_max_roadway_chg_kw[i];
        if arg >= p.max_motor_kw - 1e-9 {
            p.max_motor_kw.min(state.cur_max_ess_chg_kw[i] / veh.mc_full_eff_array.last().copied().unwrap_or(1.0))
        } else {
            let k = crate::utils::segment_index(&veh.mc_kw_out_array, arg).max(1);
            p.max_motor_kw.min(state.cur_max_ess_chg_kw[i] / veh.mc_full_eff_array[k])
        }
    };
    state.cur_max_mech_mc_kw_in[i] = ess_lim_mc_regen_kw.min(p.max_motor_kw);

    state.cur_max_trac_kw[i] = (p.wheel_coef_of_fric
        * p.drive_axle_weight_frac
        * veh.veh_kg
        * GRAVITY_MPS2
        / (1.0 + (p.veh_cg_m * p.wheel_coef_of_fric) / p.wheel_base_m)
        / 1000.0)
        * state.max_trac_mps[i];

    let high_acc = state.high_acc_fc_on_tag[i];
    let aux_term = if veh.no_elec_sys || veh.no_elec_aux || high_acc {
        state.aux_in_kw[i]
    } else {
        state.cur_max_elec_kw[i].min(0.0)
    };
    let mc_and_fc_kw = if p.fc_eff_type == 4 {
        state.cur_max_mc_kw_out[i]
    } else {
        state.cur_max_mc_kw_out[i] + state.cur_max_fc_kw_out[i]
    };
    state.cur_max_trans_kw_out[i] = ((mc_and_fc_kw - aux_term) * p.trans_eff)
        .min(state.cur_max_trac_kw[i] / p.trans_eff);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::fixtures;

    fn one_step_cycle() -> Cycle {
        use crate::cycle::CycleRow;
        Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 10.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap()
    }

    #[test]
    fn fc_power_ramps_from_zero() {
        let veh = fixtures::conv();
        let cyc = one_step_cycle();
        let mut state = StepState::new(2);
        state.soc[0] = 0.5;
        set_comp_lims(&mut state, &veh, &cyc, 1);
        assert!(state.cur_max_fc_kw_out[1] > 0.0);
        assert!(state.cur_max_fc_kw_out[1] <= veh.params.max_fuel_conv_kw);
    }

    #[test]
    fn ess_discharge_limit_zero_below_min_soc() {
        let veh = fixtures::hev();
        let cyc = one_step_cycle();
        let mut state = StepState::new(2);
        state.soc[0] = veh.params.min_soc - 0.01;
        set_comp_lims(&mut state, &veh, &cyc, 1);
        assert_eq!(state.ess_cap_lim_dischg_kw[1], 0.0);
        assert_eq!(state.cur_max_ess_kw_out[1], 0.0);
    }

    #[test]
    fn roadway_charge_limit_follows_road_class() {
        let mut veh = fixtures::bev();
        veh.params.max_roadway_chg_kw[1] = 20.0;
        let mut cyc = one_step_cycle();
        // manually force class via a fresh cycle sharing the same shape
        use crate::cycle::CycleRow;
        cyc = Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 10.0, grade: 0.0, road_chg_class: 1 },
        ])
        .unwrap();
        let mut state = StepState::new(2);
        state.soc[0] = 0.5;
        set_comp_lims(&mut state, &veh, &cyc, 1);
        assert_eq!(state.cur_max_roadway_chg_kw[1], 20.0);
    }
}
