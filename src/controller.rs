//! C6: the hybrid supervisory controller. Decides, for each step, how much
//! of the driveline demand [crate::road_load] computed is served by the fuel
//! converter versus the battery/motor, subject to the SOC buffers and
//! forced-fuel-converter-on rules that keep a charge-sustaining hybrid from
//! drifting its battery flat or cycling the engine on and off every second.

use crate::cycle::Cycle;
use crate::step_state::StepState;
use crate::vehicle::{PowertrainType, Vehicle};

/// FC running because the driveline demand alone calls for it.
pub const FC_STATE_ENGINE_ONLY: u8 = 1;
/// FC held at max-efficiency output while the motor soaks up or fills the gap.
pub const FC_STATE_ENGINE_MAX_EFF_REGEN: u8 = 2;
/// Demand sits exactly at the FC's max-efficiency point; motor idle.
pub const FC_STATE_ALL_ELECTRIC: u8 = 3;
/// FC forced on below idle-equivalent demand; motor absorbs the excess.
pub const FC_STATE_ENGINE_FORCED_IDLE: u8 = 4;
/// Demand under the max-efficiency point; motor supplies the remainder.
pub const FC_STATE_ENGINE_PLUS_MOTOR: u8 = 5;
/// Demand above the FC's max-efficiency point (fuel-cell-type converters).
pub const FC_STATE_FUEL_CELL: u8 = 6;

fn mc_eff_by_kw_out(veh: &Vehicle, kw_out_mag: f64) -> f64 {
    let cap = veh.params.max_motor_kw;
    if kw_out_mag >= cap - 1e-9 {
        veh.mc_full_eff_array.last().copied().unwrap_or(1e-3)
    } else {
        let k = crate::utils::segment_index(&veh.mc_kw_out_array, kw_out_mag).max(1);
        veh.mc_full_eff_array[k]
    }
}

fn mc_eff_by_elec_in(veh: &Vehicle, elec_in_mag: f64) -> f64 {
    let cap = veh.mc_kw_in_array.last().copied().unwrap_or(0.0);
    if elec_in_mag >= cap - 1e-9 {
        veh.mc_full_eff_array.last().copied().unwrap_or(1e-3)
    } else {
        let k = crate::utils::segment_index(&veh.mc_kw_in_array, elec_in_mag).max(1);
        veh.mc_full_eff_array[k]
    }
}

fn mc_kw_in_by_kw_out_gap(veh: &Vehicle, kw_out_mag: f64) -> f64 {
    let cap = veh.params.max_motor_kw;
    if kw_out_mag >= cap - 1e-9 {
        veh.mc_kw_in_array.last().copied().unwrap_or(0.0)
    } else {
        let k = crate::utils::segment_index(&veh.mc_kw_out_array, kw_out_mag).max(1);
        veh.mc_kw_in_array[k]
    }
}

fn fc_eff_by_kw_out(veh: &Vehicle, kw_out: f64) -> f64 {
    let cap = veh.fc_max_out_kw;
    if kw_out >= cap - 1e-9 {
        veh.fc_eff_array.last().copied().unwrap_or(1e-3)
    } else {
        let k = crate::utils::segment_index(&veh.fc_kw_out_array, kw_out.min(cap - 1e-3)).max(1);
        veh.fc_eff_array[k]
    }
}

/// Compute SOC buffers, the all-electric feasibility tag, and the
/// max-fc-efficiency motor setpoint this step will be judged against.
pub fn set_hybrid_cont_calcs(state: &mut StepState, veh: &Vehicle, cyc: &Cycle, i: usize) {
    let p = &veh.params;
    let dt = cyc.dt()[i];
    let soc_prev = state.soc[i - 1];

    state.trans_kw_in_ach[i] = if state.trans_kw_out_ach[i] > 0.0 {
        state.trans_kw_out_ach[i] / p.trans_eff
    } else {
        state.trans_kw_out_ach[i] * p.trans_eff
    };

    state.min_mc_kw_2help_fc[i] = if state.cyc_met[i] == 1 {
        if p.fc_eff_type == 4 {
            state.trans_kw_in_ach[i].max(-state.cur_max_mech_mc_kw_in[i])
        } else {
            (state.trans_kw_in_ach[i] - state.cur_max_fc_kw_out[i])
                .max(-state.cur_max_mech_mc_kw_in[i])
        }
    } else {
        state.cur_max_mc_kw_out[i].max(-state.cur_max_mech_mc_kw_in[i])
    };

    // Regen buffer: how high SOC can climb before a downhill or stop has
    // nowhere left to put braking energy.
    state.regen_buff_soc[i] = if veh.no_elec_sys {
        0.0
    } else if p.charging_on {
        (p.max_soc - veh.max_regen_kwh / p.max_ess_kwh).max((p.max_soc + p.min_soc) / 2.0)
    } else {
        let v = cyc.v_mps()[i];
        ((p.max_ess_kwh * p.max_soc
            - 0.5 * veh.veh_kg * v * v / 1000.0 / 3600.0 * p.motor_peak_eff * p.max_regen)
            / p.max_ess_kwh)
            .max(p.min_soc)
    };
    if !veh.no_elec_sys && !p.charging_on {
        state.ess_regen_buff_dischg_kw[i] = state.cur_max_ess_kw_out[i]
            .min((soc_prev - state.regen_buff_soc[i]).max(0.0) * p.max_ess_kwh * 3.6e3 / dt);
        state.max_ess_regen_buff_chg_kw[i] =
            ((state.regen_buff_soc[i] - soc_prev).max(0.0) * p.max_ess_kwh * 3.6e3 / dt)
                .min(state.cur_max_ess_chg_kw[i]);
    } else {
        state.ess_regen_buff_dischg_kw[i] = 0.0;
        state.max_ess_regen_buff_chg_kw[i] = 0.0;
    }

    // Accel buffer: how low SOC can sag before a following hard-accel event
    // runs out of assist.
    state.accel_buff_soc[i] = if veh.no_elec_sys {
        0.0
    } else {
        let max_accel_mps = p.max_accel_buffer_mph / crate::utils::MPH_PER_MPS;
        let v = cyc.v_mps()[i];
        let useable = (p.max_accel_buffer_perc_of_useable_soc * (p.max_soc - p.min_soc))
            .min(veh.max_regen_kwh / p.max_ess_kwh);
        (((max_accel_mps * max_accel_mps - v * v) / (max_accel_mps * max_accel_mps)) * useable
            + p.min_soc)
            .clamp(p.min_soc, p.max_soc)
    };
    if !veh.no_elec_sys {
        state.ess_accel_buff_chg_kw[i] =
            (state.accel_buff_soc[i] - soc_prev).max(0.0) * p.max_ess_kwh * 3.6e3 / dt;
        state.max_ess_accel_buff_dischg_kw[i] = ((soc_prev - state.accel_buff_soc[i]).max(0.0)
            * p.max_ess_kwh
            * 3.6e3
            / dt)
            .min(state.cur_max_ess_kw_out[i]);
    } else {
        state.ess_accel_buff_chg_kw[i] = 0.0;
        state.max_ess_accel_buff_dischg_kw[i] = 0.0;
    }

    state.ess_accel_regen_dischg_kw[i] = if state.regen_buff_soc[i] < state.accel_buff_soc[i] {
        ((soc_prev - (state.regen_buff_soc[i] + state.accel_buff_soc[i]) / 2.0) * p.max_ess_kwh
            * 3.6e3
            / dt)
            .min(state.cur_max_ess_kw_out[i])
            .max(-state.cur_max_ess_chg_kw[i])
    } else if soc_prev > state.regen_buff_soc[i] {
        state.ess_regen_buff_dischg_kw[i]
            .min(state.cur_max_ess_kw_out[i])
            .max(-state.cur_max_ess_chg_kw[i])
    } else if soc_prev < state.accel_buff_soc[i] {
        (-state.ess_accel_buff_chg_kw[i])
            .min(state.cur_max_ess_kw_out[i])
            .max(-state.cur_max_ess_chg_kw[i])
    } else {
        0.0_f64
            .min(state.cur_max_ess_kw_out[i])
            .max(-state.cur_max_ess_chg_kw[i])
    };

    // How far achieved trans-out sits from the FC's max-efficiency point,
    // expressed as the motor setpoint that would close that gap.
    state.fc_kw_gap_fr_eff[i] = (state.trans_kw_out_ach[i] - veh.max_fc_eff_kw).abs();
    state.mc_elec_in_kw_for_max_fc_eff[i] = if veh.no_elec_sys {
        0.0
    } else if state.trans_kw_out_ach[i] < veh.max_fc_eff_kw {
        -state.fc_kw_gap_fr_eff[i] / mc_eff_by_kw_out(veh, state.fc_kw_gap_fr_eff[i])
    } else {
        mc_kw_in_by_kw_out_gap(veh, state.fc_kw_gap_fr_eff[i])
    };

    state.elec_kw_req_4ae[i] = if veh.no_elec_sys {
        0.0
    } else if state.trans_kw_in_ach[i] > 0.0 {
        state.trans_kw_in_ach[i] / mc_eff_by_kw_out(veh, state.trans_kw_in_ach[i])
            + state.aux_in_kw[i]
    } else {
        0.0
    };

    state.prev_fc_time_on[i] = state.fc_time_on[i - 1];

    let core = state.accel_buff_soc[i] < soc_prev
        && (state.trans_kw_in_ach[i] - 1e-6) <= state.cur_max_mc_kw_out[i]
        && (state.elec_kw_req_4ae[i] < state.cur_max_elec_kw[i] || p.max_fuel_conv_kw == 0.0);
    state.can_pwr_all_elec[i] = core
        && (p.max_fuel_conv_kw == 0.0 || (cyc.v_mph()[i] - 1e-6 <= p.mph_fc_on || p.charging_on))
        && (p.max_fuel_conv_kw == 0.0 || state.elec_kw_req_4ae[i] <= p.kw_demand_fc_on);

    state.desired_ess_kw_out_for_ae[i] = if state.can_pwr_all_elec[i] {
        if state.trans_kw_in_ach[i] < state.aux_in_kw[i] {
            state.aux_in_kw[i] + state.trans_kw_in_ach[i]
        } else if state.regen_buff_soc[i] < state.accel_buff_soc[i] {
            state.ess_accel_regen_dischg_kw[i]
        } else if soc_prev > state.regen_buff_soc[i] {
            state.ess_regen_buff_dischg_kw[i]
        } else if soc_prev < state.accel_buff_soc[i] {
            -state.ess_accel_buff_chg_kw[i]
        } else {
            state.trans_kw_in_ach[i] + state.aux_in_kw[i] - state.cur_max_roadway_chg_kw[i]
        }
    } else {
        0.0
    };
    state.ess_ae_kw_out[i] = if state.can_pwr_all_elec[i] {
        (-state.cur_max_ess_chg_kw[i])
            .max(-state.max_ess_regen_buff_chg_kw[i])
            .max((state.cur_max_roadway_chg_kw[i] - (state.trans_kw_in_ach[i] + state.aux_in_kw[i])).min(0.0))
            .max(state.cur_max_ess_kw_out[i].min(state.desired_ess_kw_out_for_ae[i]))
    } else {
        0.0
    };
    state.er_ae_kw_out[i] = (0.0_f64.max(state.trans_kw_in_ach[i] + state.aux_in_kw[i] - state.ess_ae_kw_out[i]))
        .min(state.cur_max_roadway_chg_kw[i]);
}

/// Decide whether the fuel converter is forced on this step, and which of
/// the six forced-state branches it's forced into.
pub fn set_fc_forced_state(state: &mut StepState, veh: &Vehicle, cyc: &Cycle, i: usize) {
    let p = &veh.params;
    let dt = cyc.dt()[i];

    state.fc_forced_on[i] =
        state.prev_fc_time_on[i] > 0.0 && state.prev_fc_time_on[i] < p.min_fc_time_on - dt;

    if !state.fc_forced_on[i] || !state.can_pwr_all_elec[i] {
        state.fc_forced_state[i] = FC_STATE_ENGINE_ONLY;
        state.mc_mech_kw_4forced_fc[i] = 0.0;
    } else if state.trans_kw_in_ach[i] < 0.0 {
        state.fc_forced_state[i] = FC_STATE_ENGINE_MAX_EFF_REGEN;
        state.mc_mech_kw_4forced_fc[i] = state.trans_kw_in_ach[i];
    } else if veh.max_fc_eff_kw == state.trans_kw_in_ach[i] {
        state.fc_forced_state[i] = FC_STATE_ALL_ELECTRIC;
        state.mc_mech_kw_4forced_fc[i] = 0.0;
    } else if p.idle_fc_kw > state.trans_kw_in_ach[i] && state.cyc_accel_kw[i] >= 0.0 {
        state.fc_forced_state[i] = FC_STATE_ENGINE_FORCED_IDLE;
        state.mc_mech_kw_4forced_fc[i] = state.trans_kw_in_ach[i] - p.idle_fc_kw;
    } else if veh.max_fc_eff_kw > state.trans_kw_in_ach[i] {
        state.fc_forced_state[i] = FC_STATE_ENGINE_PLUS_MOTOR;
        state.mc_mech_kw_4forced_fc[i] = 0.0;
    } else {
        state.fc_forced_state[i] = FC_STATE_FUEL_CELL;
        state.mc_mech_kw_4forced_fc[i] = state.trans_kw_in_ach[i] - veh.max_fc_eff_kw;
    }
}

/// Split this step's driveline demand between the fuel converter and the
/// battery/motor, and settle the resulting electrical bus balance.
pub fn set_hybrid_cont_decisions(state: &mut StepState, veh: &Vehicle, cyc: &Cycle, i: usize) {
    let _ = cyc;
    let p = &veh.params;

    let gap = -state.mc_elec_in_kw_for_max_fc_eff[i] - state.cur_max_roadway_chg_kw[i];
    state.ess_desired_kw_4fc_eff[i] = if gap > 0.0 {
        gap * p.ess_dischg_to_fc_max_eff_perc
    } else {
        gap * p.ess_chg_to_fc_max_eff_perc
    };

    state.ess_kw_if_fc_req[i] = if state.accel_buff_soc[i] > state.regen_buff_soc[i] {
        state
            .cur_max_ess_kw_out[i]
            .min(veh.mc_max_elec_in_kw + state.aux_in_kw[i])
            .min(state.cur_max_mc_elec_kw_in[i] + state.aux_in_kw[i])
            .min((-state.cur_max_ess_chg_kw[i]).max(state.ess_accel_regen_dischg_kw[i]))
    } else if state.ess_regen_buff_dischg_kw[i] > 0.0 {
        state
            .cur_max_ess_kw_out[i]
            .min(veh.mc_max_elec_in_kw + state.aux_in_kw[i])
            .min(state.cur_max_mc_elec_kw_in[i] + state.aux_in_kw[i])
            .min((-state.cur_max_ess_chg_kw[i]).max(
                state
                    .ess_accel_regen_dischg_kw[i]
                    .min(state.mc_elec_in_lim_kw[i] + state.aux_in_kw[i])
                    .min(state.ess_regen_buff_dischg_kw[i].max(state.ess_desired_kw_4fc_eff[i])),
            ))
    } else if state.ess_accel_buff_chg_kw[i] > 0.0 {
        state
            .cur_max_ess_kw_out[i]
            .min(veh.mc_max_elec_in_kw + state.aux_in_kw[i])
            .min(state.cur_max_mc_elec_kw_in[i] + state.aux_in_kw[i])
            .min((-state.cur_max_ess_chg_kw[i]).max(
                (-state.max_ess_regen_buff_chg_kw[i])
                    .max((-state.ess_accel_buff_chg_kw[i]).min(state.ess_desired_kw_4fc_eff[i])),
            ))
    } else if state.ess_desired_kw_4fc_eff[i] > 0.0 {
        state
            .cur_max_ess_kw_out[i]
            .min(veh.mc_max_elec_in_kw + state.aux_in_kw[i])
            .min(state.cur_max_mc_elec_kw_in[i] + state.aux_in_kw[i])
            .min((-state.cur_max_ess_chg_kw[i]).max(
                state.ess_desired_kw_4fc_eff[i].min(state.max_ess_accel_buff_dischg_kw[i]),
            ))
    } else {
        state
            .cur_max_ess_kw_out[i]
            .min(veh.mc_max_elec_in_kw + state.aux_in_kw[i])
            .min(state.cur_max_mc_elec_kw_in[i] + state.aux_in_kw[i])
            .min(
                (-state.cur_max_ess_chg_kw[i])
                    .max(state.ess_desired_kw_4fc_eff[i].max(-state.max_ess_regen_buff_chg_kw[i])),
            )
    };

    state.er_kw_if_fc_is_req[i] = 0.0_f64.max(
        state
            .cur_max_roadway_chg_kw[i]
            .min(state.cur_max_mech_mc_kw_in[i])
            .min(state.ess_kw_if_fc_req[i] - state.mc_elec_in_lim_kw[i] + state.aux_in_kw[i]),
    );
    state.mc_elec_kw_in_if_fc_is_req[i] =
        state.ess_kw_if_fc_req[i] + state.er_kw_if_fc_is_req[i] - state.aux_in_kw[i];

    state.mc_kw_if_fc_is_req[i] = if veh.no_elec_sys {
        0.0
    } else if state.mc_elec_kw_in_if_fc_is_req[i] == 0.0 {
        0.0
    } else if state.mc_elec_kw_in_if_fc_is_req[i] > 0.0 {
        state.mc_elec_kw_in_if_fc_is_req[i] * mc_eff_by_elec_in(veh, state.mc_elec_kw_in_if_fc_is_req[i])
    } else {
        state.mc_elec_kw_in_if_fc_is_req[i] / mc_eff_by_elec_in(veh, -state.mc_elec_kw_in_if_fc_is_req[i])
    };

    state.mc_mech_kw_out_ach[i] = if p.max_motor_kw == 0.0 {
        0.0
    } else if state.fc_forced_on[i]
        && state.can_pwr_all_elec[i]
        && matches!(veh.veh_pt_type, PowertrainType::Hybrid | PowertrainType::PlugInHybrid)
        && p.fc_eff_type != 4
    {
        state.mc_mech_kw_4forced_fc[i]
    } else if state.trans_kw_in_ach[i] <= 0.0 {
        if p.fc_eff_type != 4 && p.max_fuel_conv_kw > 0.0 {
            if state.can_pwr_all_elec[i] {
                -state.cur_max_mech_mc_kw_in[i].min(-state.trans_kw_in_ach[i])
            } else {
                (-state.cur_max_mech_mc_kw_in[i].min(-state.trans_kw_in_ach[i]))
                    .min((-state.cur_max_fc_kw_out[i]).max(state.mc_kw_if_fc_is_req[i]))
            }
        } else {
            (-state.cur_max_mech_mc_kw_in[i].min(-state.trans_kw_in_ach[i])).min(-state.trans_kw_in_ach[i])
        }
    } else if state.can_pwr_all_elec[i] {
        state.trans_kw_in_ach[i]
    } else {
        state.min_mc_kw_2help_fc[i].max(state.mc_kw_if_fc_is_req[i])
    };

    state.mc_elec_kw_in_ach[i] = if state.mc_mech_kw_out_ach[i] == 0.0 {
        0.0
    } else if state.mc_mech_kw_out_ach[i] < 0.0 {
        state.mc_mech_kw_out_ach[i] * mc_eff_by_elec_in(veh, -state.mc_mech_kw_out_ach[i])
    } else {
        state.mc_mech_kw_out_ach[i] / mc_eff_by_kw_out(veh, state.mc_mech_kw_out_ach[i])
    };

    state.roadway_chg_kw_out_ach[i] = if state.cur_max_roadway_chg_kw[i] == 0.0 {
        0.0
    } else if p.fc_eff_type == 4 {
        0.0_f64
            .max(state.mc_elec_kw_in_ach[i])
            .max(state.max_ess_regen_buff_chg_kw[i])
            .max(state.ess_regen_buff_dischg_kw[i])
            .max(state.cur_max_roadway_chg_kw[i])
    } else if state.can_pwr_all_elec[i] {
        state.er_ae_kw_out[i]
    } else {
        state.er_kw_if_fc_is_req[i]
    };

    state.min_ess_kw_2help_fc[i] = state.mc_elec_kw_in_ach[i] + state.aux_in_kw[i]
        - state.cur_max_fc_kw_out[i]
        - state.roadway_chg_kw_out_ach[i];

    state.ess_kw_out_ach[i] = if p.max_ess_kw == 0.0 || p.max_ess_kwh == 0.0 {
        0.0
    } else if p.fc_eff_type == 4 {
        if state.trans_kw_out_ach[i] >= 0.0 {
            state
                .min_ess_kw_2help_fc[i]
                .max(state.ess_desired_kw_4fc_eff[i])
                .max(state.ess_accel_regen_dischg_kw[i])
                .min(state.cur_max_ess_kw_out[i])
                .min(state.mc_elec_kw_in_ach[i] + state.aux_in_kw[i] - state.roadway_chg_kw_out_ach[i])
        } else {
            state.mc_elec_kw_in_ach[i] + state.aux_in_kw[i] - state.roadway_chg_kw_out_ach[i]
        }
    } else if state.high_acc_fc_on_tag[i] || veh.no_elec_aux {
        state.mc_elec_kw_in_ach[i] - state.roadway_chg_kw_out_ach[i]
    } else {
        state.mc_elec_kw_in_ach[i] + state.aux_in_kw[i] - state.roadway_chg_kw_out_ach[i]
    };

    state.fc_kw_out_ach[i] = if p.max_fuel_conv_kw == 0.0 {
        0.0
    } else if p.fc_eff_type == 4 {
        state.cur_max_fc_kw_out[i].min(
            (state.mc_elec_kw_in_ach[i] + state.aux_in_kw[i] - state.ess_kw_out_ach[i]
                - state.roadway_chg_kw_out_ach[i])
                .max(0.0),
        )
    } else if veh.no_elec_sys || veh.no_elec_aux || state.high_acc_fc_on_tag[i] {
        state
            .cur_max_fc_kw_out[i]
            .min((state.trans_kw_in_ach[i] - state.mc_mech_kw_out_ach[i] + state.aux_in_kw[i]).max(0.0))
    } else {
        state
            .cur_max_fc_kw_out[i]
            .min((state.trans_kw_in_ach[i] - state.mc_mech_kw_out_ach[i]).max(0.0))
    };

    state.fc_kw_in_ach[i] = if state.fc_kw_out_ach[i] == 0.0 {
        0.0
    } else {
        state.fc_kw_out_ach[i] / fc_eff_by_kw_out(veh, state.fc_kw_out_ach[i])
    };
    state.fs_kw_out_ach[i] = state.fc_kw_in_ach[i];

    state.cyc_fc_kw_out_ach[i] = state.fc_kw_out_ach[i];
    state.cyc_fc_aux_adj_in_kw[i] = state.aux_in_kw[i];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleRow;
    use crate::vehicle::fixtures;

    fn flat_cycle() -> Cycle {
        Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 5.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap()
    }

    #[test]
    fn conv_never_dispatches_to_ess() {
        let veh = fixtures::conv();
        let cyc = flat_cycle();
        let mut state = StepState::new(2);
        state.soc[0] = (veh.params.min_soc + veh.params.max_soc) / 2.0;
        state.cur_max_trans_kw_out[1] = 1e6;
        state.cur_max_fc_kw_out[1] = 1e6;
        state.cur_max_mc_kw_out[1] = 0.0;
        state.cur_max_mech_mc_kw_in[1] = 0.0;
        crate::road_load::set_power_calcs(&mut state, &veh, &cyc, 1);
        set_hybrid_cont_calcs(&mut state, &veh, &cyc, 1);
        set_fc_forced_state(&mut state, &veh, &cyc, 1);
        set_hybrid_cont_decisions(&mut state, &veh, &cyc, 1);
        assert_eq!(state.ess_kw_out_ach[1], 0.0);
        assert!(state.fc_kw_out_ach[1] > 0.0);
    }

    #[test]
    fn bev_never_dispatches_to_fc() {
        let veh = fixtures::bev();
        let cyc = flat_cycle();
        let mut state = StepState::new(2);
        state.soc[0] = 0.6;
        state.cur_max_trans_kw_out[1] = 1e6;
        state.cur_max_mc_kw_out[1] = 1e6;
        state.cur_max_ess_kw_out[1] = 1e6;
        state.cur_max_mech_mc_kw_in[1] = 1e6;
        state.cur_max_elec_kw[1] = 1e6;
        state.cur_max_mc_elec_kw_in[1] = 1e6;
        crate::road_load::set_power_calcs(&mut state, &veh, &cyc, 1);
        set_hybrid_cont_calcs(&mut state, &veh, &cyc, 1);
        set_fc_forced_state(&mut state, &veh, &cyc, 1);
        set_hybrid_cont_decisions(&mut state, &veh, &cyc, 1);
        assert_eq!(state.fc_kw_out_ach[1], 0.0);
        assert_eq!(state.fs_kw_out_ach[1], 0.0);
    }

    #[test]
    fn regen_never_draws_from_fuel_converter() {
        let veh = fixtures::hev();
        let cyc = Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 10.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap();
        let mut state = StepState::new(2);
        state.soc[0] = 0.5;
        state.mps_ach[0] = 10.0;
        state.cur_max_trans_kw_out[1] = 1e6;
        state.cur_max_mc_kw_out[1] = 100.0;
        state.cur_max_ess_chg_kw[1] = 100.0;
        state.cur_max_mech_mc_kw_in[1] = 100.0;
        crate::road_load::set_power_calcs(&mut state, &veh, &cyc, 1);
        set_hybrid_cont_calcs(&mut state, &veh, &cyc, 1);
        set_fc_forced_state(&mut state, &veh, &cyc, 1);
        set_hybrid_cont_decisions(&mut state, &veh, &cyc, 1);
        assert_eq!(state.fc_kw_out_ach[1], 0.0);
    }
}
