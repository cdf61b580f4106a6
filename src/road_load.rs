//! C5: road-load power demand at the cycle's target speed, and the achieved
//! speed/distance this demand actually produces once C4's traction ceiling
//! is taken into account.

use crate::cycle::Cycle;
use crate::error::SimError;
use crate::step_state::StepState;
use crate::utils::{
    closest_clamped_root, real_cubic_roots, AIR_DENSITY_KG_PER_M3, GRAVITY_MPS2, MPH_PER_MPS,
    M_PER_MI, REGEN_A, REGEN_B,
};
use crate::vehicle::Vehicle;

/// Compute the tractive power the target speed `cyc.v_mps()[i]` demands of
/// the driveline, and record whether the step's traction ceiling
/// (`cur_max_trans_kw_out`, set by [crate::limits::set_comp_lims]) can meet
/// it.
pub fn set_power_calcs(state: &mut StepState, veh: &Vehicle, cyc: &Cycle, i: usize) {
    let p = &veh.params;
    let dt = cyc.dt()[i];
    let v_prev = state.mps_ach[i - 1];
    let v_tgt = cyc.v_mps()[i];
    let v_avg = (v_prev + v_tgt) / 2.0;

    state.cyc_drag_kw[i] =
        0.5 * AIR_DENSITY_KG_PER_M3 * p.drag_coef * p.frontal_area_m2 * v_avg.powi(3) / 1000.0;
    state.cyc_accel_kw[i] = veh.veh_kg / (2.0 * dt) * (v_tgt.powi(2) - v_prev.powi(2)) / 1000.0;
    let grade = cyc.grade()[i];
    state.cyc_ascent_kw[i] = GRAVITY_MPS2 * grade.atan().sin() * veh.veh_kg * v_avg / 1000.0;
    state.cyc_rr_kw[i] = GRAVITY_MPS2 * p.wheel_rr_coef * veh.veh_kg * v_avg / 1000.0;
    state.cyc_tire_inertia_kw[i] = 0.5
        * p.wheel_inertia_kg_m2
        * p.num_wheels
        * ((v_tgt / p.wheel_radius_m).powi(2) - (v_prev / p.wheel_radius_m).powi(2))
        / dt
        / 1000.0;

    let cyc_traction_kw_req =
        state.cyc_drag_kw[i] + state.cyc_accel_kw[i] + state.cyc_ascent_kw[i];
    state.cyc_wheel_kw_req[i] = cyc_traction_kw_req + state.cyc_rr_kw[i] + state.cyc_tire_inertia_kw[i];

    let v_mph_avg = (cyc.v_mph()[i] + v_prev * MPH_PER_MPS) / 2.0;
    let regen_contr_lim_kw_perc =
        p.max_regen / (1.0 + REGEN_A * (-REGEN_B * (v_mph_avg + 1.0)).exp());
    let regen_cap_kw = state.cur_max_mc_kw_out[i].abs() * p.trans_eff;
    let cyc_regen_brake_kw = (regen_contr_lim_kw_perc * (-state.cyc_wheel_kw_req[i]))
        .min(regen_cap_kw)
        .max(0.0);
    state.cyc_trans_kw_out_req[i] = state.cyc_wheel_kw_req[i] + cyc_regen_brake_kw;

    if state.cyc_trans_kw_out_req[i] <= state.cur_max_trans_kw_out[i] {
        state.cyc_met[i] = 1;
        state.trans_kw_out_ach[i] = state.cyc_trans_kw_out_req[i];
    } else {
        state.cyc_met[i] = -1;
        state.trans_kw_out_ach[i] = state.cur_max_trans_kw_out[i];
    }
}

/// Resolve the step's achieved speed and distance. When the target speed is
/// reachable (`cyc_met == 1`) this is trivial; otherwise, solve the cubic
/// road-load balance for the speed `cur_max_trans_kw_out` actually supports.
/// Fails with [SimError::NumericFailure] if that cubic has no finite root.
pub fn set_speed_dist_calcs(
    state: &mut StepState,
    veh: &Vehicle,
    cyc: &Cycle,
    i: usize,
) -> Result<(), SimError> {
    let p = &veh.params;
    let dt = cyc.dt()[i];
    let v_prev = state.mps_ach[i - 1];
    state.max_trac_mps[i] = v_prev + veh.max_trac_mps2 * dt;

    state.mps_ach[i] = if state.cyc_met[i] == 1 {
        cyc.v_mps()[i]
    } else {
        let grade = cyc.grade()[i];
        let drag3 = (1.0 / 16.0) * AIR_DENSITY_KG_PER_M3 * p.drag_coef * p.frontal_area_m2;
        let accel2 = veh.veh_kg / (2.0 * dt);
        let drag2 = (3.0 / 16.0) * AIR_DENSITY_KG_PER_M3 * p.drag_coef * p.frontal_area_m2 * v_prev;
        let wheel2 =
            0.5 * p.wheel_inertia_kg_m2 * p.num_wheels / (dt * p.wheel_radius_m.powi(2));
        let drag1 =
            (3.0 / 16.0) * AIR_DENSITY_KG_PER_M3 * p.drag_coef * p.frontal_area_m2 * v_prev.powi(2);
        let roll1 = GRAVITY_MPS2 * p.wheel_rr_coef * veh.veh_kg / 2.0;
        let ascent1 = GRAVITY_MPS2 * grade.atan().sin() * veh.veh_kg / 2.0;
        let accel0 = -veh.veh_kg * v_prev.powi(2) / (2.0 * dt);
        let drag0 = (1.0 / 16.0) * AIR_DENSITY_KG_PER_M3 * p.drag_coef * p.frontal_area_m2 * v_prev.powi(3);
        let roll0 = GRAVITY_MPS2 * p.wheel_rr_coef * veh.veh_kg * v_prev / 2.0;
        let ascent0 = GRAVITY_MPS2 * grade.atan().sin() * veh.veh_kg * v_prev / 2.0;
        let wheel0 = -0.5 * p.wheel_inertia_kg_m2 * p.num_wheels * v_prev.powi(2)
            / (dt * p.wheel_radius_m.powi(2));

        let total3 = drag3 / 1e3;
        let total2 = (accel2 + drag2 + wheel2) / 1e3;
        let total1 = (drag1 + roll1 + ascent1) / 1e3;
        let total0 = (accel0 + drag0 + roll0 + ascent0 + wheel0) / 1e3 - state.cur_max_trans_kw_out[i];

        let roots = real_cubic_roots(total3, total2, total1, total0);
        closest_clamped_root(&roots, cyc.v_mps()[i], 0.0, state.max_trac_mps[i]).ok_or(
            SimError::NumericFailure {
                step: i,
                target_mps: cyc.v_mps()[i],
            },
        )?
    };

    state.mph_ach[i] = state.mps_ach[i] * MPH_PER_MPS;
    state.dist_m[i] = state.mps_ach[i] * dt;
    state.dist_mi[i] = state.dist_m[i] / M_PER_MI + state.dist_mi[i - 1];
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleRow;
    use crate::vehicle::fixtures;

    fn ramp_cycle() -> Cycle {
        Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 30.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap()
    }

    #[test]
    fn cycle_met_when_demand_within_trans_ceiling() {
        let veh = fixtures::conv();
        let cyc = Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 1.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap();
        let mut state = StepState::new(2);
        state.soc[0] = 0.5;
        state.cur_max_trans_kw_out[1] = 1e6;
        set_power_calcs(&mut state, &veh, &cyc, 1);
        assert_eq!(state.cyc_met[1], 1);
        set_speed_dist_calcs(&mut state, &veh, &cyc, 1).unwrap();
        assert!((state.mps_ach[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cycle_unmet_clamps_to_traction_envelope() {
        let veh = fixtures::conv();
        let cyc = ramp_cycle();
        let mut state = StepState::new(2);
        state.soc[0] = 0.5;
        state.cur_max_trans_kw_out[1] = 0.0;
        set_power_calcs(&mut state, &veh, &cyc, 1);
        assert_eq!(state.cyc_met[1], -1);
        set_speed_dist_calcs(&mut state, &veh, &cyc, 1).unwrap();
        assert!(state.mps_ach[1] <= state.max_trac_mps[1] + 1e-6);
        assert!(state.mps_ach[1] >= 0.0);
    }

    #[test]
    fn distance_accumulates_monotonically() {
        let veh = fixtures::conv();
        let cyc = Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 5.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 2.0, v_mps: 5.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap();
        let mut state = StepState::new(3);
        state.soc[0] = 0.5;
        for i in 1..3 {
            state.cur_max_trans_kw_out[i] = 1e6;
            set_power_calcs(&mut state, &veh, &cyc, i);
            set_speed_dist_calcs(&mut state, &veh, &cyc, i).unwrap();
        }
        assert!(state.dist_mi[2] > state.dist_mi[1]);
        assert!(state.dist_mi[1] > 0.0);
    }
}
