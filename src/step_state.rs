//! C3: the struct-of-arrays simulation trace. One slot per cycle sample,
//! filled in by [crate::limits], [crate::road_load], [crate::controller],
//! and [crate::integrator] as [crate::driver::Driver] steps through a cycle.

/// Per-step simulation state, pre-sized to the cycle length. Every field is
/// indexed `[0, len)`; index `0` holds the powertrain's initial conditions
/// rather than a computed step.
#[derive(Debug, Clone)]
pub struct StepState {
    pub len: usize,

    // Achieved kinematics.
    pub mps_ach: Vec<f64>,
    pub mph_ach: Vec<f64>,
    pub dist_m: Vec<f64>,
    pub dist_mi: Vec<f64>,
    pub cyc_met: Vec<i8>,
    pub max_trac_mps: Vec<f64>,

    // Road-load power terms (target-speed based), all kW.
    pub cyc_drag_kw: Vec<f64>,
    pub cyc_accel_kw: Vec<f64>,
    pub cyc_ascent_kw: Vec<f64>,
    pub cyc_rr_kw: Vec<f64>,
    pub cyc_tire_inertia_kw: Vec<f64>,
    pub cyc_wheel_kw_req: Vec<f64>,
    pub cyc_trans_kw_out_req: Vec<f64>,
    pub cyc_fc_aux_adj_in_kw: Vec<f64>,

    // Component limits (C4 outputs).
    pub cur_max_fs_kw_out: Vec<f64>,
    pub cur_max_fc_kw_out: Vec<f64>,
    pub cur_max_ess_kw_out: Vec<f64>,
    pub cur_max_avail_elec_kw: Vec<f64>,
    pub cur_max_elec_kw: Vec<f64>,
    pub cur_max_mc_kw_out: Vec<f64>,
    pub cur_max_mc_elec_kw_in: Vec<f64>,
    pub cur_max_mech_mc_kw_in: Vec<f64>,
    pub cur_max_trac_kw: Vec<f64>,
    pub cur_max_trans_kw_out: Vec<f64>,
    pub cur_max_ess_chg_kw: Vec<f64>,
    pub cur_max_roadway_chg_kw: Vec<f64>,
    pub ess_cap_lim_dischg_kw: Vec<f64>,
    pub ess_cap_lim_chg_kw: Vec<f64>,

    // Hybrid controller intermediates (C6 outputs).
    pub regen_buff_soc: Vec<f64>,
    pub ess_regen_buff_dischg_kw: Vec<f64>,
    pub max_ess_regen_buff_chg_kw: Vec<f64>,
    pub accel_buff_soc: Vec<f64>,
    pub max_ess_accel_buff_dischg_kw: Vec<f64>,
    pub ess_accel_buff_chg_kw: Vec<f64>,
    pub ess_accel_regen_dischg_kw: Vec<f64>,
    pub mc_elec_in_lim_kw: Vec<f64>,
    pub elec_kw_req_4ae: Vec<f64>,
    pub can_pwr_all_elec: Vec<bool>,
    pub desired_ess_kw_out_for_ae: Vec<f64>,
    pub ess_ae_kw_out: Vec<f64>,
    pub er_ae_kw_out: Vec<f64>,
    pub fc_kw_gap_fr_eff: Vec<f64>,
    pub mc_elec_in_kw_for_max_fc_eff: Vec<f64>,
    pub min_mc_kw_2help_fc: Vec<f64>,
    pub ess_desired_kw_4fc_eff: Vec<f64>,
    pub ess_kw_if_fc_req: Vec<f64>,
    pub er_kw_if_fc_is_req: Vec<f64>,
    pub mc_elec_kw_in_if_fc_is_req: Vec<f64>,
    pub mc_kw_if_fc_is_req: Vec<f64>,
    pub fc_forced_on: Vec<bool>,
    pub fc_forced_state: Vec<u8>,
    pub mc_mech_kw_4forced_fc: Vec<f64>,
    pub fc_time_on: Vec<f64>,
    pub prev_fc_time_on: Vec<f64>,
    pub high_acc_fc_on_tag: Vec<bool>,
    pub reached_buff: Vec<bool>,

    // Final per-step dispatch (decisions).
    pub trans_kw_out_ach: Vec<f64>,
    pub trans_kw_in_ach: Vec<f64>,
    pub cyc_fc_kw_out_ach: Vec<f64>,
    pub mc_mech_kw_out_ach: Vec<f64>,
    pub mc_elec_kw_in_ach: Vec<f64>,
    pub aux_in_kw: Vec<f64>,
    pub roadway_chg_kw_out_ach: Vec<f64>,
    pub min_ess_kw_2help_fc: Vec<f64>,
    pub ess_kw_out_ach: Vec<f64>,
    pub fc_kw_out_ach: Vec<f64>,
    pub fc_kw_in_ach: Vec<f64>,
    pub fs_kw_out_ach: Vec<f64>,

    // Integrator outputs (C7).
    pub fs_kwh_out_ach: Vec<f64>,
    pub ess_cur_kwh: Vec<f64>,
    pub soc: Vec<f64>,
}

impl StepState {
    /// Allocate a zero-filled trace of length `len`. `soc[0]` and
    /// `ess_cur_kwh[0]` are left `0.0`; [crate::driver::Driver] sets the
    /// initial conditions before running the first step.
    pub fn new(len: usize) -> Self {
        let f = || vec![0.0_f64; len];
        Self {
            len,
            mps_ach: f(),
            mph_ach: f(),
            dist_m: f(),
            dist_mi: f(),
            cyc_met: vec![1_i8; len],
            max_trac_mps: f(),
            cyc_drag_kw: f(),
            cyc_accel_kw: f(),
            cyc_ascent_kw: f(),
            cyc_rr_kw: f(),
            cyc_tire_inertia_kw: f(),
            cyc_wheel_kw_req: f(),
            cyc_trans_kw_out_req: f(),
            cyc_fc_aux_adj_in_kw: f(),
            cur_max_fs_kw_out: f(),
            cur_max_fc_kw_out: f(),
            cur_max_ess_kw_out: f(),
            cur_max_avail_elec_kw: f(),
            cur_max_elec_kw: f(),
            cur_max_mc_kw_out: f(),
            cur_max_mc_elec_kw_in: f(),
            cur_max_mech_mc_kw_in: f(),
            cur_max_trac_kw: f(),
            cur_max_trans_kw_out: f(),
            cur_max_ess_chg_kw: f(),
            cur_max_roadway_chg_kw: f(),
            ess_cap_lim_dischg_kw: f(),
            ess_cap_lim_chg_kw: f(),
            regen_buff_soc: f(),
            ess_regen_buff_dischg_kw: f(),
            max_ess_regen_buff_chg_kw: f(),
            accel_buff_soc: f(),
            max_ess_accel_buff_dischg_kw: f(),
            ess_accel_buff_chg_kw: f(),
            ess_accel_regen_dischg_kw: f(),
            mc_elec_in_lim_kw: f(),
            elec_kw_req_4ae: f(),
            can_pwr_all_elec: vec![false; len],
            desired_ess_kw_out_for_ae: f(),
            ess_ae_kw_out: f(),
            er_ae_kw_out: f(),
            fc_kw_gap_fr_eff: f(),
            mc_elec_in_kw_for_max_fc_eff: f(),
            min_mc_kw_2help_fc: f(),
            ess_desired_kw_4fc_eff: f(),
            ess_kw_if_fc_req: f(),
            er_kw_if_fc_is_req: f(),
            mc_elec_kw_in_if_fc_is_req: f(),
            mc_kw_if_fc_is_req: f(),
            fc_forced_on: vec![false; len],
            fc_forced_state: vec![0_u8; len],
            mc_mech_kw_4forced_fc: f(),
            fc_time_on: f(),
            prev_fc_time_on: f(),
            high_acc_fc_on_tag: vec![false; len],
            reached_buff: vec![false; len],
            trans_kw_out_ach: f(),
            trans_kw_in_ach: f(),
            cyc_fc_kw_out_ach: f(),
            mc_mech_kw_out_ach: f(),
            mc_elec_kw_in_ach: f(),
            aux_in_kw: f(),
            roadway_chg_kw_out_ach: f(),
            min_ess_kw_2help_fc: f(),
            ess_kw_out_ach: f(),
            fc_kw_out_ach: f(),
            fc_kw_in_ach: f(),
            fs_kw_out_ach: f(),
            fs_kwh_out_ach: f(),
            ess_cur_kwh: f(),
            soc: f(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_zero_fills_and_sizes_every_vec() {
        let s = StepState::new(10);
        assert_eq!(s.mps_ach.len(), 10);
        assert_eq!(s.soc.len(), 10);
        assert_eq!(s.cyc_met[0], 1);
        assert!(!s.can_pwr_all_elec[0]);
    }
}
