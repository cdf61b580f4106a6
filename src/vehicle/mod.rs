//! C2: the vehicle parameter bundle, plus the derived quantities (mass,
//! traction limit, regen capacity, and resampled efficiency curves) computed
//! once at construction and reused every step.

pub mod curves;
pub mod db;

use crate::error::SimError;
use crate::utils::GRAVITY_MPS2;
use serde::{Deserialize, Serialize};

/// Powertrain architecture. Numeric values match the source's `vehPtType`
/// convention so CSV vehicle files round-trip without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[repr(u8)]
pub enum PowertrainType {
    Conventional = 1,
    Hybrid = 2,
    PlugInHybrid = 3,
    BatteryElectric = 4,
}

impl PowertrainType {
    fn from_code(code: i64) -> Result<Self, SimError> {
        Ok(match code {
            1 => Self::Conventional,
            2 => Self::Hybrid,
            3 => Self::PlugInHybrid,
            4 => Self::BatteryElectric,
            other => {
                return Err(SimError::InvalidVehicle(format!(
                    "unsupported vehPtType {other}"
                )))
            }
        })
    }
}

/// Raw, unvalidated parameter record — one row of the vehicle source format
/// (or an explicit in-memory record with the same fields). [Vehicle::new]
/// runs the derivations of §3 and validates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleParams {
    pub selection: i64,
    pub veh_pt_type: i64,
    pub drag_coef: f64,
    pub frontal_area_m2: f64,
    pub glider_kg: f64,
    pub veh_cg_m: f64,
    pub drive_axle_weight_frac: f64,
    pub wheel_base_m: f64,
    pub cargo_kg: f64,
    pub veh_override_kg: f64,
    pub max_fuel_stor_kw: f64,
    pub fuel_stor_secs_to_peak_pwr: f64,
    pub fuel_stor_kwh: f64,
    pub fuel_stor_kwh_per_kg: f64,
    pub max_fuel_conv_kw: f64,
    pub fc_eff_type: i64,
    pub fc_abs_eff_impr: f64,
    pub fuel_conv_secs_to_peak_pwr: f64,
    pub fuel_conv_base_kg: f64,
    pub fuel_conv_kw_per_kg: f64,
    pub max_motor_kw: f64,
    pub motor_peak_eff: f64,
    pub motor_secs_to_peak_pwr: f64,
    pub stop_start: bool,
    pub mc_pe_kg_per_kw: f64,
    pub mc_pe_base_kg: f64,
    pub max_ess_kw: f64,
    pub max_ess_kwh: f64,
    pub ess_kg_per_kwh: f64,
    pub ess_base_kg: f64,
    pub ess_round_trip_eff: f64,
    pub ess_life_coef_a: f64,
    pub ess_life_coef_b: f64,
    pub wheel_inertia_kg_m2: f64,
    pub num_wheels: f64,
    pub wheel_rr_coef: f64,
    pub wheel_radius_m: f64,
    pub wheel_coef_of_fric: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    pub ess_dischg_to_fc_max_eff_perc: f64,
    pub ess_chg_to_fc_max_eff_perc: f64,
    pub max_accel_buffer_mph: f64,
    pub max_accel_buffer_perc_of_useable_soc: f64,
    pub perc_high_acc_buf: f64,
    pub mph_fc_on: f64,
    pub kw_demand_fc_on: f64,
    pub alt_eff: f64,
    pub chg_eff: f64,
    pub aux_kw: f64,
    pub force_aux_on_fc: bool,
    pub trans_kg: f64,
    pub trans_eff: f64,
    pub comp_mass_multiplier: f64,
    pub ess_to_fuel_ok_error: f64,
    pub max_regen: f64,
    pub min_fc_time_on: f64,
    pub idle_fc_kw: f64,
    #[serde(default)]
    pub max_roadway_chg_kw: [f64; 6],
    #[serde(default)]
    pub charging_on: bool,
}

/// Validated vehicle parameter bundle with efficiency curves and mass
/// derived once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub params: VehicleParams,
    pub veh_pt_type: PowertrainType,
    pub fc_eff_type: u8,

    pub veh_kg: f64,
    pub max_trac_mps2: f64,
    pub max_regen_kwh: f64,

    pub fc_kw_out_array: Vec<f64>,
    pub fc_eff_array: Vec<f64>,
    pub max_fc_eff_kw: f64,
    pub fc_max_out_kw: f64,

    pub mc_kw_out_array: Vec<f64>,
    pub mc_kw_in_array: Vec<f64>,
    pub mc_full_eff_array: Vec<f64>,
    pub mc_max_elec_in_kw: f64,

    pub no_elec_sys: bool,
    pub no_elec_aux: bool,
}

impl Vehicle {
    pub fn new(params: VehicleParams) -> Result<Self, SimError> {
        validate(&params)?;
        let veh_pt_type = PowertrainType::from_code(params.veh_pt_type)?;
        let fc_eff_type = params.fc_eff_type as u8;

        let veh_kg = compute_veh_kg(&params);
        let max_trac_mps2 = (params.wheel_coef_of_fric
            * params.drive_axle_weight_frac
            * GRAVITY_MPS2)
            / (1.0 + (params.veh_cg_m * params.wheel_coef_of_fric) / params.wheel_base_m);
        let max_regen_kwh = 0.5 * veh_kg * 27f64.powi(2) / (3600.0 * 1000.0);

        let (fc_kw_out_array, fc_eff_array) = curves::build_fc_eff_array(
            fc_eff_type,
            params.max_fuel_conv_kw,
            params.fc_abs_eff_impr,
        )
        .map_err(|e| SimError::InvalidVehicle(e.to_string()))?;
        let max_fc_eff_kw = fc_kw_out_array[argmax(&fc_eff_array)];
        let fc_max_out_kw = params.max_fuel_conv_kw;

        let (mc_kw_out_array, mc_full_eff_array, mc_kw_in_array) =
            curves::build_mc_eff_arrays(params.max_motor_kw);
        let mc_max_elec_in_kw = mc_kw_in_array.iter().cloned().fold(f64::MIN, f64::max);

        let no_elec_sys =
            params.max_ess_kwh == 0.0 || params.max_ess_kw == 0.0 || params.max_motor_kw == 0.0;
        let no_elec_aux =
            no_elec_sys || params.max_motor_kw <= params.aux_kw || params.force_aux_on_fc;

        Ok(Self {
            params,
            veh_pt_type,
            fc_eff_type,
            veh_kg,
            max_trac_mps2,
            max_regen_kwh,
            fc_kw_out_array,
            fc_eff_array,
            max_fc_eff_kw,
            fc_max_out_kw,
            mc_kw_out_array,
            mc_kw_in_array,
            mc_full_eff_array,
            mc_max_elec_in_kw,
            no_elec_sys,
            no_elec_aux,
        })
    }
}

fn compute_veh_kg(p: &VehicleParams) -> f64 {
    if p.veh_override_kg > 0.0 {
        return p.veh_override_kg;
    }
    let ess_mass_kg = if p.max_ess_kwh == 0.0 || p.max_ess_kw == 0.0 {
        0.0
    } else {
        (p.max_ess_kwh * p.ess_kg_per_kwh + p.ess_base_kg) * p.comp_mass_multiplier
    };
    let mc_mass_kg = if p.max_motor_kw == 0.0 {
        0.0
    } else {
        (p.mc_pe_base_kg + p.mc_pe_kg_per_kw * p.max_motor_kw) * p.comp_mass_multiplier
    };
    let fc_mass_kg = if p.max_fuel_conv_kw == 0.0 {
        0.0
    } else {
        ((1.0 / p.fuel_conv_kw_per_kg) * p.max_fuel_conv_kw + p.fuel_conv_base_kg)
            * p.comp_mass_multiplier
    };
    let fs_mass_kg = if p.max_fuel_stor_kw == 0.0 {
        0.0
    } else {
        (1.0 / p.fuel_stor_kwh_per_kg) * p.fuel_stor_kwh * p.comp_mass_multiplier
    };
    p.cargo_kg + p.glider_kg + p.trans_kg * p.comp_mass_multiplier
        + ess_mass_kg
        + mc_mass_kg
        + fc_mass_kg
        + fs_mass_kg
}

fn argmax(arr: &[f64]) -> usize {
    arr.iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn validate(p: &VehicleParams) -> Result<(), SimError> {
    if !(1..=4).contains(&p.veh_pt_type) {
        return Err(SimError::InvalidVehicle(format!(
            "unsupported vehPtType {}",
            p.veh_pt_type
        )));
    }
    if !(1..=5).contains(&p.fc_eff_type) {
        return Err(SimError::InvalidVehicle(format!(
            "unsupported fcEffType {}",
            p.fc_eff_type
        )));
    }
    if p.min_soc < 0.0 || p.max_soc > 1.0 || p.min_soc >= p.max_soc {
        return Err(SimError::InvalidVehicle(format!(
            "malformed SOC window [{}, {}]",
            p.min_soc, p.max_soc
        )));
    }
    for (name, val) in [
        ("gliderKg", p.glider_kg),
        ("cargoKg", p.cargo_kg),
        ("transKg", p.trans_kg),
        ("wheelBaseM", p.wheel_base_m),
        ("wheelRadiusM", p.wheel_radius_m),
    ] {
        if val < 0.0 {
            return Err(SimError::InvalidVehicle(format!("{name} must be >= 0, got {val}")));
        }
    }
    if p.wheel_base_m == 0.0 {
        return Err(SimError::InvalidVehicle(
            "wheelBaseM must be nonzero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A small, internally-consistent CONV vehicle used across unit tests.
    pub fn conv() -> Vehicle {
        Vehicle::new(base_params(1, 4)).unwrap()
    }

    /// A small HEV built on the same glider as [conv].
    pub fn hev() -> Vehicle {
        let mut p = base_params(2, 1);
        p.max_motor_kw = 50.0;
        p.max_ess_kw = 40.0;
        p.max_ess_kwh = 1.5;
        p.max_fuel_conv_kw = 75.0;
        Vehicle::new(p).unwrap()
    }

    /// A BEV with no fuel converter at all.
    pub fn bev() -> Vehicle {
        let mut p = base_params(4, 1);
        p.max_motor_kw = 100.0;
        p.max_ess_kw = 150.0;
        p.max_ess_kwh = 60.0;
        p.max_fuel_conv_kw = 0.0;
        p.max_fuel_stor_kw = 0.0;
        Vehicle::new(p).unwrap()
    }

    /// A PHEV with both a modest engine and a larger pack than the HEV.
    pub fn phev() -> Vehicle {
        let mut p = base_params(3, 1);
        p.max_motor_kw = 80.0;
        p.max_ess_kw = 60.0;
        p.max_ess_kwh = 10.0;
        p.max_fuel_conv_kw = 60.0;
        Vehicle::new(p).unwrap()
    }

    fn base_params(veh_pt_type: i64, fc_eff_type: i64) -> VehicleParams {
        VehicleParams {
            selection: 0,
            veh_pt_type,
            drag_coef: 0.3,
            frontal_area_m2: 2.2,
            glider_kg: 1000.0,
            veh_cg_m: 0.53,
            drive_axle_weight_frac: 0.59,
            wheel_base_m: 2.7,
            cargo_kg: 136.0,
            veh_override_kg: 0.0,
            max_fuel_stor_kw: 2000.0,
            fuel_stor_secs_to_peak_pwr: 1.0,
            fuel_stor_kwh: 50.0,
            fuel_stor_kwh_per_kg: 9.89,
            max_fuel_conv_kw: if veh_pt_type == 1 { 100.0 } else { 0.0 },
            fc_eff_type,
            fc_abs_eff_impr: 0.0,
            fuel_conv_secs_to_peak_pwr: 3.0,
            fuel_conv_base_kg: 61.0,
            fuel_conv_kw_per_kg: 2.13,
            max_motor_kw: 0.0,
            motor_peak_eff: 0.95,
            motor_secs_to_peak_pwr: 4.0,
            stop_start: false,
            mc_pe_kg_per_kw: 0.833,
            mc_pe_base_kg: 21.6,
            max_ess_kw: 0.0,
            max_ess_kwh: 0.0,
            ess_kg_per_kwh: 8.0,
            ess_base_kg: 75.0,
            ess_round_trip_eff: 0.97,
            ess_life_coef_a: 110.0,
            ess_life_coef_b: -0.6,
            wheel_inertia_kg_m2: 0.815,
            num_wheels: 4.0,
            wheel_rr_coef: 0.0068,
            wheel_radius_m: 0.336,
            wheel_coef_of_fric: 0.7,
            min_soc: 0.2,
            max_soc: 0.8,
            ess_dischg_to_fc_max_eff_perc: 1.0,
            ess_chg_to_fc_max_eff_perc: 0.0,
            max_accel_buffer_mph: 60.0,
            max_accel_buffer_perc_of_useable_soc: 0.2,
            perc_high_acc_buf: 0.0,
            mph_fc_on: 30.0,
            kw_demand_fc_on: 100.0,
            alt_eff: 1.0,
            chg_eff: 0.86,
            aux_kw: 0.7,
            force_aux_on_fc: false,
            trans_kg: 114.0,
            trans_eff: 0.92,
            comp_mass_multiplier: 1.4,
            ess_to_fuel_ok_error: 0.005,
            max_regen: 0.98,
            min_fc_time_on: 30.0,
            idle_fc_kw: 2.5,
            max_roadway_chg_kw: [0.0; 6],
            charging_on: false,
        }
    }

    #[test]
    fn fixtures_construct_without_error() {
        let _ = conv();
        let _ = hev();
        let _ = bev();
        let _ = phev();
    }

    #[test]
    fn malformed_soc_window_rejected() {
        let mut p = base_params(1, 1);
        p.min_soc = 0.9;
        p.max_soc = 0.8;
        assert!(matches!(Vehicle::new(p), Err(SimError::InvalidVehicle(_))));
    }

    #[test]
    fn no_elec_sys_flag_set_for_conv() {
        assert!(conv().no_elec_sys);
        assert!(!hev().no_elec_sys);
    }
}
