//! Vehicle source format: CSV with one row per vehicle, indexed by an
//! integer `Selection` column, and the cell-sanitization rules from §6.

use super::{Vehicle, VehicleParams};
use crate::error::SimError;
use anyhow::Context;
use std::collections::HashMap;
use std::io::Read;

/// A CSV cell after sanitization: trailing `%` divides by 100,
/// case-insensitive `true`/`false` becomes a bool, anything else parses as a
/// float, and unparseable text is kept as a string.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Float(f64),
    Bool(bool),
    Text(String),
}

pub fn sanitize_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if let Some(pct) = trimmed.strip_suffix('%') {
        if let Ok(v) = pct.trim().parse::<f64>() {
            return CellValue::Float(v / 100.0);
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => return CellValue::Bool(true),
        "false" => return CellValue::Bool(false),
        _ => {}
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return CellValue::Float(v);
    }
    CellValue::Text(trimmed.to_string())
}

fn normalize_header(h: &str) -> String {
    h.trim().replace(' ', "_")
}

type Row = HashMap<String, CellValue>;

/// Parse every row of a vehicle CSV into sanitized, header-normalized cells.
pub fn load_rows<R: Read>(reader: R) -> anyhow::Result<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .context("reading vehicle CSV header row")?
        .iter()
        .map(normalize_header)
        .collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row = Row::new();
        for (h, cell) in headers.iter().zip(record.iter()) {
            row.insert(h.clone(), sanitize_cell(cell));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn get_f64(row: &Row, key: &str) -> anyhow::Result<f64> {
    match row.get(key) {
        Some(CellValue::Float(v)) => Ok(*v),
        Some(CellValue::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(CellValue::Text(t)) => {
            anyhow::bail!("field '{key}' has non-numeric value '{t}'")
        }
        None => anyhow::bail!("field '{key}' missing"),
    }
}

fn get_bool(row: &Row, key: &str) -> anyhow::Result<bool> {
    match row.get(key) {
        Some(CellValue::Bool(b)) => Ok(*b),
        Some(CellValue::Float(v)) => Ok(*v != 0.0),
        _ => anyhow::bail!("field '{key}' missing or non-boolean"),
    }
}

/// Build a [VehicleParams] from one sanitized CSV row.
pub fn params_from_row(row: &Row) -> anyhow::Result<VehicleParams> {
    let max_roadway_chg_kw = {
        let mut arr = [0.0; 6];
        for (i, slot) in arr.iter_mut().enumerate() {
            let key = format!("MaxRoadwayChgKw{i}");
            if row.contains_key(&key) {
                *slot = get_f64(row, &key)?;
            }
        }
        arr
    };
    Ok(VehicleParams {
        selection: get_f64(row, "Selection")? as i64,
        veh_pt_type: get_f64(row, "vehPtType")? as i64,
        drag_coef: get_f64(row, "dragCoef")?,
        frontal_area_m2: get_f64(row, "frontalAreaM2")?,
        glider_kg: get_f64(row, "gliderKg")?,
        veh_cg_m: get_f64(row, "vehCgM")?,
        drive_axle_weight_frac: get_f64(row, "driveAxleWeightFrac")?,
        wheel_base_m: get_f64(row, "wheelBaseM")?,
        cargo_kg: get_f64(row, "cargoKg")?,
        veh_override_kg: get_f64(row, "vehOverrideKg").unwrap_or(0.0),
        max_fuel_stor_kw: get_f64(row, "maxFuelStorKw")?,
        fuel_stor_secs_to_peak_pwr: get_f64(row, "fuelStorSecsToPeakPwr")?,
        fuel_stor_kwh: get_f64(row, "fuelStorKwh")?,
        fuel_stor_kwh_per_kg: get_f64(row, "fuelStorKwhPerKg")?,
        max_fuel_conv_kw: get_f64(row, "maxFuelConvKw")?,
        fc_eff_type: get_f64(row, "fcEffType")? as i64,
        fc_abs_eff_impr: get_f64(row, "fcAbsEffImpr").unwrap_or(0.0),
        fuel_conv_secs_to_peak_pwr: get_f64(row, "fuelConvSecsToPeakPwr")?,
        fuel_conv_base_kg: get_f64(row, "fuelConvBaseKg")?,
        fuel_conv_kw_per_kg: get_f64(row, "fuelConvKwPerKg")?,
        max_motor_kw: get_f64(row, "maxMotorKw")?,
        motor_peak_eff: get_f64(row, "motorPeakEff")?,
        motor_secs_to_peak_pwr: get_f64(row, "motorSecsToPeakPwr")?,
        stop_start: get_bool(row, "stopStart").unwrap_or(false),
        mc_pe_kg_per_kw: get_f64(row, "mcPeKgPerKw")?,
        mc_pe_base_kg: get_f64(row, "mcPeBaseKg")?,
        max_ess_kw: get_f64(row, "maxEssKw")?,
        max_ess_kwh: get_f64(row, "maxEssKwh")?,
        ess_kg_per_kwh: get_f64(row, "essKgPerKwh")?,
        ess_base_kg: get_f64(row, "essBaseKg")?,
        ess_round_trip_eff: get_f64(row, "essRoundTripEff")?,
        ess_life_coef_a: get_f64(row, "essLifeCoefA")?,
        ess_life_coef_b: get_f64(row, "essLifeCoefB")?,
        wheel_inertia_kg_m2: get_f64(row, "wheelInertiaKgM2")?,
        num_wheels: get_f64(row, "numWheels")?,
        wheel_rr_coef: get_f64(row, "wheelRrCoef")?,
        wheel_radius_m: get_f64(row, "wheelRadiusM")?,
        wheel_coef_of_fric: get_f64(row, "wheelCoefOfFric")?,
        min_soc: get_f64(row, "minSoc")?,
        max_soc: get_f64(row, "maxSoc")?,
        ess_dischg_to_fc_max_eff_perc: get_f64(row, "essDischgToFcMaxEffPerc")?,
        ess_chg_to_fc_max_eff_perc: get_f64(row, "essChgToFcMaxEffPerc")?,
        max_accel_buffer_mph: get_f64(row, "maxAccelBufferMph")?,
        max_accel_buffer_perc_of_useable_soc: get_f64(row, "maxAccelBufferPercOfUseableSoc")?,
        perc_high_acc_buf: get_f64(row, "percHighAccBuf")?,
        mph_fc_on: get_f64(row, "mphFcOn")?,
        kw_demand_fc_on: get_f64(row, "kwDemandFcOn")?,
        alt_eff: get_f64(row, "altEff")?,
        chg_eff: get_f64(row, "chgEff")?,
        aux_kw: get_f64(row, "auxKw")?,
        force_aux_on_fc: get_bool(row, "forceAuxOnFC").unwrap_or(false),
        trans_kg: get_f64(row, "transKg")?,
        trans_eff: get_f64(row, "transEff")?,
        comp_mass_multiplier: get_f64(row, "compMassMultiplier")?,
        ess_to_fuel_ok_error: get_f64(row, "essToFuelOkError")?,
        max_regen: get_f64(row, "maxRegen")?,
        min_fc_time_on: get_f64(row, "minFcTimeOn")?,
        idle_fc_kw: get_f64(row, "idleFcKw")?,
        max_roadway_chg_kw,
        charging_on: get_bool(row, "chargingOn").unwrap_or(false),
    })
}

/// Load and validate the vehicle identified by integer `Selection` `n` from
/// a vehicle-database CSV reader.
pub fn from_id<R: Read>(reader: R, n: i64) -> Result<Vehicle, SimError> {
    let rows = load_rows(reader)
        .map_err(|e| SimError::InvalidVehicle(format!("reading vehicle CSV: {e}")))?;
    let row = rows
        .iter()
        .find(|r| matches!(r.get("Selection"), Some(CellValue::Float(v)) if *v as i64 == n))
        .ok_or_else(|| SimError::InvalidVehicle(format!("no vehicle with Selection={n}")))?;
    let params = params_from_row(row)
        .map_err(|e| SimError::InvalidVehicle(format!("Selection={n}: {e}")))?;
    Vehicle::new(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_cell_rules() {
        assert_eq!(sanitize_cell("12.5%"), CellValue::Float(0.125));
        assert_eq!(sanitize_cell("TRUE"), CellValue::Bool(true));
        assert_eq!(sanitize_cell("false"), CellValue::Bool(false));
        assert_eq!(sanitize_cell("3.14"), CellValue::Float(3.14));
        assert_eq!(
            sanitize_cell("Toyota Prius"),
            CellValue::Text("Toyota Prius".to_string())
        );
    }

    #[test]
    fn normalize_header_replaces_spaces() {
        assert_eq!(normalize_header("max Fuel Conv Kw"), "max_Fuel_Conv_Kw");
    }
}
