//! C1: an immutable drive cycle — the backward-facing simulator's only
//! forcing function.

use crate::error::SimError;
use crate::utils::MPH_PER_MPS;
use serde::{Deserialize, Serialize};

#[cfg(feature = "resources")]
static STANDARD_CYCLES: include_dir::Dir<'_> =
    include_dir::include_dir!("$CARGO_MANIFEST_DIR/src/resources/cycles");

/// One row of an explicit, in-memory cycle record. Mirrors the CSV columns
/// `cycSecs, cycMps, cycGrade, cycRoadType` from the cycle source format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CycleRow {
    pub t_s: f64,
    pub v_mps: f64,
    pub grade: f64,
    /// Index into `Vehicle::max_roadway_chg_kw`; `0` means no roadway charging.
    pub road_chg_class: usize,
}

/// Ordered time series of target speed, grade, and roadway-charge class,
/// with `dt` derived on construction. Immutable after construction; owned
/// copies may be shared by reference across concurrent simulations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    t_s: Vec<f64>,
    v_mps: Vec<f64>,
    grade: Vec<f64>,
    road_chg_class: Vec<usize>,
    /// `dt[i] = t_s[i] - t_s[i-1]`, `dt[0] = 0`.
    dt: Vec<f64>,
    /// `v_mps * MPH_PER_MPS`.
    v_mph: Vec<f64>,
}

impl Cycle {
    /// Build and validate a cycle from an explicit record of equal-length
    /// columns. Fails with [SimError::InvalidCycle] if time is not strictly
    /// increasing from zero, any speed is negative, or there are fewer than
    /// two samples.
    pub fn from_record(rows: &[CycleRow]) -> Result<Self, SimError> {
        if rows.len() < 2 {
            return Err(SimError::InvalidCycle(format!(
                "cycle has {} sample(s), need at least 2",
                rows.len()
            )));
        }
        if rows[0].t_s != 0.0 {
            return Err(SimError::InvalidCycle(format!(
                "t_s[0] must be 0, got {}",
                rows[0].t_s
            )));
        }
        let mut t_s = Vec::with_capacity(rows.len());
        let mut v_mps = Vec::with_capacity(rows.len());
        let mut grade = Vec::with_capacity(rows.len());
        let mut road_chg_class = Vec::with_capacity(rows.len());
        let mut dt = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.v_mps < 0.0 {
                return Err(SimError::InvalidCycle(format!(
                    "negative speed {} at index {i}",
                    row.v_mps
                )));
            }
            if i > 0 && row.t_s <= rows[i - 1].t_s {
                return Err(SimError::InvalidCycle(format!(
                    "time not strictly increasing at index {i}: {} <= {}",
                    row.t_s,
                    rows[i - 1].t_s
                )));
            }
            t_s.push(row.t_s);
            v_mps.push(row.v_mps);
            grade.push(row.grade);
            road_chg_class.push(row.road_chg_class);
            dt.push(if i == 0 { 0.0 } else { row.t_s - rows[i - 1].t_s });
        }
        let v_mph = v_mps.iter().map(|v| v * MPH_PER_MPS).collect();
        Ok(Self {
            t_s,
            v_mps,
            grade,
            road_chg_class,
            dt,
            v_mph,
        })
    }

    /// Look up a standard cycle shipped as a resource (`udds`, `us06`,
    /// `hwfet`) by name.
    #[cfg(feature = "resources")]
    pub fn from_name(name: &str) -> Result<Self, SimError> {
        let file = STANDARD_CYCLES
            .get_file(format!("{name}.csv"))
            .ok_or_else(|| SimError::InvalidCycle(format!("no standard cycle named '{name}'")))?;
        Self::from_csv_reader(file.contents())
            .map_err(|e| SimError::InvalidCycle(format!("'{name}': {e}")))
    }

    /// Parse a cycle from CSV bytes/text with columns
    /// `cycSecs, cycMps, cycGrade, cycRoadType`.
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> anyhow::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            let raw: CsvCycleRow = result?;
            rows.push(CycleRow {
                t_s: raw.cyc_secs,
                v_mps: raw.cyc_mps,
                grade: raw.cyc_grade,
                road_chg_class: raw.cyc_road_type.round().max(0.0) as usize,
            });
        }
        Ok(Self::from_record(&rows)?)
    }

    /// Prefix of this cycle containing only samples with `t_s <= t_end`.
    pub fn clip_by_time(&self, t_end: f64) -> Self {
        let n = self.t_s.partition_point(|&t| t <= t_end).max(2);
        let n = n.min(self.len());
        Self {
            t_s: self.t_s[..n].to_vec(),
            v_mps: self.v_mps[..n].to_vec(),
            grade: self.grade[..n].to_vec(),
            road_chg_class: self.road_chg_class[..n].to_vec(),
            dt: self.dt[..n].to_vec(),
            v_mph: self.v_mph[..n].to_vec(),
        }
    }

    /// Concatenate another cycle's samples after this one, shifting the
    /// appended cycle's times to continue from this cycle's end. Used by
    /// the cycle-doubling law in the test suite.
    pub fn concat(&self, other: &Cycle) -> Self {
        let offset = *self.t_s.last().unwrap();
        let dt0 = other.dt.first().copied().unwrap_or(0.0);
        let mut rows: Vec<CycleRow> = (0..self.len())
            .map(|i| CycleRow {
                t_s: self.t_s[i],
                v_mps: self.v_mps[i],
                grade: self.grade[i],
                road_chg_class: self.road_chg_class[i],
            })
            .collect();
        for i in 1..other.len() {
            rows.push(CycleRow {
                t_s: offset + (other.t_s[i] - other.t_s[0]) + dt0,
                v_mps: other.v_mps[i],
                grade: other.grade[i],
                road_chg_class: other.road_chg_class[i],
            });
        }
        Self::from_record(&rows).expect("concatenation of two valid cycles stays valid")
    }

    pub fn len(&self) -> usize {
        self.t_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_s.is_empty()
    }

    pub fn t_s(&self) -> &[f64] {
        &self.t_s
    }
    pub fn v_mps(&self) -> &[f64] {
        &self.v_mps
    }
    pub fn v_mph(&self) -> &[f64] {
        &self.v_mph
    }
    pub fn grade(&self) -> &[f64] {
        &self.grade
    }
    pub fn road_chg_class(&self) -> &[usize] {
        &self.road_chg_class
    }
    pub fn dt(&self) -> &[f64] {
        &self.dt
    }
}

#[derive(Debug, Deserialize)]
struct CsvCycleRow {
    #[serde(rename = "cycSecs")]
    cyc_secs: f64,
    #[serde(rename = "cycMps")]
    cyc_mps: f64,
    #[serde(rename = "cycGrade")]
    cyc_grade: f64,
    #[serde(rename = "cycRoadType")]
    cyc_road_type: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_cycle(n: usize) -> Cycle {
        let rows: Vec<CycleRow> = (0..n)
            .map(|i| CycleRow {
                t_s: i as f64,
                v_mps: 10.0,
                grade: 0.0,
                road_chg_class: 0,
            })
            .collect();
        Cycle::from_record(&rows).unwrap()
    }

    #[test]
    fn rejects_too_short_cycle() {
        let rows = vec![CycleRow {
            t_s: 0.0,
            v_mps: 0.0,
            grade: 0.0,
            road_chg_class: 0,
        }];
        assert!(matches!(
            Cycle::from_record(&rows),
            Err(SimError::InvalidCycle(_))
        ));
    }

    #[test]
    fn rejects_non_monotone_time() {
        let rows = vec![
            CycleRow {
                t_s: 0.0,
                v_mps: 0.0,
                grade: 0.0,
                road_chg_class: 0,
            },
            CycleRow {
                t_s: 0.0,
                v_mps: 1.0,
                grade: 0.0,
                road_chg_class: 0,
            },
        ];
        assert!(matches!(
            Cycle::from_record(&rows),
            Err(SimError::InvalidCycle(_))
        ));
    }

    #[test]
    fn dt_and_mph_are_derived() {
        let cyc = flat_cycle(5);
        assert_eq!(cyc.dt()[0], 0.0);
        assert_eq!(cyc.dt()[1], 1.0);
        assert!((cyc.v_mph()[0] - 10.0 * MPH_PER_MPS).abs() < 1e-9);
    }

    #[test]
    fn concat_doubles_length_minus_one() {
        let a = flat_cycle(5);
        let b = flat_cycle(5);
        let c = a.concat(&b);
        assert_eq!(c.len(), 9);
        assert!(c.t_s().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn clip_by_time_truncates() {
        let cyc = flat_cycle(10);
        let clipped = cyc.clip_by_time(4.0);
        assert_eq!(clipped.len(), 5);
    }
}
