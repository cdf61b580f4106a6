//! Embarrassingly-parallel sweeps over many (cycle, vehicle) pairs. Each
//! pair is simulated independently, so a rayon data-parallel map is enough —
//! no shared mutable state crosses pairs.

use rayon::prelude::*;

use crate::cycle::Cycle;
use crate::driver::Driver;
use crate::error::SimError;
use crate::post_process::Summary;
use crate::vehicle::Vehicle;

/// One sweep entry: a vehicle run against a cycle, optionally seeded with a
/// caller-chosen initial SOC.
pub struct BatchCase<'a> {
    pub cyc: &'a Cycle,
    pub veh: &'a Vehicle,
    pub init_soc: Option<f64>,
}

/// Run every case concurrently and collect each one's summary in order.
/// A failing case's error takes the place of its summary; the rest of the
/// sweep still completes.
pub fn run_batch(cases: &[BatchCase]) -> Vec<Result<Summary, SimError>> {
    cases
        .par_iter()
        .map(|case| {
            let result = Driver::new(case.cyc, case.veh).run(case.init_soc)?;
            Ok(result.summary(case.veh, case.cyc))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleRow;
    use crate::vehicle::fixtures;

    fn short_cycle() -> Cycle {
        Cycle::from_record(&[
            CycleRow { t_s: 0.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 1.0, v_mps: 5.0, grade: 0.0, road_chg_class: 0 },
            CycleRow { t_s: 2.0, v_mps: 0.0, grade: 0.0, road_chg_class: 0 },
        ])
        .unwrap()
    }

    #[test]
    fn batch_runs_every_case() {
        let cyc = short_cycle();
        let conv = fixtures::conv();
        let bev = fixtures::bev();
        let cases = vec![
            BatchCase { cyc: &cyc, veh: &conv, init_soc: None },
            BatchCase { cyc: &cyc, veh: &bev, init_soc: None },
        ];
        let results = run_batch(&cases);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }
}
