//! Typed error surface for the simulator, per the error-handling design.
//!
//! [SimError] is the crate's public failure type. Internal plumbing (CSV
//! parsing, resource lookup) uses [anyhow::Result] and attaches context with
//! [anyhow::Context::with_context], converting into a [SimError] variant
//! only at the boundary where the caller needs to branch on error kind.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Non-monotone time, negative speed, or fewer than 2 samples.
    #[error("invalid cycle: {0}")]
    InvalidCycle(String),

    /// Missing field, out-of-range SOC window, negative mass, or an
    /// unsupported `fcEffType`/`vehPtType`.
    #[error("invalid vehicle: {0}")]
    InvalidVehicle(String),

    /// `initSoc` was outside `[0, 1]`. Not fatal: callers that catch this
    /// still get a result, run with the powertrain-type default SOC.
    #[error("initial SOC {0} outside [0, 1], using powertrain default")]
    InvalidInitialSoc(f64),

    /// HEV charge-balance loop exhausted its iteration budget. Not fatal:
    /// the last attempted run is still returned, flagged `converged: false`.
    #[error("charge-balance loop did not converge after {0} iterations")]
    NonConvergence(u32),

    /// Cubic speed solve produced no finite root. Fatal: the step cannot be
    /// completed.
    #[error("speed solve at step {step} produced no finite root (target {target_mps} m/s)")]
    NumericFailure { step: usize, target_mps: f64 },
}
