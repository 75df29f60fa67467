//! PyO3 wrapper for the simulation driver

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{json_to_py, parse_run_config, ParsedRun};
use crate::driver::SimulationDriver;

/// Python entry point for one simulation run.
///
/// # Example (from Python)
///
/// ```python
/// from backlog_simulator._core import Simulation
///
/// sim = Simulation.new({
///     "start_date": "2024-03-01",
///     "end_date": "2024-03-30",
///     "seed": 42,
///     "profile": {"decay_rate": 0.05, "overflow_strategy": "defer"},
///     "daily_capacities": [
///         {"date": "2024-03-01", "backlog_capacity_hours": 24.0},
///         # ...
///     ],
///     "daily_demands": [
///         {"date": "2024-03-01", "new_items_by_priority": {"high": 10}},
///         # ...
///     ],
/// })
/// result = sim.run()
/// print(result["summary"]["final_backlog_size"])
/// ```
#[pyclass(name = "Simulation")]
pub struct PySimulation {
    parsed: ParsedRun,
}

#[pymethods]
impl PySimulation {
    /// Build a simulation from a configuration dict.
    ///
    /// Raises `ValueError` on missing fields, malformed dates, or unknown
    /// enum names.
    #[staticmethod]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        Ok(PySimulation {
            parsed: parse_run_config(config)?,
        })
    }

    /// Execute the run and return the full result as nested dicts.
    ///
    /// Re-running is allowed and produces an identical result: each call
    /// starts from the parsed config and initial backlog.
    fn run(&self, py: Python<'_>) -> PyResult<PyObject> {
        let mut driver = SimulationDriver::new(
            self.parsed.config.clone(),
            self.parsed.initial_backlog.clone(),
        )
        .map_err(|e| PyValueError::new_err(format!("Invalid configuration: {}", e)))?;

        let result = driver
            .run(&self.parsed.capacities, &self.parsed.demands)
            .map_err(|e| PyRuntimeError::new_err(format!("Simulation failed: {}", e)))?;

        let value = serde_json::to_value(&result)
            .map_err(|e| PyRuntimeError::new_err(format!("Result serialization failed: {}", e)))?;

        json_to_py(py, &value)
    }

    /// SHA-256 digest of the run's result, for determinism checks.
    fn digest(&self) -> PyResult<String> {
        let mut driver = SimulationDriver::new(
            self.parsed.config.clone(),
            self.parsed.initial_backlog.clone(),
        )
        .map_err(|e| PyValueError::new_err(format!("Invalid configuration: {}", e)))?;

        let result = driver
            .run(&self.parsed.capacities, &self.parsed.demands)
            .map_err(|e| PyRuntimeError::new_err(format!("Simulation failed: {}", e)))?;

        result
            .digest()
            .map_err(|e| PyRuntimeError::new_err(format!("Digest failed: {}", e)))
    }

    /// Number of days the configured run covers.
    fn total_days(&self) -> i64 {
        (self.parsed.config.end_date - self.parsed.config.start_date).num_days() + 1
    }
}
