//! Type conversion utilities for the FFI boundary
//!
//! Converts between Python dicts and the engine's config/input types, and
//! renders results back as nested Python objects via their JSON form.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::driver::SimulationConfig;
use crate::models::inputs::{DailyCapacity, DailyDemand};
use crate::models::item::{BacklogItem, Complexity, Priority};
use crate::models::profile::PropagationProfile;
use crate::overflow::OverflowStrategy;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field from a Python dict with a clear error message.
fn extract_required<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
) -> PyResult<T> {
    dict.get_item(key)?
        .ok_or_else(|| PyValueError::new_err(format!("Missing required field '{}'", key)))?
        .extract()
}

/// Extract an optional field. Missing keys and `None` both read as `None`.
fn extract_optional<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
) -> PyResult<Option<T>> {
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Parse an ISO `YYYY-MM-DD` date string.
fn parse_date(value: &str, field: &str) -> PyResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        PyValueError::new_err(format!("Field '{}' is not an ISO date: {}", field, e))
    })
}

/// Parse a snake_case enum name (priority, complexity, overflow strategy)
/// through its serde representation.
fn parse_enum<T: DeserializeOwned>(value: &str, field: &str) -> PyResult<T> {
    serde_json::from_value(Value::String(value.to_string()))
        .map_err(|_| PyValueError::new_err(format!("Invalid value '{}' for '{}'", value, field)))
}

fn parse_count_map<T: DeserializeOwned + Ord>(
    raw: HashMap<String, usize>,
    field: &str,
) -> PyResult<BTreeMap<T, usize>> {
    raw.into_iter()
        .map(|(k, v)| Ok((parse_enum::<T>(&k, field)?, v)))
        .collect()
}

// ========================================================================
// Config Parsing
// ========================================================================

/// Parse the profile dict. Absent fields keep their defaults.
pub fn parse_profile(dict: &Bound<'_, PyDict>) -> PyResult<PropagationProfile> {
    let mut profile = PropagationProfile::default();

    if let Some(v) = extract_optional(dict, "propagation_rate")? {
        profile.propagation_rate = v;
    }
    if let Some(v) = extract_optional(dict, "decay_rate")? {
        profile.decay_rate = v;
    }
    profile.max_backlog_capacity = extract_optional(dict, "max_backlog_capacity")?;
    if let Some(v) = extract_optional(dict, "aging_enabled")? {
        profile.aging_enabled = v;
    }
    if let Some(v) = extract_optional(dict, "aging_threshold_days")? {
        profile.aging_threshold_days = v;
    }
    if let Some(v) = extract_optional::<String>(dict, "overflow_strategy")? {
        profile.overflow_strategy = parse_enum::<OverflowStrategy>(&v, "overflow_strategy")?;
    }
    if let Some(v) = extract_optional(dict, "sla_breach_threshold_days")? {
        profile.sla_breach_threshold_days = v;
    }
    if let Some(v) = extract_optional(dict, "sla_penalty_per_day")? {
        profile.sla_penalty_per_day = v;
    }
    if let Some(v) = extract_optional(dict, "outsourcing_cost_per_item")? {
        profile.outsourcing_cost_per_item = v;
    }
    if let Some(v) = extract_optional(dict, "recovery_rate_multiplier")? {
        profile.recovery_rate_multiplier = v;
    }
    profile.max_waitlist_size = extract_optional(dict, "max_waitlist_size")?;

    Ok(profile)
}

pub fn parse_capacity(dict: &Bound<'_, PyDict>) -> PyResult<DailyCapacity> {
    let date_str: String = extract_required(dict, "date")?;
    let date = parse_date(&date_str, "date")?;
    let backlog_hours: f64 = extract_required(dict, "backlog_capacity_hours")?;

    let mut capacity = DailyCapacity::flat(date, backlog_hours);
    if let Some(v) = extract_optional(dict, "total_capacity_hours")? {
        capacity.total_capacity_hours = v;
    }
    if let Some(v) = extract_optional(dict, "new_work_capacity_hours")? {
        capacity.new_work_capacity_hours = v;
    }
    if let Some(v) = extract_optional(dict, "staff_count")? {
        capacity.staff_count = v;
    }
    if let Some(v) = extract_optional(dict, "productivity_modifier")? {
        capacity.productivity_modifier = v;
    }
    capacity.max_items_per_day = extract_optional(dict, "max_items_per_day")?;
    capacity.max_complex_items_per_day = extract_optional(dict, "max_complex_items_per_day")?;

    Ok(capacity)
}

pub fn parse_demand(dict: &Bound<'_, PyDict>) -> PyResult<DailyDemand> {
    let date_str: String = extract_required(dict, "date")?;
    let mut demand = DailyDemand::empty(parse_date(&date_str, "date")?);

    if let Some(raw) = extract_optional::<HashMap<String, usize>>(dict, "new_items_by_priority")? {
        demand.new_items_by_priority = parse_count_map::<Priority>(raw, "new_items_by_priority")?;
    }
    if let Some(raw) = extract_optional::<HashMap<String, usize>>(dict, "new_items_by_complexity")?
    {
        demand.new_items_by_complexity =
            parse_count_map::<Complexity>(raw, "new_items_by_complexity")?;
    }
    if let Some(v) = extract_optional(dict, "total_estimated_effort_hours")? {
        demand.total_estimated_effort_hours = v;
    }

    Ok(demand)
}

pub fn parse_item(dict: &Bound<'_, PyDict>) -> PyResult<BacklogItem> {
    let id: String = extract_required(dict, "id")?;
    let priority: String = extract_required(dict, "priority")?;
    let complexity: String = extract_required(dict, "complexity")?;
    let created: String = extract_required(dict, "created_date")?;
    let due: String = extract_required(dict, "due_date")?;

    let created_date = parse_date(&created, "created_date")?;
    let due_date = parse_date(&due, "due_date")?;
    if due_date < created_date {
        return Err(PyValueError::new_err(format!(
            "Item '{}' has due_date before created_date",
            id
        )));
    }

    let mut item = BacklogItem::new(
        id,
        parse_enum::<Priority>(&priority, "priority")?,
        parse_enum::<Complexity>(&complexity, "complexity")?,
        created_date,
        due_date,
    );
    if let Some(effort) = extract_optional::<f64>(dict, "effort_hours")? {
        if effort < 0.0 {
            return Err(PyValueError::new_err("effort_hours must be non-negative"));
        }
        item = item.with_effort_hours(effort);
    }
    if let Some(batch) = extract_optional::<String>(dict, "source_batch")? {
        item = item.with_source_batch(batch);
    }
    if let Some(days) = extract_optional::<u32>(dict, "days_in_backlog")? {
        item = item.with_initial_age(days);
    }

    Ok(item)
}

/// The full payload a run needs, parsed from one config dict.
pub struct ParsedRun {
    pub config: SimulationConfig,
    pub initial_backlog: Vec<BacklogItem>,
    pub capacities: Vec<DailyCapacity>,
    pub demands: Vec<DailyDemand>,
}

pub fn parse_run_config(dict: &Bound<'_, PyDict>) -> PyResult<ParsedRun> {
    let start: String = extract_required(dict, "start_date")?;
    let end: String = extract_required(dict, "end_date")?;

    let profile = match dict.get_item("profile")? {
        Some(value) if !value.is_none() => parse_profile(value.downcast::<PyDict>()?)?,
        _ => PropagationProfile::default(),
    };

    let config = SimulationConfig {
        profile,
        start_date: parse_date(&start, "start_date")?,
        end_date: parse_date(&end, "end_date")?,
        seed: extract_optional(dict, "seed")?.unwrap_or(42),
        recovery_mode: extract_optional(dict, "recovery_mode")?.unwrap_or(false),
    };

    let mut initial_backlog = Vec::new();
    if let Some(items) = extract_optional::<Vec<Bound<'_, PyDict>>>(dict, "initial_backlog_items")?
    {
        for item in &items {
            initial_backlog.push(parse_item(item)?);
        }
    }

    let capacity_dicts: Vec<Bound<'_, PyDict>> = extract_required(dict, "daily_capacities")?;
    let capacities = capacity_dicts
        .iter()
        .map(parse_capacity)
        .collect::<PyResult<Vec<_>>>()?;

    let demand_dicts: Vec<Bound<'_, PyDict>> = extract_required(dict, "daily_demands")?;
    let demands = demand_dicts
        .iter()
        .map(parse_demand)
        .collect::<PyResult<Vec<_>>>()?;

    Ok(ParsedRun {
        config,
        initial_backlog,
        capacities,
        demands,
    })
}

// ========================================================================
// Result Conversion
// ========================================================================

/// Render a JSON value as the equivalent Python object tree.
pub fn json_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(b) => b.to_object(py),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_object(py)
            } else if let Some(u) = n.as_u64() {
                u.to_object(py)
            } else {
                n.as_f64().unwrap_or(f64::NAN).to_object(py)
            }
        }
        Value::String(s) => s.to_object(py),
        Value::Array(arr) => {
            let list = PyList::empty_bound(py);
            for item in arr {
                list.append(json_to_py(py, item)?)?;
            }
            list.into_any().unbind()
        }
        Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (key, item) in map {
                dict.set_item(key, json_to_py(py, item)?)?;
            }
            dict.into_any().unbind()
        }
    })
}
