use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::error::HfError;

fn to_py_err(err: HfError) -> PyErr {
    match err {
        HfError::Io(e) => PyIOError::new_err(e.to_string()),
        HfError::NoReader(p) => PyIOError::new_err(format!("no reader for {}", p.display())),
        other => PyValueError::new_err(other.to_string()),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-FUNKSJONER (JSON inn/ut, se crate::api)
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
#[pyo3(signature = (samples_json, cfg_json = None))]
fn analyze_samples_json(samples_json: &str, cfg_json: Option<&str>) -> PyResult<String> {
    crate::api::analyze_samples_json(samples_json, cfg_json).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (path, cfg_json = None))]
fn analyze_igc_file(path: &str, cfg_json: Option<&str>) -> PyResult<String> {
    crate::api::analyze_igc_file(path, cfg_json).map_err(to_py_err)
}

#[pyfunction]
fn metrics_text() -> PyResult<String> {
    let metrics = crate::metrics::global().ok_or_else(|| PyValueError::new_err("metrics registry unavailable"))?;
    metrics.gather_text().map_err(|e| PyValueError::new_err(e.to_string()))
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analyze_samples_json, m)?)?;
    m.add_function(wrap_pyfunction!(analyze_igc_file, m)?)?;
    m.add_function(wrap_pyfunction!(metrics_text, m)?)?;
    Ok(())
}
