//! Python bindings for catseq via PyO3.
//!
//! Mirrors the algebra's own notation: a [`PyMorphism`] overloads `@`
//! (`__matmul__`) for strict serial composition, `>>` (`__rshift__`) for
//! auto-infer serial composition, and `|` (`__or__`) for parallel
//! composition, the same three operators the morphism algebra is named
//! for on the Rust side.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use catseq_core::{
    BoardId, Channel, ChannelKind, CompileOptions, Cycles, DigitalState, NullOracle, compile,
    compose, demo, factory,
};

fn parse_kind(kind: &str) -> PyResult<ChannelKind> {
    match kind {
        "digital" => Ok(ChannelKind::Digital),
        "waveform" => Ok(ChannelKind::Waveform),
        other => Err(PyValueError::new_err(format!(
            "invalid channel kind '{other}', expected 'digital' or 'waveform'"
        ))),
    }
}

fn parse_level(level: &str) -> PyResult<DigitalState> {
    match level {
        "low" => Ok(DigitalState::Low),
        "high" => Ok(DigitalState::High),
        other => Err(PyValueError::new_err(format!(
            "invalid digital level '{other}', expected 'low' or 'high'"
        ))),
    }
}

fn composition_err(err: catseq_core::CompositionError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn compile_err(err: catseq_core::CompileError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A channel on a named board: `Channel("main", "digital", 0)`.
#[pyclass(name = "Channel")]
#[derive(Clone, Copy)]
struct PyChannel(Channel);

#[pymethods]
impl PyChannel {
    #[new]
    fn new(board: &str, kind: &str, local_id: u16) -> PyResult<Self> {
        let kind = parse_kind(kind)?;
        Ok(PyChannel(Channel::new(BoardId::named(board), kind, local_id)))
    }

    fn __repr__(&self) -> String {
        format!("Channel({})", self.0)
    }
}

/// A composed morphism. Build one with the module-level factory functions,
/// then combine with `@`, `>>`, or `|`.
#[pyclass(name = "Morphism")]
#[derive(Clone)]
struct PyMorphism(catseq_core::Morphism);

#[pymethods]
impl PyMorphism {
    fn duration_cycles(&self) -> u64 {
        self.0.duration().0
    }

    fn channel_count(&self) -> usize {
        self.0.channels().count()
    }

    fn __matmul__(&self, other: &PyMorphism) -> PyResult<PyMorphism> {
        compose::serial_strict(&self.0, &other.0)
            .map(PyMorphism)
            .map_err(composition_err)
    }

    fn __rshift__(&self, other: &PyMorphism) -> PyResult<PyMorphism> {
        compose::serial_auto(&self.0, &other.0)
            .map(PyMorphism)
            .map_err(composition_err)
    }

    fn __or__(&self, other: &PyMorphism) -> PyResult<PyMorphism> {
        compose::parallel(&self.0, &other.0)
            .map(PyMorphism)
            .map_err(composition_err)
    }

    /// Compile this morphism with the zero-cost oracle and return
    /// `{board_name: [instruction, ...]}`.
    fn compile(&self, py: Python<'_>) -> PyResult<PyObject> {
        let plan = compile(&self.0, &NullOracle, &CompileOptions::default()).map_err(compile_err)?;
        let dict = pyo3::types::PyDict::new(py);
        for (board, instructions) in &plan {
            let list = pyo3::types::PyList::empty(py);
            for instruction in instructions {
                let json = instruction.to_json();
                let rendered = serde_json::to_string(&json).expect("json round-trips");
                let py_json = py.import("json")?.call_method1("loads", (rendered,))?;
                list.append(py_json)?;
            }
            dict.set_item(board.name(), list)?;
        }
        Ok(dict.into())
    }
}

/// Bring a digital channel to a known-low baseline.
#[pyfunction]
fn digital_init(channel: PyChannel) -> PyMorphism {
    PyMorphism(factory::digital_init(channel.0))
}

/// Hold a digital channel at a level for a duration, in cycles.
#[pyfunction]
fn digital_hold(channel: PyChannel, level: &str, duration_cycles: u64) -> PyResult<PyMorphism> {
    let level = parse_level(level)?;
    Ok(PyMorphism(factory::digital_hold(channel.0, level, Cycles(duration_cycles))))
}

/// A rise/hold/fall digital pulse, in cycles.
#[pyfunction]
fn digital_pulse(channel: PyChannel, duration_cycles: u64) -> PyResult<PyMorphism> {
    factory::digital_pulse(channel.0, Cycles(duration_cycles))
        .map(PyMorphism)
        .map_err(composition_err)
}

/// Initialise a waveform channel to a carrier frequency.
#[pyfunction]
fn wf_init(channel: PyChannel, carrier_hz: f64) -> PyMorphism {
    PyMorphism(factory::wf_init(channel.0, carrier_hz))
}

/// List the names of the built-in demonstration scenarios.
#[pyfunction]
fn scenario_names() -> Vec<&'static str> {
    demo::names().to_vec()
}

/// Build one of the built-in demonstration scenarios by name.
#[pyfunction]
fn build_scenario(name: &str) -> PyResult<PyMorphism> {
    demo::build(name).map(PyMorphism).map_err(PyValueError::new_err)
}

/// Library version.
#[pyfunction]
fn version() -> &'static str {
    catseq_core::VERSION
}

/// Python module definition.
#[pymodule]
fn catseq(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", catseq_core::VERSION)?;
    m.add_class::<PyChannel>()?;
    m.add_class::<PyMorphism>()?;
    m.add_function(wrap_pyfunction!(digital_init, m)?)?;
    m.add_function(wrap_pyfunction!(digital_hold, m)?)?;
    m.add_function(wrap_pyfunction!(digital_pulse, m)?)?;
    m.add_function(wrap_pyfunction!(wf_init, m)?)?;
    m.add_function(wrap_pyfunction!(scenario_names, m)?)?;
    m.add_function(wrap_pyfunction!(build_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}
