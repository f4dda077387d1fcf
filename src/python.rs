//! Python bindings.
//!
//! Payloads cross the boundary as JSON strings; results come back as native
//! Python dicts and lists. File uploads are delegated to a Python object
//! exposing `upload_file_path` / `upload_file_str`.

use std::path::Path;

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ParseError, UploadError};
use crate::model::records::AdapterTarget;
use crate::model::sentinels::{HIDDEN, NOTSET, SETTING_UNCHANGED};
use crate::model::settings::{FileRef, SettingCatalog};
use crate::model::raw::RawSchema;
use crate::validation::upload::FileUploader;
use crate::{init_logger, parse_adapters_json, parse_fields_json};

create_exception!(axonapi_core, ApiError, PyException);
create_exception!(axonapi_core, ConfigError, ApiError);
create_exception!(axonapi_core, NotFoundError, ApiError);

fn to_py_err(err: ParseError) -> PyErr {
    match err {
        ParseError::DuplicateDefinition { .. } | ParseError::MalformedPayload(_) => {
            ApiError::new_err(err.to_string())
        }
        ParseError::ObjectNotFound { .. } => NotFoundError::new_err(err.to_string()),
        _ => ConfigError::new_err(err.to_string()),
    }
}

fn parse_json(raw: &str, what: &str) -> PyResult<Value> {
    serde_json::from_str(raw)
        .map_err(|e| PyValueError::new_err(format!("invalid {} JSON: {}", what, e)))
}

fn value_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(b) => b.into_py(py),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.into_py(py),
            (None, Some(u)) => u.into_py(py),
            _ => n.as_f64().unwrap_or(f64::NAN).into_py(py),
        },
        Value::String(s) => s.into_py(py),
        Value::Array(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(value_to_py(py, item)?)?;
            }
            list.into_py(py)
        }
        Value::Object(map) => {
            let dict = PyDict::new(py);
            for (key, item) in map {
                dict.set_item(key, value_to_py(py, item)?)?;
            }
            dict.into_py(py)
        }
    })
}

fn to_py<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let value = serde_json::to_value(value).map_err(|e| PyValueError::new_err(e.to_string()))?;
    value_to_py(py, &value)
}

/// Upload collaborator backed by a Python object.
struct PyUploader {
    inner: PyObject,
}

impl PyUploader {
    fn call(
        &self,
        method: &str,
        build: impl FnOnce(Python<'_>, &PyDict) -> PyResult<()>,
    ) -> Result<FileRef, UploadError> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            build(py, kwargs).map_err(|e| UploadError::Transport(e.to_string()))?;
            let response = self
                .inner
                .call_method(py, method, (), Some(kwargs))
                .map_err(|e| UploadError::Transport(e.to_string()))?;
            let response = response.as_ref(py);
            let uuid: String = response
                .get_item("uuid")
                .and_then(|v| v.extract())
                .map_err(|_| UploadError::InvalidResponse("uuid".to_string()))?;
            let filename: String = response
                .get_item("filename")
                .and_then(|v| v.extract())
                .map_err(|_| UploadError::InvalidResponse("filename".to_string()))?;
            Ok(FileRef { uuid, filename })
        })
    }
}

impl FileUploader for PyUploader {
    fn upload_path(
        &self,
        field: &str,
        adapter: &AdapterTarget,
        path: &Path,
        content_type: Option<&str>,
    ) -> Result<FileRef, UploadError> {
        self.call("upload_file_path", |py, kwargs| {
            kwargs.set_item("field", field)?;
            kwargs.set_item("adapter", to_py(py, adapter)?)?;
            kwargs.set_item("path", path.display().to_string())?;
            kwargs.set_item("content_type", content_type)?;
            Ok(())
        })
    }

    fn upload_content(
        &self,
        field: &str,
        adapter: &AdapterTarget,
        name: &str,
        content: &[u8],
        content_type: Option<&str>,
    ) -> Result<FileRef, UploadError> {
        self.call("upload_file_str", |py, kwargs| {
            kwargs.set_item("field", field)?;
            kwargs.set_item("adapter", to_py(py, adapter)?)?;
            kwargs.set_item("name", name)?;
            kwargs.set_item("content", PyBytes::new(py, content))?;
            kwargs.set_item("content_type", content_type)?;
            Ok(())
        })
    }
}

/// Normalize a raw field schema payload.
#[pyfunction]
fn parse_fields(py: Python<'_>, raw: &str) -> PyResult<PyObject> {
    init_logger();
    let catalog = parse_fields_json(&parse_json(raw, "fields")?).map_err(to_py_err)?;
    to_py(py, &catalog)
}

/// Normalize a raw adapter status payload.
#[pyfunction]
fn parse_adapters(py: Python<'_>, raw: &str) -> PyResult<PyObject> {
    init_logger();
    let adapters = parse_adapters_json(&parse_json(raw, "adapters")?).map_err(to_py_err)?;
    to_py(py, &adapters)
}

/// Resolve a `{items, required}` schema blob into settings keyed by name.
#[pyfunction]
fn resolve_settings(py: Python<'_>, raw_schema: &str) -> PyResult<PyObject> {
    init_logger();
    let schema: RawSchema = serde_json::from_value(parse_json(raw_schema, "schema")?)
        .map_err(|e| to_py_err(e.into()))?;
    to_py(py, &crate::normalize::resolve_settings(&schema))
}

/// Validate `raw` against `settings`.
///
/// # Arguments
/// * `raw` - Config to validate (JSON object)
/// * `settings` - Settings keyed by name, as returned by `resolve_settings`
/// * `source` - Label used in error messages
/// * `adapter` - Adapter identity for file uploads (JSON object)
/// * `uploader` - Object with `upload_file_path` / `upload_file_str`
#[pyfunction]
#[pyo3(signature = (raw, settings, source, adapter=None, uploader=None))]
fn parse_config(
    py: Python<'_>,
    raw: &str,
    settings: &str,
    source: &str,
    adapter: Option<&str>,
    uploader: Option<PyObject>,
) -> PyResult<PyObject> {
    init_logger();

    let raw: Map<String, Value> = serde_json::from_value(parse_json(raw, "config")?)
        .map_err(|e| to_py_err(e.into()))?;
    let settings: SettingCatalog = serde_json::from_value(parse_json(settings, "settings")?)
        .map_err(|e| to_py_err(e.into()))?;
    let adapter: Option<AdapterTarget> = adapter
        .map(|a| {
            parse_json(a, "adapter")
                .and_then(|v| serde_json::from_value(v).map_err(|e| to_py_err(e.into())))
        })
        .transpose()?;
    let uploader = uploader.map(|inner| PyUploader { inner });

    let resolved = crate::validation::parse_config(
        &raw,
        &settings,
        source,
        adapter.as_ref(),
        uploader.as_ref().map(|u| u as &dyn FileUploader),
    )
    .map_err(to_py_err)?;

    to_py(py, &resolved)
}

/// Python module definition
#[pymodule]
fn axonapi_core(py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_fields, m)?)?;
    m.add_function(wrap_pyfunction!(parse_adapters, m)?)?;
    m.add_function(wrap_pyfunction!(resolve_settings, m)?)?;
    m.add_function(wrap_pyfunction!(parse_config, m)?)?;
    m.add("SETTING_UNCHANGED", SETTING_UNCHANGED.to_vec())?;
    m.add("HIDDEN", HIDDEN)?;
    m.add("NOTSET", NOTSET)?;
    m.add("ApiError", py.get_type::<ApiError>())?;
    m.add("ConfigError", py.get_type::<ConfigError>())?;
    m.add("NotFoundError", py.get_type::<NotFoundError>())?;
    Ok(())
}
