//! PyO3 bindings for mathfonts-core

use anyhow::{anyhow, Result};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use regex::Regex;

use mathfonts_core::document::HtmlDocument;
use mathfonts_core::face::{font_faces, FontFaceFilter, FontFaceRule};
use mathfonts_core::inject::{StyleInjector, StyleTarget};

/// Adapts any Python object with an `append_style(str)` method.
struct PyStyleTarget<'py> {
    target: Bound<'py, PyAny>,
}

impl StyleTarget for PyStyleTarget<'_> {
    fn append_style(&mut self, css_text: &str) -> Result<()> {
        self.target.call_method1("append_style", (css_text,))?;
        Ok(())
    }
}

#[pyfunction]
#[pyo3(signature = (base_path=""))]
fn render_css(base_path: &str) -> String {
    StyleInjector::new().render(base_path)
}

#[pyfunction]
#[pyo3(signature = (base_path, target))]
fn inject(base_path: &str, target: Bound<'_, PyAny>) -> PyResult<()> {
    let mut target = PyStyleTarget { target };
    StyleInjector::new()
        .inject(base_path, &mut target)
        .map_err(|err| match err.downcast::<PyErr>() {
            Ok(py_err) => py_err,
            Err(other) => to_py_err(other),
        })
}

#[pyfunction]
#[pyo3(signature = (html, base_path=""))]
fn inject_html(html: String, base_path: &str) -> PyResult<String> {
    let mut doc = HtmlDocument::new(html);
    StyleInjector::new()
        .inject(base_path, &mut doc)
        .map_err(to_py_err)?;
    Ok(doc.into_html())
}

#[pyfunction(name = "font_faces")]
#[pyo3(signature = (base_path=None, families=None, weight=None, style=None))]
fn font_faces_py(
    py: Python<'_>,
    base_path: Option<&str>,
    families: Option<Vec<String>>,
    weight: Option<String>,
    style: Option<String>,
) -> PyResult<Vec<Py<PyAny>>> {
    let rules = select(base_path, families, weight, style).map_err(to_py_err)?;
    to_py_rules(py, &rules)
}

fn select(
    base_path: Option<&str>,
    families: Option<Vec<String>>,
    weight: Option<String>,
    style: Option<String>,
) -> Result<Vec<FontFaceRule>> {
    let filter = FontFaceFilter::new()
        .with_family_patterns(compile_patterns(&families.unwrap_or_default())?)
        .with_weight(weight)
        .with_style(style);

    Ok(font_faces()?
        .iter()
        .filter(|rule| filter.matches(rule))
        .map(|rule| match base_path {
            Some(base) => rule.with_base_path(base),
            None => rule.clone(),
        })
        .collect())
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| anyhow!("invalid regex {p}: {e}")))
        .collect()
}

fn to_py_rules(py: Python<'_>, rules: &[FontFaceRule]) -> PyResult<Vec<Py<PyAny>>> {
    rules
        .iter()
        .map(|rule| {
            let src = rule
                .src
                .iter()
                .map(|list| {
                    list.iter()
                        .map(|source| {
                            let entry = PyDict::new(py);
                            entry.set_item("url", &source.url)?;
                            entry.set_item("format", source.format.as_deref())?;
                            Ok(entry.into_any().unbind())
                        })
                        .collect::<PyResult<Vec<Py<PyAny>>>>()
                })
                .collect::<PyResult<Vec<_>>>()?;

            let dict = PyDict::new(py);
            dict.set_item("family", &rule.family)?;
            dict.set_item("src", src)?;
            dict.set_item("weight", &rule.weight)?;
            dict.set_item("style", &rule.style)?;
            dict.set_item("css", rule.to_css())?;

            Ok(dict.into_any().unbind())
        })
        .collect()
}

fn to_py_err(err: anyhow::Error) -> PyErr {
    PyValueError::new_err(err.to_string())
}

#[pymodule]
#[pyo3(name = "_mathfonts_python")]
fn mathfonts_python(_py: Python<'_>, m: &Bound<PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(render_css, m)?)?;
    m.add_function(wrap_pyfunction!(inject, m)?)?;
    m.add_function(wrap_pyfunction!(inject_html, m)?)?;
    m.add_function(wrap_pyfunction!(font_faces_py, m)?)?;
    Ok(())
}
