//! # docx2xml
//!
//! DOCX to annotated XML converter, plus a font reviewer that highlights runs
//! set in the wrong font and attaches review comments.
//!
//! ## Example
//!
//! ```no_run
//! use docx2xml::{ConvertOptions, DocxToXml, Layout};
//!
//! let options = ConvertOptions {
//!     layout: Layout::Runs,
//!     ..Default::default()
//! };
//!
//! let converter = DocxToXml::new(options);
//! let xml = converter.convert("document.docx").unwrap();
//! println!("{}", xml);
//! ```
//!
//! The XML produced in the [`Layout::Runs`] layout is a style table that the
//! [`Annotator`] reads back:
//!
//! ```no_run
//! use docx2xml::{AnnotateOptions, Annotator};
//!
//! let report = Annotator::new(AnnotateOptions::default())
//!     .annotate("document.docx", "styles.xml", "reviewed.docx")
//!     .unwrap();
//! println!("{} runs flagged", report.runs_flagged);
//! ```

pub mod adapters;
pub mod annotate;
pub mod color;
pub mod converter;
pub mod core;
pub mod docx;
pub mod error;
pub mod localization;
pub mod render;

pub use annotate::{annotate, AnnotateOptions, AnnotationReport, Annotator, StyleTable};
pub use color::{ColorNamer, FallbackNamer, LocalPalette, Rgb};
pub use converter::DocxToXml;
pub use error::{Error, Result};
pub use localization::{EnglishLocalization, LocalizationStrategy, RussianLocalization};

#[cfg(feature = "color-api")]
pub use color::ColorApiNamer;

/// Options for DOCX to XML conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Shape of paragraph-level nodes.
    pub layout: Layout,
    /// Whether paragraph and cell text is cut before the first period.
    pub truncate_at_period: bool,
    /// Whether page margins are emitted as `parameters_page` nodes.
    pub include_page_parameters: bool,
    /// Whether footnotes are emitted after the tables.
    pub include_footnotes: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Outline,
            truncate_at_period: true,
            include_page_parameters: true,
            include_footnotes: true,
        }
    }
}

/// Specifies how paragraph-level nodes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Paragraph text as element text, style of the first run as attributes.
    #[default]
    Outline,
    /// One `content` child per run; the format read back by the annotator.
    Runs,
}

// Python bindings (only when 'python' feature is enabled)
#[cfg(feature = "python")]
mod python_bindings {
    use super::*;
    use pyo3::prelude::*;

    fn to_py_err(e: Error) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
    }

    /// Converts a DOCX file to XML; `runs=True` produces a style table.
    #[pyfunction]
    #[pyo3(signature = (path, runs = false))]
    fn convert_docx(path: String, runs: bool) -> PyResult<String> {
        let options = ConvertOptions {
            layout: if runs { Layout::Runs } else { Layout::Outline },
            ..Default::default()
        };
        DocxToXml::new(options).convert(&path).map_err(to_py_err)
    }

    /// Highlights runs whose font differs from `expected_font`; returns the number flagged.
    #[pyfunction]
    #[pyo3(signature = (path, style_table, output, expected_font = None))]
    fn annotate_docx(
        path: String,
        style_table: String,
        output: String,
        expected_font: Option<String>,
    ) -> PyResult<usize> {
        let mut options = AnnotateOptions::default();
        if let Some(font) = expected_font {
            options.expected_font = font;
        }
        Annotator::new(options)
            .annotate(&path, &style_table, &output)
            .map(|report| report.runs_flagged)
            .map_err(to_py_err)
    }

    /// A Python module implemented in Rust.
    #[pymodule]
    pub fn docx2xml(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(convert_docx, m)?)?;
        m.add_function(wrap_pyfunction!(annotate_docx, m)?)?;
        Ok(())
    }
}
