//! CLI support for molang
//!
//! Provides programmatic access to the `molang` binary's commands so other
//! tools can evaluate formulas the same way.

mod convert;
mod docs;
mod eval;

pub use convert::{json_to_molang, molang_to_json, parse_context};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use eval::{EvalOptions, EvalResult, execute_eval};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::RuntimeError),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Context must be a JSON object, found {0}")]
    InvalidContext(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Unknown category: '{0}'\nRun 'molang docs' to see available categories.")]
    UnknownCategory(String),
}
