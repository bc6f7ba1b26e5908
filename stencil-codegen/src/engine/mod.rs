//! Template engines.
//!
//! The session only needs two things from an engine: turning template source
//! into a reusable handle, and executing a handle against an
//! [`ExecutionContext`](crate::context::ExecutionContext).

mod handlebars;

pub use self::handlebars::HandlebarsEngine;

use crate::context::ExecutionContext;
use crate::error::CodegenError;
use thiserror::Error;

/// Template source rejected by an engine.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EngineError {
    /// Engine message.
    pub message: String,
}

impl EngineError {
    /// Creates an engine error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A template engine usable by a generation session.
pub trait TemplateEngine {
    /// Parsed template handle.
    type Template;

    /// Parses template source.
    ///
    /// # Errors
    /// Returns `EngineError` if the source is not a valid template.
    fn parse(&self, name: &str, source: &str) -> Result<Self::Template, EngineError>;

    /// Executes a template against a context, returning the fragment.
    ///
    /// # Errors
    /// Returns the typed error raised by a context capability, or
    /// `CodegenError::Execution` for other engine failures.
    fn execute(
        &self,
        template: &Self::Template,
        context: &ExecutionContext<'_>,
    ) -> Result<String, CodegenError>;
}
