//! Error types for code generation.

use crate::directive::DirectiveSyntaxError;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Universe document parsing error.
    #[error("universe parse error: {0}")]
    Parse(#[from] stencil_universe::ParseError),

    /// Universe consistency or file resolution error.
    #[error("universe error: {0}")]
    Universe(#[from] stencil_universe::UniverseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directive tag or argument syntax error.
    #[error("malformed directive on field '{field}' of '{target}': {source}")]
    MalformedDirective {
        /// Type carrying the directive.
        target: String,
        /// Field carrying the directive.
        field: String,
        /// Syntax problem.
        #[source]
        source: DirectiveSyntaxError,
    },

    /// Directive on a field whose type is not a declared named type.
    #[error("directive on field '{field}' of '{target}' must use a declared named type, found {found}")]
    InvalidGeneratorType {
        /// Type carrying the directive.
        target: String,
        /// Field carrying the directive.
        field: String,
        /// Description of the field type.
        found: String,
    },

    /// Nested directives recurse deeper than the configured bound.
    #[error("directive nesting through '{generator}' exceeds the depth limit of {limit}")]
    RecursionLimitExceeded {
        /// Generator being expanded when the bound was hit.
        generator: String,
        /// Configured bound.
        limit: usize,
    },

    /// Template file could not be read.
    #[error("template for '{generator}' not found at '{}': {source}", path.display())]
    TemplateNotFound {
        /// Generator type.
        generator: String,
        /// Attempted path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Template source failed to parse.
    #[error("template for '{generator}' at '{}' failed to parse: {message}", path.display())]
    TemplateParseError {
        /// Generator type.
        generator: String,
        /// Template path.
        path: PathBuf,
        /// Engine message.
        message: String,
    },

    /// Template asked for an argument the directive does not supply.
    #[error("required argument '{name}' not found")]
    MissingRequiredArgument {
        /// Argument name.
        name: String,
    },

    /// Type-graph walk reached a shape it does not handle.
    #[error("cannot collect references for {kind} '{shape}'")]
    UnsupportedTypeShape {
        /// Shape variant.
        kind: String,
        /// Rendered shape.
        shape: String,
    },

    /// Interface name did not resolve.
    #[error("interface '{name}' not found")]
    InterfaceNotFound {
        /// Requested name.
        name: String,
    },

    /// Resolved type is not interface shaped.
    #[error("'{name}' is not an interface")]
    NotAnInterface {
        /// Requested name.
        name: String,
    },

    /// Template engine execution failure.
    #[error("template execution error: {message}")]
    Execution {
        /// Engine message.
        message: String,
    },

    /// Failure while running one invocation.
    #[error("generating '{generator}' for '{target}': {source}")]
    Invocation {
        /// Generator type.
        generator: String,
        /// Target type.
        target: String,
        /// Underlying failure.
        #[source]
        source: Box<CodegenError>,
    },

    /// File carries no directives at all.
    #[error("no directives found in '{}'", file.display())]
    NoDirectivesFound {
        /// Processed file.
        file: PathBuf,
    },
}

impl CodegenError {
    /// Creates a template execution error with the given message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Wraps an error with the invocation it occurred in.
    pub fn in_invocation(
        self,
        generator: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::Invocation {
            generator: generator.into(),
            target: target.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through invocation annotations.
    #[must_use]
    pub fn root_cause(&self) -> &CodegenError {
        match self {
            Self::Invocation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
