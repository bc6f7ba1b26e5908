//! # Stencil Codegen
//!
//! Directive-driven code generation over a resolved type universe.
//!
//! This crate provides:
//! - Directive extraction from struct field tags, with nested expansion
//! - Template discovery and caching per generator type
//! - Generation sessions with invocation deduplication
//! - A template execution context with structural type queries
//! - A Handlebars template engine and generated file writers

pub mod config;
pub mod context;
pub mod directive;
pub mod engine;
pub mod error;
pub mod extract;
pub mod generator;
pub mod invocation;
pub mod locator;
pub mod output;
pub mod session;
pub mod walker;

pub use config::GeneratorConfig;
pub use context::ExecutionContext;
pub use directive::{ArgumentMap, DirectiveSyntaxError};
pub use engine::{EngineError, HandlebarsEngine, TemplateEngine};
pub use error::CodegenError;
pub use extract::DirectiveExtractor;
pub use generator::{Generator, RunReport};
pub use invocation::{Invocation, InvocationKey};
pub use locator::TemplateLocator;
pub use output::{FileOutputWriter, GeneratedFile, OutputWriter, StreamOutputWriter};
pub use session::{GenerationSession, ReferenceSet, SessionOutput};

use std::path::Path;

/// Generates the output for one source file from a universe document.
///
/// # Arguments
/// * `xml` - Universe interchange document
/// * `file` - Source file whose struct declarations carry directives
///
/// # Returns
/// The rendered generated file.
///
/// # Errors
/// Returns `CodegenError` if loading, validation, or generation fails.
pub fn generate_from_xml(xml: &str, file: &Path) -> Result<String, CodegenError> {
    let universe = stencil_universe::parse_universe(xml)?;
    stencil_universe::validate_universe(&universe)?;
    let mut generator = Generator::new(&universe, GeneratorConfig::default());
    Ok(generator.generate_file(file)?.render())
}

/// Generates the output for one source file from a universe document on disk.
///
/// # Errors
/// Returns `CodegenError` if reading, loading, validation, or generation
/// fails.
pub fn generate_from_file(universe: &Path, file: &Path) -> Result<String, CodegenError> {
    let xml = std::fs::read_to_string(universe)?;
    generate_from_xml(&xml, file)
}
