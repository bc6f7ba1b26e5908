//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use stencil::prelude::*;
//! ```

// Universe types
pub use stencil_universe::{
    Field, Package, StructShape, TypeDecl, TypeIdentity, TypeShape, Universe, load_universe,
    parse_universe, validate_universe,
};

// Generation pipeline
pub use stencil_codegen::{
    ArgumentMap, CodegenError, DirectiveExtractor, ExecutionContext, FileOutputWriter,
    GeneratedFile, GenerationSession, Generator, GeneratorConfig, HandlebarsEngine, Invocation,
    OutputWriter, RunReport, StreamOutputWriter, TemplateEngine,
};
