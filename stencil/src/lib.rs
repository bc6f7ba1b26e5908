//! # Stencil
//!
//! Directive-driven, type-aware code generation.
//!
//! Struct fields tagged with a `codegen:"..."` directive name a generator
//! type; the generator's template is executed against the annotated type and
//! the fragments are collected into one generated file per source file.
//!
//! ## Quick Start
//!
//! ```ignore
//! use stencil::prelude::*;
//!
//! let universe = load_universe(Path::new("universe.xml"))?;
//! validate_universe(&universe)?;
//!
//! let mut generator = Generator::new(&universe, GeneratorConfig::default());
//! let report = generator.process_files(&["src/app/models.go"], &mut FileOutputWriter::new());
//! ```
//!
//! ## Crate Organization
//!
//! - [`universe`] - Resolved type universe, structural queries, XML loader
//! - [`codegen`] - Directive extraction, sessions, templates, output

pub mod prelude;

/// Resolved type universe.
pub mod universe {
    pub use stencil_universe::*;
}

/// Directive-driven generation pipeline.
pub mod codegen {
    pub use stencil_codegen::*;
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
