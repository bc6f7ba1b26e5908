//! # Stencil Universe
//!
//! Resolved type universe consumed by the Stencil generator.
//!
//! This crate provides:
//! - Type identities and structural type shapes
//! - Packages, declarations, and declaration positions
//! - Structural queries (fields, embedding, method sets, interface satisfaction)
//! - Source-style type rendering
//! - An XML interchange loader and universe validation

pub mod display;
pub mod error;
pub mod parser;
pub mod query;
pub mod types;
pub mod universe;
pub mod validation;

pub use error::{ParseError, UniverseError};
pub use parser::{load_universe, parse_universe};
pub use types::{
    BasicKind, ChanDir, Field, InterfaceShape, Method, Signature, StructShape, Tuple,
    TypeIdentity, TypeShape, Var,
};
pub use universe::{MethodDecl, Package, Position, TypeDecl, Universe};
pub use validation::validate_universe;
