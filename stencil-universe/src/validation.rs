//! Universe validation utilities.
//!
//! This module checks that a loaded universe is internally consistent before
//! it is handed to the generator.

use crate::error::UniverseError;
use crate::types::{Signature, TypeShape};
use crate::universe::{TypeDecl, Universe};

/// Validates a loaded universe.
///
/// Every declaration must belong to a loaded package, and every named
/// reference into a loaded package must resolve to a declaration. References
/// into packages that were not loaded are treated as external and accepted.
///
/// # Errors
/// Returns `UniverseError` describing the first inconsistency found.
pub fn validate_universe(universe: &Universe) -> Result<(), UniverseError> {
    for decl in &universe.types {
        if universe.package(&decl.identity.package).is_none() {
            return Err(UniverseError::UnknownPackage {
                identity: decl.identity.to_string(),
                package: decl.identity.package.clone(),
            });
        }
        validate_decl(universe, decl)?;
    }
    Ok(())
}

fn validate_decl(universe: &Universe, decl: &TypeDecl) -> Result<(), UniverseError> {
    validate_shape(universe, decl, &decl.underlying)?;
    for method in &decl.methods {
        validate_signature(universe, decl, &method.signature)?;
    }
    Ok(())
}

fn validate_signature(
    universe: &Universe,
    decl: &TypeDecl,
    sig: &Signature,
) -> Result<(), UniverseError> {
    for var in sig.params.vars.iter().chain(&sig.results.vars) {
        validate_shape(universe, decl, &var.ty)?;
    }
    Ok(())
}

fn validate_shape(
    universe: &Universe,
    decl: &TypeDecl,
    shape: &TypeShape,
) -> Result<(), UniverseError> {
    match shape {
        TypeShape::Named(id) => {
            let loaded = universe.package(&id.package).is_some();
            if loaded && !universe.has_type(id) {
                return Err(UniverseError::UnknownType {
                    identity: id.to_string(),
                    referrer: decl.identity.to_string(),
                });
            }
        }
        TypeShape::Pointer { elem }
        | TypeShape::Slice { elem }
        | TypeShape::Array { elem, .. }
        | TypeShape::Chan { elem, .. } => validate_shape(universe, decl, elem)?,
        TypeShape::Map { key, value } => {
            validate_shape(universe, decl, key)?;
            validate_shape(universe, decl, value)?;
        }
        TypeShape::Struct(s) => {
            for field in &s.fields {
                validate_shape(universe, decl, &field.ty)?;
            }
        }
        TypeShape::Interface(iface) => {
            for embedded in &iface.embedded {
                validate_shape(universe, decl, embedded)?;
            }
            for method in &iface.methods {
                validate_signature(universe, decl, &method.signature)?;
            }
        }
        TypeShape::Signature(sig) => validate_signature(universe, decl, sig)?,
        TypeShape::Tuple(tuple) => {
            for var in &tuple.vars {
                validate_shape(universe, decl, &var.ty)?;
            }
        }
        TypeShape::Union { terms } => {
            for term in terms {
                validate_shape(universe, decl, term)?;
            }
        }
        TypeShape::Basic { .. } | TypeShape::TypeParam { .. } => {}
    }
    Ok(())
}
