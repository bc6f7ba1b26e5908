//! Reference collection over type shapes.

use crate::error::CodegenError;
use stencil_universe::display::type_string;
use stencil_universe::{Signature, Tuple, TypeShape};

/// Walks `shape` and reports the package path of every named type reachable
/// from it, in discovery order. Named types are not expanded; builtin names
/// report nothing.
///
/// # Errors
/// Returns `UnsupportedTypeShape` for type parameters and unions.
pub fn collect_references(
    shape: &TypeShape,
    register: &mut dyn FnMut(&str),
) -> Result<(), CodegenError> {
    match shape {
        TypeShape::Basic { .. } => Ok(()),
        TypeShape::Named(id) => {
            if !id.is_builtin() {
                register(&id.package);
            }
            Ok(())
        }
        TypeShape::Pointer { elem }
        | TypeShape::Slice { elem }
        | TypeShape::Array { elem, .. }
        | TypeShape::Chan { elem, .. } => collect_references(elem, register),
        TypeShape::Map { key, value } => {
            collect_references(key, register)?;
            collect_references(value, register)
        }
        TypeShape::Struct(s) => {
            for field in &s.fields {
                collect_references(&field.ty, register)?;
            }
            Ok(())
        }
        TypeShape::Interface(iface) => {
            for embedded in &iface.embedded {
                collect_references(embedded, register)?;
            }
            for method in &iface.methods {
                collect_signature(&method.signature, register)?;
            }
            Ok(())
        }
        TypeShape::Signature(sig) => collect_signature(sig, register),
        TypeShape::Tuple(tuple) => collect_tuple(tuple, register),
        TypeShape::TypeParam { .. } | TypeShape::Union { .. } => {
            Err(CodegenError::UnsupportedTypeShape {
                kind: shape.kind_name().to_string(),
                shape: type_string(shape, &|_| None),
            })
        }
    }
}

fn collect_signature(sig: &Signature, register: &mut dyn FnMut(&str)) -> Result<(), CodegenError> {
    collect_tuple(&sig.params, register)?;
    collect_tuple(&sig.results, register)
}

fn collect_tuple(tuple: &Tuple, register: &mut dyn FnMut(&str)) -> Result<(), CodegenError> {
    for var in &tuple.vars {
        collect_references(&var.ty, register)?;
    }
    Ok(())
}
