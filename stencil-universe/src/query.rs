//! Structural queries over the universe.
//!
//! Pure functions used by template helpers: struct field access (directly and
//! through embedded members), method sets, and interface satisfaction.

use crate::error::UniverseError;
use crate::types::{
    BasicKind, Field, InterfaceShape, Method, Signature, StructShape, Tuple, TypeIdentity,
    TypeShape, is_exported,
};
use crate::universe::Universe;
use std::collections::HashSet;

/// Resolves the struct behind a shape.
///
/// Struct literals are returned directly; named types resolve through their
/// declaration; pointer, slice, array, channel, and map shapes resolve through
/// their element type.
#[must_use]
pub fn struct_of<'a>(universe: &'a Universe, shape: &'a TypeShape) -> Option<&'a StructShape> {
    let mut current = shape;
    for _ in 0..=universe.types.len() + 8 {
        match current {
            TypeShape::Struct(s) => return Some(s),
            TypeShape::Named(id) => current = &universe.get_type(id)?.underlying,
            other => current = other.elem()?,
        }
    }
    None
}

/// Returns the directly declared fields of the struct behind `shape`, in
/// declaration order. Non-struct shapes have no fields.
#[must_use]
pub fn fields<'a>(universe: &'a Universe, shape: &'a TypeShape) -> &'a [Field] {
    struct_of(universe, shape).map_or(&[], |s| s.fields.as_slice())
}

/// Looks up a field by name.
///
/// Direct fields are checked first. Otherwise embedded members are searched
/// breadth first, matching exported names only; a name reached more than once
/// at the shallowest depth is ambiguous and yields `None`, including the same
/// embedded type reached along two paths.
#[must_use]
pub fn lookup_field<'a>(
    universe: &'a Universe,
    shape: &'a TypeShape,
    name: &str,
) -> Option<&'a Field> {
    let root = struct_of(universe, shape)?;
    if let Some(field) = root.field(name) {
        return Some(field);
    }
    if !is_exported(name) {
        return None;
    }

    let mut seen: HashSet<&TypeIdentity> = HashSet::new();
    seen.extend(embedded_identity(shape));
    let mut level = Vec::new();
    push_embeddings(&mut level, root, false, 1, &seen);

    while !level.is_empty() {
        let mut found = None;
        let mut count = 0;

        for embedding in &level {
            seen.insert(embedding.id);
            let Some(s) = universe.get_type(embedding.id).and_then(|d| d.as_struct()) else {
                continue;
            };
            if let Some(field) = s.field(name) {
                found = Some(field);
                count += embedding.paths;
            }
        }

        match count {
            0 => level = next_level(universe, &level, &seen),
            1 => return found,
            _ => return None,
        }
    }

    None
}

/// An embedded type reached at one depth of a breadth-first search.
#[derive(Debug)]
struct Embedding<'a> {
    id: &'a TypeIdentity,
    /// Embedded through a pointer somewhere on the path.
    pointer: bool,
    /// Number of paths reaching it at this depth, saturating at 2.
    paths: usize,
}

/// Appends the embedded members of `s`, merging repeats and skipping types
/// seen at a shallower depth.
fn push_embeddings<'a>(
    level: &mut Vec<Embedding<'a>>,
    s: &'a StructShape,
    pointer: bool,
    paths: usize,
    seen: &HashSet<&'a TypeIdentity>,
) {
    for field in s.fields.iter().filter(|f| f.embedded) {
        let (id, pointer) = match &field.ty {
            TypeShape::Named(id) => (id, pointer),
            TypeShape::Pointer { elem } => match elem.as_ref() {
                TypeShape::Named(id) => (id, true),
                _ => continue,
            },
            _ => continue,
        };
        if seen.contains(id) {
            continue;
        }
        match level.iter_mut().find(|e| e.id == id) {
            Some(existing) => {
                existing.paths = (existing.paths + paths).min(2);
                existing.pointer |= pointer;
            }
            None => level.push(Embedding { id, pointer, paths }),
        }
    }
}

fn next_level<'a>(
    universe: &'a Universe,
    level: &[Embedding<'a>],
    seen: &HashSet<&'a TypeIdentity>,
) -> Vec<Embedding<'a>> {
    let mut next = Vec::new();
    for embedding in level {
        if let Some(s) = universe.get_type(embedding.id).and_then(|d| d.as_struct()) {
            push_embeddings(&mut next, s, embedding.pointer, embedding.paths, seen);
        }
    }
    next
}

/// Identity of an embedded `T` or `*T` field.
fn embedded_identity(ty: &TypeShape) -> Option<&TypeIdentity> {
    match ty {
        TypeShape::Named(id) => Some(id),
        TypeShape::Pointer { elem } => elem.as_named(),
        _ => None,
    }
}

/// Returns the method set of a shape.
///
/// Interfaces contribute all their methods, embedded ones included. A named
/// type contributes its value-receiver methods, a pointer to a named type all
/// of its methods; both add methods promoted through embedded fields. A
/// method promoted from depth `d` is hidden by any field or method of the same
/// name at a shallower depth, and dropped when the name occurs more than once
/// at depth `d`.
///
/// # Errors
/// Returns `UniverseError::UnknownType` if an embedded interface does not
/// resolve.
pub fn method_set(universe: &Universe, shape: &TypeShape) -> Result<Vec<Method>, UniverseError> {
    let mut methods = Vec::new();
    match shape {
        TypeShape::Interface(iface) => {
            collect_interface(universe, iface, "interface", &mut methods, &mut HashSet::new())?;
        }
        TypeShape::Named(id) => collect_named(universe, id, false, &mut methods)?,
        TypeShape::Pointer { elem } => {
            if let TypeShape::Named(id) = elem.as_ref() {
                collect_named(universe, id, true, &mut methods)?;
            }
        }
        _ => {}
    }
    Ok(methods)
}

/// Returns true if `shape` structurally satisfies `iface`.
///
/// # Errors
/// Returns `UniverseError::UnknownType` if an interface embedded in `iface`
/// or in the method set of `shape` does not resolve.
pub fn implements(
    universe: &Universe,
    shape: &TypeShape,
    iface: &InterfaceShape,
) -> Result<bool, UniverseError> {
    let mut required = Vec::new();
    collect_interface(universe, iface, "interface", &mut required, &mut HashSet::new())?;
    if required.is_empty() {
        return Ok(true);
    }

    let available = method_set(universe, shape)?;
    Ok(required.iter().all(|want| {
        available
            .iter()
            .any(|have| have.name == want.name && have.signature.same_shape(&want.signature))
    }))
}

/// The predeclared `error` interface: `Error() string`.
fn builtin_error(id: &TypeIdentity) -> Option<Method> {
    (id.is_builtin() && id.name == "error").then(|| {
        Method::new(
            "Error",
            Signature::new(Tuple::default(), Tuple::of([TypeShape::basic(BasicKind::String)])),
        )
    })
}

fn push_unique(methods: &mut Vec<Method>, method: Method) {
    if !methods.iter().any(|m| m.name == method.name) {
        methods.push(method);
    }
}

fn collect_interface(
    universe: &Universe,
    iface: &InterfaceShape,
    owner: &str,
    methods: &mut Vec<Method>,
    visited: &mut HashSet<TypeIdentity>,
) -> Result<(), UniverseError> {
    for method in &iface.methods {
        push_unique(methods, method.clone());
    }
    for embedded in &iface.embedded {
        if let TypeShape::Named(id) = embedded {
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(method) = builtin_error(id) {
                push_unique(methods, method);
                continue;
            }
            if universe.get_type(id).is_none() {
                return Err(UniverseError::UnknownType {
                    identity: id.to_string(),
                    referrer: owner.to_string(),
                });
            }
        }
        if let Some(TypeShape::Interface(inner)) = universe.underlying(embedded) {
            let owner = embedded_identity(embedded).map_or_else(|| owner.to_string(), ToString::to_string);
            collect_interface(universe, inner, &owner, methods, visited)?;
        }
    }
    Ok(())
}

/// Name occurring at one depth of a method set search.
struct Candidate {
    name: String,
    paths: usize,
    method: Option<Method>,
}

fn add_candidate(candidates: &mut Vec<Candidate>, name: &str, paths: usize, method: Option<Method>) {
    match candidates.iter_mut().find(|c| c.name == name) {
        Some(existing) => existing.paths = (existing.paths + paths).min(2),
        None => candidates.push(Candidate {
            name: name.to_string(),
            paths,
            method,
        }),
    }
}

fn add_method(candidates: &mut Vec<Candidate>, paths: usize, method: Method) {
    let name = method.name.clone();
    add_candidate(candidates, &name, paths, Some(method));
}

fn collect_named<'a>(
    universe: &'a Universe,
    id: &'a TypeIdentity,
    pointer: bool,
    methods: &mut Vec<Method>,
) -> Result<(), UniverseError> {
    if let Some(method) = builtin_error(id) {
        methods.push(method);
        return Ok(());
    }

    let mut seen: HashSet<&TypeIdentity> = HashSet::new();
    let mut shadowed: HashSet<String> = HashSet::new();
    let mut level = vec![Embedding {
        id,
        pointer,
        paths: 1,
    }];

    while !level.is_empty() {
        let mut candidates = Vec::new();

        for embedding in &level {
            seen.insert(embedding.id);
            if let Some(method) = builtin_error(embedding.id) {
                add_method(&mut candidates, embedding.paths, method);
                continue;
            }
            let Some(decl) = universe.get_type(embedding.id) else {
                continue;
            };

            if let TypeShape::Interface(iface) = &decl.underlying {
                let mut inner = Vec::new();
                collect_interface(
                    universe,
                    iface,
                    &decl.identity.to_string(),
                    &mut inner,
                    &mut HashSet::new(),
                )?;
                for method in inner {
                    add_method(&mut candidates, embedding.paths, method);
                }
                continue;
            }

            for method in decl
                .methods
                .iter()
                .filter(|m| embedding.pointer || !m.pointer_receiver)
            {
                let promoted = Method::new(method.name.clone(), method.signature.clone());
                add_method(&mut candidates, embedding.paths, promoted);
            }
            if let TypeShape::Struct(s) = &decl.underlying {
                for field in &s.fields {
                    add_candidate(&mut candidates, &field.name, embedding.paths, None);
                }
            }
        }

        for candidate in candidates {
            if shadowed.insert(candidate.name) && candidate.paths == 1 {
                methods.extend(candidate.method);
            }
        }
        level = next_level(universe, &level, &seen);
    }

    Ok(())
}
