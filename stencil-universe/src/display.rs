//! Source-style rendering of type shapes.

use crate::types::{ChanDir, Signature, Tuple, TypeShape};
use crate::universe::Universe;

/// Renders a shape in source form.
///
/// `qualifier` maps a package path to the prefix used for named types from
/// that package; `None` (or an empty prefix) renders the bare name.
#[must_use]
pub fn type_string(shape: &TypeShape, qualifier: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::new();
    write_type(&mut out, shape, qualifier);
    out
}

/// Renders the name of the type a shape ultimately refers to, looking through
/// pointer, slice, array, channel, and map wrappers.
#[must_use]
pub fn type_name(shape: &TypeShape, qualifier: &dyn Fn(&str) -> Option<String>) -> String {
    let mut current = shape;
    while let Some(elem) = current.elem() {
        current = elem;
    }
    type_string(current, qualifier)
}

/// Qualifier that elides `package` and names every other package by its short
/// name.
pub fn relative_to<'a>(universe: &'a Universe, package: &'a str) -> impl Fn(&str) -> Option<String> + 'a {
    move |path: &str| {
        if path == package {
            None
        } else {
            Some(universe.package_name(path).to_string())
        }
    }
}

fn write_type(out: &mut String, shape: &TypeShape, q: &dyn Fn(&str) -> Option<String>) {
    match shape {
        TypeShape::Basic { basic } => out.push_str(basic.name()),
        TypeShape::Named(id) => {
            if !id.is_builtin() {
                if let Some(prefix) = q(&id.package).filter(|p| !p.is_empty()) {
                    out.push_str(&prefix);
                    out.push('.');
                }
            }
            out.push_str(&id.name);
        }
        TypeShape::Pointer { elem } => {
            out.push('*');
            write_type(out, elem, q);
        }
        TypeShape::Slice { elem } => {
            out.push_str("[]");
            write_type(out, elem, q);
        }
        TypeShape::Array { len, elem } => {
            out.push_str(&format!("[{len}]"));
            write_type(out, elem, q);
        }
        TypeShape::Chan { dir, elem } => {
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            write_type(out, elem, q);
        }
        TypeShape::Map { key, value } => {
            out.push_str("map[");
            write_type(out, key, q);
            out.push(']');
            write_type(out, value, q);
        }
        TypeShape::Struct(s) => {
            out.push_str("struct{");
            for (i, field) in s.fields.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                if !field.embedded {
                    out.push_str(&field.name);
                    out.push(' ');
                }
                write_type(out, &field.ty, q);
                if !field.tag.is_empty() {
                    out.push_str(&format!(" {:?}", field.tag));
                }
            }
            out.push('}');
        }
        TypeShape::Interface(iface) => {
            out.push_str("interface{");
            let mut first = true;
            for method in &iface.methods {
                if !first {
                    out.push_str("; ");
                }
                first = false;
                out.push_str(&method.name);
                write_signature(out, &method.signature, q);
            }
            for embedded in &iface.embedded {
                if !first {
                    out.push_str("; ");
                }
                first = false;
                write_type(out, embedded, q);
            }
            out.push('}');
        }
        TypeShape::Signature(sig) => {
            out.push_str("func");
            write_signature(out, sig, q);
        }
        TypeShape::Tuple(tuple) => write_tuple(out, tuple, false, q),
        TypeShape::TypeParam { name } => out.push_str(name),
        TypeShape::Union { terms } => {
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_type(out, term, q);
            }
        }
    }
}

fn write_signature(out: &mut String, sig: &Signature, q: &dyn Fn(&str) -> Option<String>) {
    write_tuple(out, &sig.params, sig.variadic, q);
    match sig.results.vars.as_slice() {
        [] => {}
        [only] if only.name.is_none() => {
            out.push(' ');
            write_type(out, &only.ty, q);
        }
        _ => {
            out.push(' ');
            write_tuple(out, &sig.results, false, q);
        }
    }
}

fn write_tuple(out: &mut String, tuple: &Tuple, variadic: bool, q: &dyn Fn(&str) -> Option<String>) {
    out.push('(');
    let last = tuple.vars.len().saturating_sub(1);
    for (i, var) in tuple.vars.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if let Some(name) = &var.name {
            out.push_str(name);
            out.push(' ');
        }
        match (&var.ty, variadic && i == last) {
            (TypeShape::Slice { elem }, true) => {
                out.push_str("...");
                write_type(out, elem, q);
            }
            (ty, _) => write_type(out, ty, q),
        }
    }
    out.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BasicKind, Field, InterfaceShape, Method, StructShape, Var};
    use crate::universe::Package;

    fn universe() -> Universe {
        let mut universe = Universe::new();
        universe
            .add_package(Package::new("example.com/app", "app", "/src/app"))
            .unwrap();
        universe
            .add_package(Package::new("example.com/models/v2", "models", "/src/models"))
            .unwrap();
        universe
    }

    #[test]
    fn test_same_package_is_unqualified() {
        let universe = universe();
        let q = relative_to(&universe, "example.com/app");
        let shape = TypeShape::map(
            TypeShape::named("example.com/app", "Key"),
            TypeShape::pointer(TypeShape::named("example.com/models/v2", "User")),
        );
        assert_eq!(type_string(&shape, &q), "map[Key]*models.User");
    }

    #[test]
    fn test_type_name_unwraps_elements() {
        let universe = universe();
        let q = relative_to(&universe, "example.com/app");
        let shape = TypeShape::slice(TypeShape::pointer(TypeShape::named(
            "example.com/models/v2",
            "User",
        )));
        assert_eq!(type_name(&shape, &q), "models.User");
        assert_eq!(type_name(&TypeShape::named("", "error"), &q), "error");
    }

    #[test]
    fn test_signature_rendering() {
        let sig = Signature {
            params: Tuple {
                vars: vec![
                    Var {
                        name: Some("format".to_string()),
                        ty: TypeShape::basic(BasicKind::String),
                    },
                    Var {
                        name: Some("args".to_string()),
                        ty: TypeShape::slice(TypeShape::Interface(InterfaceShape::default())),
                    },
                ],
            },
            results: Tuple::of([
                TypeShape::basic(BasicKind::Int),
                TypeShape::named("", "error"),
            ]),
            variadic: true,
        };
        let q = |_: &str| -> Option<String> { None };
        assert_eq!(
            type_string(&TypeShape::Signature(sig), &q),
            "func(format string, args ...interface{}) (int, error)"
        );
    }

    #[test]
    fn test_struct_and_interface_literals() {
        let q = |_: &str| -> Option<String> { None };
        let shape = TypeShape::Struct(StructShape::new(vec![
            Field::new("Base", TypeShape::named("p", "Base")).embedded(),
            Field::new("id", TypeShape::basic(BasicKind::Int)).with_tag("json:\"id\""),
        ]));
        assert_eq!(type_string(&shape, &q), "struct{Base; id int \"json:\\\"id\\\"\"}");

        let iface = TypeShape::Interface(InterfaceShape {
            embedded: vec![TypeShape::named("p", "Reader")],
            methods: vec![Method::new(
                "Close",
                Signature::new(Tuple::default(), Tuple::of([TypeShape::named("", "error")])),
            )],
        });
        assert_eq!(type_string(&iface, &q), "interface{Close() error; Reader}");
    }

    #[test]
    fn test_channel_directions() {
        let q = |_: &str| -> Option<String> { None };
        let recv = TypeShape::Chan {
            dir: ChanDir::Recv,
            elem: Box::new(TypeShape::basic(BasicKind::Int)),
        };
        assert_eq!(type_string(&recv, &q), "<-chan int");
        assert_eq!(
            type_string(&TypeShape::array(4, TypeShape::basic(BasicKind::Uint8)), &q),
            "[4]uint8"
        );
    }
}
