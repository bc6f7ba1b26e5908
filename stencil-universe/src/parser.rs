//! Universe interchange parser.
//!
//! A front end describes its resolved packages in a small XML document:
//!
//! ```xml
//! <universe>
//!   <package path="example.com/app" name="app" dir="/src/app">
//!     <file path="/src/app/main.go"/>
//!     <type name="StringStack" file="/src/app/main.go" line="12">
//!       <struct>
//!         <field name="stackGen" embedded="true" tag='codegen:"type=string"'>
//!           <named package="example.com/app" name="stackGen"/>
//!         </field>
//!       </struct>
//!     </type>
//!   </package>
//! </universe>
//! ```
//!
//! The document is read into a lightweight element tree first, then converted
//! into a [`Universe`].

use crate::error::ParseError;
use crate::types::{
    BasicKind, ChanDir, Field, InterfaceShape, Method, Signature, StructShape, Tuple,
    TypeIdentity, TypeShape, Var,
};
use crate::universe::{MethodDecl, Package, Position, TypeDecl, Universe};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::{Path, PathBuf};

/// Parses a universe document from a string.
///
/// # Arguments
/// * `xml` - Universe document content
///
/// # Returns
/// The loaded universe, not yet validated.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or describes an invalid
/// universe structure.
pub fn parse_universe(xml: &str) -> Result<Universe, ParseError> {
    let root = read_tree(xml)?;
    if root.name != "universe" {
        return Err(ParseError::structure(format!(
            "expected <universe> root element, found <{}>",
            root.name
        )));
    }

    let mut universe = Universe::new();
    for child in &root.children {
        match child.name.as_str() {
            "package" => parse_package(child, &mut universe)?,
            other => return Err(ParseError::unknown_element(other, "universe")),
        }
    }
    Ok(universe)
}

/// Reads and parses a universe document from a file.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or parsed.
pub fn load_universe(path: &Path) -> Result<Universe, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_universe(&xml)
}

/// Generic element node.
#[derive(Debug)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required(&self, key: &str) -> Result<&str, ParseError> {
        self.attr(key)
            .ok_or_else(|| ParseError::missing_attr(&self.name, key))
    }

    fn flag(&self, key: &str) -> Result<bool, ParseError> {
        match self.attr(key) {
            None | Some("false") | Some("0") => Ok(false),
            Some("true") | Some("1") => Ok(true),
            Some(other) => Err(ParseError::invalid_attr(&self.name, key, other)),
        }
    }

    fn single_child(&self) -> Result<&Element, ParseError> {
        match self.children.as_slice() {
            [only] => Ok(only),
            _ => Err(ParseError::structure(format!(
                "element '{}' expects exactly one type, found {}",
                self.name,
                self.children.len()
            ))),
        }
    }
}

/// Reads the whole document into an element tree.
fn read_tree(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(element_from(e)?),
            Ok(Event::Empty(ref e)) => {
                let element = element_from(e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::structure("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::structure(format!(
            "unclosed element '{}'",
            open.name
        )));
    }
    root.ok_or_else(|| ParseError::structure("no root element found"))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(ParseError::structure("multiple root elements"));
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn element_from(e: &BytesStart<'_>) -> Result<Element, ParseError> {
    let name_bytes = e.name().as_ref().to_vec();
    let name = std::str::from_utf8(&name_bytes)?.to_string();

    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|_| ParseError::invalid_attr(&name, &key, raw))?
            .into_owned();
        attrs.push((key, value));
    }

    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

/// Parses a package element and its declarations.
fn parse_package(el: &Element, universe: &mut Universe) -> Result<(), ParseError> {
    let path = el.required("path")?.to_string();
    let name = el.required("name")?.to_string();
    let dir = el.attr("dir").map(PathBuf::from).unwrap_or_default();

    let mut package = Package::new(path.clone(), name, dir);
    let mut decls = Vec::new();

    for child in &el.children {
        match child.name.as_str() {
            "file" => package.add_file(child.required("path")?),
            "type" => decls.push(child),
            other => return Err(ParseError::unknown_element(other, "package")),
        }
    }

    let default_file = package.files.first().cloned();
    universe.add_package(package)?;

    for decl in decls {
        let parsed = parse_type_decl(decl, &path, default_file.as_deref())?;
        universe.add_type(parsed)?;
    }
    Ok(())
}

/// Parses a named type declaration.
fn parse_type_decl(
    el: &Element,
    package: &str,
    default_file: Option<&Path>,
) -> Result<TypeDecl, ParseError> {
    let name = el.required("name")?;
    let file = match (el.attr("file"), default_file) {
        (Some(file), _) => PathBuf::from(file),
        (None, Some(file)) => file.to_path_buf(),
        (None, None) => return Err(ParseError::missing_attr("type", "file")),
    };
    let line = match el.attr("line") {
        Some(value) => value
            .parse()
            .map_err(|_| ParseError::invalid_attr("type", "line", value))?,
        None => 0,
    };

    let mut underlying = None;
    let mut methods = Vec::new();

    for child in &el.children {
        if child.name == "method" {
            methods.push(MethodDecl {
                name: child.required("name")?.to_string(),
                signature: parse_signature(child.single_child()?)?,
                pointer_receiver: child.flag("pointer")?,
            });
        } else if underlying.is_none() {
            underlying = Some(parse_shape(child)?);
        } else {
            return Err(ParseError::structure(format!(
                "type '{name}' declares more than one underlying type"
            )));
        }
    }

    let underlying = underlying.ok_or_else(|| {
        ParseError::structure(format!("type '{name}' has no underlying type"))
    })?;

    let mut decl = TypeDecl::new(
        TypeIdentity::new(package, name),
        Position::new(file, line),
        underlying,
    );
    decl.methods = methods;
    Ok(decl)
}

/// Parses a type shape element.
fn parse_shape(el: &Element) -> Result<TypeShape, ParseError> {
    match el.name.as_str() {
        "basic" => {
            let name = el.required("name")?;
            let basic = BasicKind::from_name(name)
                .ok_or_else(|| ParseError::invalid_attr("basic", "name", name))?;
            Ok(TypeShape::basic(basic))
        }
        "named" => Ok(TypeShape::named(
            el.attr("package").unwrap_or_default(),
            el.required("name")?,
        )),
        "pointer" => Ok(TypeShape::pointer(parse_shape(el.single_child()?)?)),
        "slice" => Ok(TypeShape::slice(parse_shape(el.single_child()?)?)),
        "array" => {
            let len = el.required("len")?;
            let len = len
                .parse()
                .map_err(|_| ParseError::invalid_attr("array", "len", len))?;
            Ok(TypeShape::array(len, parse_shape(el.single_child()?)?))
        }
        "chan" => {
            let dir = el.attr("dir").unwrap_or_default();
            let dir = ChanDir::parse(dir)
                .ok_or_else(|| ParseError::invalid_attr("chan", "dir", dir))?;
            Ok(TypeShape::Chan {
                dir,
                elem: Box::new(parse_shape(el.single_child()?)?),
            })
        }
        "map" => match el.children.as_slice() {
            [key, value] => Ok(TypeShape::map(parse_shape(key)?, parse_shape(value)?)),
            _ => Err(ParseError::structure(format!(
                "map expects a key and a value type, found {} children",
                el.children.len()
            ))),
        },
        "struct" => {
            let fields = el
                .children
                .iter()
                .map(parse_field)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeShape::Struct(StructShape::new(fields)))
        }
        "interface" => parse_interface(el).map(TypeShape::Interface),
        "signature" => parse_signature(el).map(TypeShape::Signature),
        "tuple" => parse_tuple(el).map(TypeShape::Tuple),
        "typeparam" => Ok(TypeShape::TypeParam {
            name: el.required("name")?.to_string(),
        }),
        "union" => {
            let terms = el
                .children
                .iter()
                .map(parse_shape)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeShape::Union { terms })
        }
        other => Err(ParseError::unknown_element(other, "type")),
    }
}

/// Parses a struct field. Embedded fields default their name to the embedded
/// type's name.
fn parse_field(el: &Element) -> Result<Field, ParseError> {
    if el.name != "field" {
        return Err(ParseError::unknown_element(&el.name, "struct"));
    }
    let ty = parse_shape(el.single_child()?)?;
    let embedded = el.flag("embedded")?;
    let name = match (el.attr("name"), embedded) {
        (Some(name), _) => name.to_string(),
        (None, true) => embedded_name(&ty).ok_or_else(|| ParseError::missing_attr("field", "name"))?,
        (None, false) => return Err(ParseError::missing_attr("field", "name")),
    };

    Ok(Field {
        name,
        ty,
        embedded,
        tag: el.attr("tag").unwrap_or_default().to_string(),
    })
}

fn embedded_name(ty: &TypeShape) -> Option<String> {
    match ty {
        TypeShape::Named(id) => Some(id.name.clone()),
        TypeShape::Pointer { elem } => elem.as_named().map(|id| id.name.clone()),
        _ => None,
    }
}

fn parse_interface(el: &Element) -> Result<InterfaceShape, ParseError> {
    let mut iface = InterfaceShape::default();
    for child in &el.children {
        match child.name.as_str() {
            "embed" => iface.embedded.push(parse_shape(child.single_child()?)?),
            "method" => iface.methods.push(Method::new(
                child.required("name")?,
                parse_signature(child.single_child()?)?,
            )),
            other => return Err(ParseError::unknown_element(other, "interface")),
        }
    }
    Ok(iface)
}

fn parse_signature(el: &Element) -> Result<Signature, ParseError> {
    if el.name != "signature" {
        return Err(ParseError::unknown_element(&el.name, "method"));
    }
    let mut sig = Signature {
        variadic: el.flag("variadic")?,
        ..Signature::default()
    };
    for child in &el.children {
        match child.name.as_str() {
            "params" => sig.params = parse_tuple(child)?,
            "results" => sig.results = parse_tuple(child)?,
            other => return Err(ParseError::unknown_element(other, "signature")),
        }
    }
    Ok(sig)
}

fn parse_tuple(el: &Element) -> Result<Tuple, ParseError> {
    let vars = el
        .children
        .iter()
        .map(|child| {
            if child.name != "param" {
                return Err(ParseError::unknown_element(&child.name, &el.name));
            }
            Ok(Var {
                name: child.attr("name").map(str::to_string),
                ty: parse_shape(child.single_child()?)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Tuple { vars })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_UNIVERSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<universe>
    <package path="example.com/app" name="app" dir="/src/app">
        <file path="/src/app/main.go"/>
        <type name="stackGen" line="4">
            <struct/>
        </type>
        <type name="StringStack" file="/src/app/main.go" line="12">
            <struct>
                <field embedded="true" tag='codegen:"type=string"'>
                    <named package="example.com/app" name="stackGen"/>
                </field>
                <field name="data">
                    <slice><basic name="string"/></slice>
                </field>
                <field name="index">
                    <map><basic name="string"/><pointer><named package="example.com/models" name="User"/></pointer></map>
                </field>
            </struct>
            <method name="Push" pointer="true">
                <signature>
                    <params><param name="v"><basic name="string"/></param></params>
                </signature>
            </method>
        </type>
        <type name="Writer" line="30">
            <interface>
                <method name="Write">
                    <signature>
                        <params><param name="p"><slice><basic name="byte"/></slice></param></params>
                        <results><param name="n"><basic name="int"/></param><param name="err"><named name="error"/></param></results>
                    </signature>
                </method>
            </interface>
        </type>
    </package>
</universe>"#;

    #[test]
    fn test_parse_simple_universe() {
        let universe = parse_universe(SIMPLE_UNIVERSE).expect("Failed to parse universe");

        assert_eq!(universe.packages.len(), 1);
        let pkg = universe.package("example.com/app").unwrap();
        assert_eq!(pkg.name, "app");
        assert_eq!(pkg.files, vec![PathBuf::from("/src/app/main.go")]);
        assert_eq!(universe.types.len(), 3);
    }

    #[test]
    fn test_parse_struct_fields() {
        let universe = parse_universe(SIMPLE_UNIVERSE).expect("Failed to parse universe");
        let decl = universe
            .get_type(&TypeIdentity::new("example.com/app", "StringStack"))
            .unwrap();
        let s = decl.as_struct().unwrap();

        assert_eq!(s.fields.len(), 3);
        assert_eq!(s.fields[0].name, "stackGen");
        assert!(s.fields[0].embedded);
        assert_eq!(s.fields[0].tag, "codegen:\"type=string\"");
        assert_eq!(
            s.fields[2].ty,
            TypeShape::map(
                TypeShape::basic(BasicKind::String),
                TypeShape::pointer(TypeShape::named("example.com/models", "User")),
            )
        );
        assert_eq!(decl.position.line, 12);
        assert_eq!(decl.methods.len(), 1);
        assert!(decl.methods[0].pointer_receiver);
    }

    #[test]
    fn test_type_file_defaults_to_first_package_file() {
        let universe = parse_universe(SIMPLE_UNIVERSE).expect("Failed to parse universe");
        let decl = universe
            .get_type(&TypeIdentity::new("example.com/app", "stackGen"))
            .unwrap();
        assert_eq!(decl.position.file, PathBuf::from("/src/app/main.go"));
    }

    #[test]
    fn test_parse_interface_signature() {
        let universe = parse_universe(SIMPLE_UNIVERSE).expect("Failed to parse universe");
        let decl = universe
            .get_type(&TypeIdentity::new("example.com/app", "Writer"))
            .unwrap();
        let TypeShape::Interface(iface) = &decl.underlying else {
            panic!("expected interface");
        };
        let sig = &iface.methods[0].signature;
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.results.vars[1].ty, TypeShape::named("", "error"));
    }

    #[test]
    fn test_escaped_tag_attribute() {
        let xml = r#"<universe>
    <package path="p" name="p">
        <file path="/p/a.go"/>
        <type name="T"><struct><field name="G" tag="codegen:&quot;a=1&quot;"><named package="p" name="T"/></field></struct></type>
    </package>
</universe>"#;
        let universe = parse_universe(xml).unwrap();
        let decl = universe.get_type(&TypeIdentity::new("p", "T")).unwrap();
        assert_eq!(decl.as_struct().unwrap().fields[0].tag, "codegen:\"a=1\"");
    }

    #[test]
    fn test_unknown_shape_element() {
        let xml = r#"<universe>
    <package path="p" name="p">
        <file path="/p/a.go"/>
        <type name="T"><record/></type>
    </package>
</universe>"#;
        let err = parse_universe(xml).unwrap_err();
        assert!(matches!(err, ParseError::UnknownElement { .. }));
    }

    #[test]
    fn test_missing_package_path() {
        let xml = r#"<universe><package name="p"/></universe>"#;
        let err = parse_universe(xml).unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute { .. }));
    }

    #[test]
    fn test_wrong_root() {
        let err = parse_universe("<schema/>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStructure { .. }));
    }

    #[test]
    fn test_duplicate_type() {
        let xml = r#"<universe>
    <package path="p" name="p">
        <file path="/p/a.go"/>
        <type name="T"><basic name="int"/></type>
        <type name="T"><basic name="string"/></type>
    </package>
</universe>"#;
        let err = parse_universe(xml).unwrap_err();
        assert!(matches!(err, ParseError::Universe(_)));
    }
}
