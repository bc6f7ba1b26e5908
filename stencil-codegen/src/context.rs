//! Template execution context.
//!
//! One context is bound per invocation. It exposes the invocation's
//! arguments and structural queries over the universe, and buffers the
//! references a template registers until the session commits them.

use crate::error::CodegenError;
use crate::invocation::Invocation;
use crate::session::ReferenceSet;
use crate::walker::collect_references;
use parking_lot::Mutex;
use serde_json::{Value, json};
use stencil_universe::display::{relative_to, type_name, type_string};
use stencil_universe::query;
use stencil_universe::{Field, Package, TypeDecl, TypeIdentity, TypeShape, Universe, UniverseError};

/// Per-invocation view handed to the template engine.
pub struct ExecutionContext<'a> {
    universe: &'a Universe,
    invocation: &'a Invocation,
    pending: Mutex<ReferenceSet>,
    failure: Mutex<Option<CodegenError>>,
}

impl<'a> ExecutionContext<'a> {
    /// Binds a context to one invocation.
    #[must_use]
    pub fn new(universe: &'a Universe, invocation: &'a Invocation) -> Self {
        Self {
            universe,
            invocation,
            pending: Mutex::new(ReferenceSet::new()),
            failure: Mutex::new(None),
        }
    }

    /// Returns the universe.
    #[must_use]
    pub fn universe(&self) -> &'a Universe {
        self.universe
    }

    /// Returns the bound invocation.
    #[must_use]
    pub fn invocation(&self) -> &'a Invocation {
        self.invocation
    }

    /// Returns the target type identity.
    #[must_use]
    pub fn target(&self) -> &'a TypeIdentity {
        &self.invocation.target
    }

    /// Returns the generator type identity.
    #[must_use]
    pub fn generator(&self) -> &'a TypeIdentity {
        &self.invocation.generator
    }

    /// Returns the target type's declaration.
    #[must_use]
    pub fn target_decl(&self) -> Option<&'a TypeDecl> {
        self.universe.get_type(&self.invocation.target)
    }

    /// Returns the package the target type belongs to.
    #[must_use]
    pub fn package(&self) -> Option<&'a Package> {
        self.universe.package(&self.invocation.target.package)
    }

    /// Returns an argument value, or the empty string if absent.
    #[must_use]
    pub fn arg(&self, name: &str) -> &'a str {
        self.invocation.args.get(name).unwrap_or("")
    }

    /// Returns true if the argument is present.
    #[must_use]
    pub fn has_arg(&self, name: &str) -> bool {
        self.invocation.args.contains(name)
    }

    /// Returns an argument that must be present.
    ///
    /// # Errors
    /// Returns `MissingRequiredArgument` if it is absent.
    pub fn require_arg(&self, name: &str) -> Result<&'a str, CodegenError> {
        self.invocation
            .args
            .get(name)
            .ok_or_else(|| CodegenError::MissingRequiredArgument {
                name: name.to_string(),
            })
    }

    /// Returns an argument value, or `fallback` if absent.
    #[must_use]
    pub fn default_arg<'f>(&self, name: &str, fallback: &'f str) -> &'f str
    where
        'a: 'f,
    {
        self.invocation.args.get(name).unwrap_or(fallback)
    }

    /// Registers an external reference. Returns the empty string so the call
    /// can be placed inline in a template.
    pub fn add_import(&self, reference: &str) -> &'static str {
        self.pending.lock().insert(reference);
        ""
    }

    /// Registers the package of every named type reachable from `shape`.
    ///
    /// # Errors
    /// Returns `UnsupportedTypeShape` for type parameters and unions.
    pub fn add_import_type(&self, shape: &TypeShape) -> Result<&'static str, CodegenError> {
        let mut pending = self.pending.lock();
        collect_references(shape, &mut |path: &str| {
            pending.insert(path);
        })?;
        Ok("")
    }

    /// Tests whether `shape` satisfies the named interface.
    ///
    /// `interface` is either `path.Name` or a bare `Name` resolved in the
    /// target's package.
    ///
    /// # Errors
    /// Returns `InterfaceNotFound` if the name, or an interface it embeds, does
    /// not resolve, or `NotAnInterface` if it resolves to a non-interface type.
    pub fn implements(&self, shape: &TypeShape, interface: &str) -> Result<bool, CodegenError> {
        let identity = if interface.contains('.') {
            TypeIdentity::parse_qualified(interface)
        } else {
            Some(TypeIdentity::new(
                self.invocation.target.package.clone(),
                interface,
            ))
        };

        let decl = identity
            .as_ref()
            .and_then(|id| self.universe.get_type(id))
            .ok_or_else(|| CodegenError::InterfaceNotFound {
                name: interface.to_string(),
            })?;

        match self.universe.underlying(&decl.underlying) {
            Some(TypeShape::Interface(iface)) => query::implements(self.universe, shape, iface)
                .map_err(|e| match e {
                    UniverseError::UnknownType { identity, .. } => {
                        CodegenError::InterfaceNotFound { name: identity }
                    }
                    other => other.into(),
                }),
            _ => Err(CodegenError::NotAnInterface {
                name: interface.to_string(),
            }),
        }
    }

    /// Renders the name a shape ultimately refers to, relative to the
    /// target's package.
    #[must_use]
    pub fn type_name(&self, shape: &TypeShape) -> String {
        type_name(shape, &relative_to(self.universe, &self.invocation.target.package))
    }

    /// Renders a shape in full, relative to the target's package.
    #[must_use]
    pub fn type_string(&self, shape: &TypeShape) -> String {
        type_string(shape, &relative_to(self.universe, &self.invocation.target.package))
    }

    /// Returns the direct fields of the struct behind `shape`.
    #[must_use]
    pub fn fields(&self, shape: &TypeShape) -> Vec<Field> {
        query::fields(self.universe, shape).to_vec()
    }

    /// Looks up a field directly or through embedded members.
    #[must_use]
    pub fn field(&self, shape: &TypeShape, name: &str) -> Option<Field> {
        query::lookup_field(self.universe, shape, name).cloned()
    }

    /// Returns a pointer to `shape`.
    #[must_use]
    pub fn pointer_to(&self, shape: &TypeShape) -> TypeShape {
        TypeShape::pointer(shape.clone())
    }

    /// Data exposed to templates as the root context.
    #[must_use]
    pub fn template_data(&self) -> Value {
        let target = &self.invocation.target;
        let package_name = self.universe.package_name(&target.package);
        json!({
            "target": TypeShape::Named(target.clone()),
            "target_name": target.name,
            "generator": TypeShape::Named(self.invocation.generator.clone()),
            "generator_name": self.invocation.generator.name,
            "package": {
                "path": target.package,
                "name": package_name,
            },
            "field_name": self.invocation.field,
            "args": self.invocation.args,
        })
    }

    /// Records a typed failure raised while the engine was running. Only the
    /// first failure is kept.
    pub fn fail(&self, error: CodegenError) {
        let mut slot = self.failure.lock();
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    /// Takes the recorded failure, if any.
    pub fn take_failure(&self) -> Option<CodegenError> {
        self.failure.lock().take()
    }

    /// Returns a snapshot of the buffered references.
    #[must_use]
    pub fn pending_references(&self) -> ReferenceSet {
        self.pending.lock().clone()
    }

    /// Consumes the context, returning the buffered references.
    #[must_use]
    pub fn into_references(self) -> ReferenceSet {
        self.pending.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::ArgumentMap;
    use stencil_universe::parse_universe;

    const UNIVERSE: &str = r#"<universe>
    <package path="fmt" name="fmt">
        <file path="/go/fmt/print.go"/>
        <type name="Stringer">
            <interface>
                <method name="String"><signature><results><param><basic name="string"/></param></results></signature></method>
            </interface>
        </type>
    </package>
    <package path="example.com/app" name="app">
        <file path="/src/app/models.go"/>
        <type name="Base" line="3">
            <struct>
                <field name="ID"><basic name="int"/></field>
                <field name="secret"><basic name="string"/></field>
            </struct>
            <method name="String"><signature><results><param><basic name="string"/></param></results></signature></method>
        </type>
        <type name="Order" line="9">
            <struct>
                <field name="Base" embedded="true"><named package="example.com/app" name="Base"/></field>
                <field name="Items"><slice><named package="example.com/app" name="Base"/></slice></field>
            </struct>
        </type>
        <type name="Gen" line="14"><struct/></type>
        <type name="Local">
            <interface>
                <method name="Close"><signature/></method>
            </interface>
        </type>
        <type name="Failer">
            <interface>
                <embed><named name="error"/></embed>
            </interface>
        </type>
        <type name="Reader">
            <interface>
                <embed><named package="io" name="Reader"/></embed>
            </interface>
        </type>
    </package>
</universe>"#;

    fn invocation(args: &str) -> Invocation {
        Invocation::new(
            TypeIdentity::new("example.com/app", "Gen"),
            TypeIdentity::new("example.com/app", "Order"),
            ArgumentMap::parse(args).unwrap(),
            "gen",
        )
    }

    #[test]
    fn test_argument_accessors() {
        let universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let inv = invocation("name=orders,flag");
        let ctx = ExecutionContext::new(&universe, &inv);

        assert_eq!(ctx.arg("name"), "orders");
        assert_eq!(ctx.arg("missing"), "");
        assert!(ctx.has_arg("flag"));
        assert!(!ctx.has_arg("missing"));
        assert_eq!(ctx.require_arg("name").unwrap(), "orders");
        assert!(matches!(
            ctx.require_arg("missing"),
            Err(CodegenError::MissingRequiredArgument { .. })
        ));
        assert_eq!(ctx.default_arg("missing", "fallback"), "fallback");
        assert_eq!(ctx.default_arg("name", "fallback"), "orders");
    }

    #[test]
    fn test_add_import_is_idempotent() {
        let universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let inv = invocation("");
        let ctx = ExecutionContext::new(&universe, &inv);

        assert_eq!(ctx.add_import("strings"), "");
        assert_eq!(ctx.add_import("strings"), "");
        assert_eq!(ctx.add_import("sort"), "");
        let refs = ctx.into_references();
        assert_eq!(refs.iter().collect::<Vec<_>>(), vec!["strings", "sort"]);
    }

    #[test]
    fn test_field_through_embedding() {
        let universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let inv = invocation("");
        let ctx = ExecutionContext::new(&universe, &inv);
        let order = TypeShape::named("example.com/app", "Order");

        let id = ctx.field(&order, "ID").expect("promoted field");
        assert_eq!(id.name, "ID");
        assert!(ctx.field(&order, "secret").is_none());
        assert_eq!(ctx.fields(&order).len(), 2);
        assert_eq!(ctx.fields(&ctx.pointer_to(&order)).len(), 2);
    }

    #[test]
    fn test_type_rendering_is_relative() {
        let universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let inv = invocation("");
        let ctx = ExecutionContext::new(&universe, &inv);

        let items = TypeShape::slice(TypeShape::pointer(TypeShape::named("example.com/app", "Base")));
        assert_eq!(ctx.type_string(&items), "[]*Base");
        assert_eq!(ctx.type_name(&items), "Base");
        let stringer = TypeShape::named("fmt", "Stringer");
        assert_eq!(ctx.type_string(&ctx.pointer_to(&stringer)), "*fmt.Stringer");
    }

    #[test]
    fn test_implements() {
        let universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let inv = invocation("");
        let ctx = ExecutionContext::new(&universe, &inv);
        let base = TypeShape::named("example.com/app", "Base");
        let order = TypeShape::named("example.com/app", "Order");

        assert!(ctx.implements(&base, "fmt.Stringer").unwrap());
        assert!(ctx.implements(&order, "fmt.Stringer").unwrap());
        assert!(!ctx.implements(&base, "Local").unwrap());
        assert!(matches!(
            ctx.implements(&base, "Missing"),
            Err(CodegenError::InterfaceNotFound { .. })
        ));
        assert!(matches!(
            ctx.implements(&base, "Order"),
            Err(CodegenError::NotAnInterface { .. })
        ));
    }

    #[test]
    fn test_implements_through_embedded_interfaces() {
        let universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let inv = invocation("");
        let ctx = ExecutionContext::new(&universe, &inv);
        let base = TypeShape::named("example.com/app", "Base");

        assert!(!ctx.implements(&base, "Failer").unwrap());
        assert!(ctx.implements(&TypeShape::named("", "error"), "Failer").unwrap());
        assert!(matches!(
            ctx.implements(&base, "Reader"),
            Err(CodegenError::InterfaceNotFound { name }) if name == "io.Reader"
        ));
    }

    #[test]
    fn test_failure_slot_keeps_first() {
        let universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let inv = invocation("");
        let ctx = ExecutionContext::new(&universe, &inv);

        ctx.fail(CodegenError::MissingRequiredArgument {
            name: "first".to_string(),
        });
        ctx.fail(CodegenError::execution("second"));
        assert!(matches!(
            ctx.take_failure(),
            Some(CodegenError::MissingRequiredArgument { name }) if name == "first"
        ));
        assert!(ctx.take_failure().is_none());
    }

    #[test]
    fn test_template_data() {
        let universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let inv = invocation("k=v");
        let ctx = ExecutionContext::new(&universe, &inv);

        let data = ctx.template_data();
        assert_eq!(data["target_name"], "Order");
        assert_eq!(data["target"]["kind"], "named");
        assert_eq!(data["package"]["name"], "app");
        assert_eq!(data["args"]["k"], "v");
    }
}
