//! Handlebars template engine.
//!
//! Context capabilities are exposed as helpers. Helpers that take a type
//! accept any shape value from the template data (`target`, `generator`, a
//! field's `type`, or the result of another helper):
//!
//! ```text
//! {{add_import "strings"}}
//! func (x {{type_string (pointer_to target)}}) Sort{{arg "name"}}() {
//! {{#each (fields target)}}    // {{name}} {{type_string type}}
//! {{/each}}}
//! ```

use crate::context::ExecutionContext;
use crate::engine::{EngineError, TemplateEngine};
use crate::error::CodegenError;
use ::handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, RenderErrorReason,
    ScopedJson, Template,
};
use serde::Serialize;
use serde_json::Value as Json;
use stencil_universe::TypeShape;
use stencil_universe::types::is_exported;

const TEMPLATE_NAME: &str = "generator";

/// Capabilities registered as helpers, by helper name.
const CAPABILITIES: [(&str, Capability); 14] = [
    ("arg", Capability::Arg),
    ("has_arg", Capability::HasArg),
    ("require_arg", Capability::RequireArg),
    ("default_arg", Capability::DefaultArg),
    ("add_import", Capability::AddImport),
    ("add_import_type", Capability::AddImportType),
    ("implements", Capability::Implements),
    ("type_name", Capability::TypeName),
    ("type_string", Capability::TypeString),
    ("fields", Capability::Fields),
    ("field", Capability::Field),
    ("pointer_to", Capability::PointerTo),
    ("is_exported", Capability::IsExported),
    ("concat", Capability::Concat),
];

#[derive(Debug, Clone, Copy)]
enum Capability {
    Arg,
    HasArg,
    RequireArg,
    DefaultArg,
    AddImport,
    AddImportType,
    Implements,
    TypeName,
    TypeString,
    Fields,
    Field,
    PointerTo,
    IsExported,
    Concat,
}

/// Handlebars-backed engine. Output is not HTML escaped and templates run in
/// strict mode, so references to missing data fail the invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsEngine;

impl HandlebarsEngine {
    /// Creates a new engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TemplateEngine for HandlebarsEngine {
    type Template = Template;

    fn parse(&self, name: &str, source: &str) -> Result<Template, EngineError> {
        Template::compile(source).map_err(|e| EngineError::new(format!("{name}: {e}")))
    }

    fn execute(
        &self,
        template: &Template,
        context: &ExecutionContext<'_>,
    ) -> Result<String, CodegenError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(::handlebars::no_escape);
        for (name, capability) in CAPABILITIES {
            registry.register_helper(
                name,
                Box::new(ContextHelper {
                    context,
                    capability,
                }),
            );
        }
        registry.register_template(TEMPLATE_NAME, template.clone());

        registry
            .render(TEMPLATE_NAME, &context.template_data())
            .map_err(|e| {
                context
                    .take_failure()
                    .unwrap_or_else(|| CodegenError::execution(e.to_string()))
            })
    }
}

struct ContextHelper<'c, 'u> {
    context: &'c ExecutionContext<'u>,
    capability: Capability,
}

impl HelperDef for ContextHelper<'_, '_> {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        match self.evaluate(h) {
            Ok(value) => Ok(ScopedJson::Derived(value)),
            Err(e) => {
                let message = format!("helper '{}': {e}", h.name());
                self.context.fail(e);
                Err(RenderErrorReason::Other(message).into())
            }
        }
    }
}

impl ContextHelper<'_, '_> {
    fn evaluate(&self, h: &Helper<'_>) -> Result<Json, CodegenError> {
        let ctx = self.context;
        let value = match self.capability {
            Capability::Arg => Json::from(ctx.arg(str_param(h, 0)?)),
            Capability::HasArg => Json::Bool(ctx.has_arg(str_param(h, 0)?)),
            Capability::RequireArg => Json::from(ctx.require_arg(str_param(h, 0)?)?),
            Capability::DefaultArg => {
                Json::from(ctx.default_arg(str_param(h, 0)?, str_param(h, 1)?))
            }
            Capability::AddImport => Json::from(ctx.add_import(str_param(h, 0)?)),
            Capability::AddImportType => Json::from(ctx.add_import_type(&shape_param(h, 0)?)?),
            Capability::Implements => {
                Json::Bool(ctx.implements(&shape_param(h, 0)?, str_param(h, 1)?)?)
            }
            Capability::TypeName => Json::from(ctx.type_name(&shape_param(h, 0)?)),
            Capability::TypeString => Json::from(ctx.type_string(&shape_param(h, 0)?)),
            Capability::Fields => to_json(&ctx.fields(&shape_param(h, 0)?))?,
            Capability::Field => match ctx.field(&shape_param(h, 0)?, str_param(h, 1)?) {
                Some(field) => to_json(&field)?,
                None => Json::Null,
            },
            Capability::PointerTo => to_json(&ctx.pointer_to(&shape_param(h, 0)?))?,
            Capability::IsExported => Json::Bool(is_exported(str_param(h, 0)?)),
            Capability::Concat => Json::from(
                h.params()
                    .iter()
                    .map(|p| plain_text(p.value()))
                    .collect::<String>(),
            ),
        };
        Ok(value)
    }
}

fn str_param<'h>(h: &'h Helper<'_>, idx: usize) -> Result<&'h str, CodegenError> {
    h.param(idx)
        .and_then(|p| p.value().as_str())
        .ok_or_else(|| CodegenError::execution(format!("expects a string as parameter {}", idx + 1)))
}

fn shape_param(h: &Helper<'_>, idx: usize) -> Result<TypeShape, CodegenError> {
    let value = h
        .param(idx)
        .map(|p| p.value().clone())
        .ok_or_else(|| CodegenError::execution(format!("expects a type as parameter {}", idx + 1)))?;
    serde_json::from_value(value).map_err(|e| {
        CodegenError::execution(format!("parameter {} is not a type: {e}", idx + 1))
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<Json, CodegenError> {
    serde_json::to_value(value).map_err(|e| CodegenError::execution(e.to_string()))
}

fn plain_text(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::ArgumentMap;
    use crate::invocation::Invocation;
    use stencil_universe::{TypeIdentity, Universe, parse_universe};

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
        <type name="Base">
            <struct>
                <field name="ID"><basic name="int"/></field>
            </struct>
            <method name="String" pointer="true"><signature><results><param><basic name="string"/></param></results></signature></method>
        </type>
        <type name="Order">
            <struct>
                <field name="Base" embedded="true"><named package="example.com/app" name="Base"/></field>
                <field name="Items"><slice><named package="example.com/app" name="Base"/></slice></field>
                <field name="When"><named package="time" name="Time"/></field>
                <field name="count"><basic name="int"/></field>
            </struct>
        </type>
        <type name="Gen"><struct/></type>
    </package>
</universe>"#;

    fn render(source: &str, args: &str) -> Result<(String, Vec<String>), CodegenError> {
        let universe: Universe = parse_universe(UNIVERSE).expect("Failed to parse");
        let invocation = Invocation::new(
            TypeIdentity::new("example.com/app", "Gen"),
            TypeIdentity::new("example.com/app", "Order"),
            ArgumentMap::parse(args).unwrap(),
            "gen",
        );
        let engine = HandlebarsEngine::new();
        let template = engine.parse("test", source).expect("Failed to compile");
        let context = ExecutionContext::new(&universe, &invocation);
        let out = engine.execute(&template, &context)?;
        Ok((out, context.into_references().into_vec()))
    }

    #[test]
    fn test_argument_helpers() {
        let (out, _) = render(
            r#"{{arg "name"}}|{{arg "none"}}|{{has_arg "flag"}}|{{default_arg "sep" ","}}|{{require_arg "name"}}"#,
            "name=orders,flag",
        )
        .unwrap();
        assert_eq!(out, "orders||true|,|orders");
    }

    #[test]
    fn test_no_html_escaping() {
        let (out, _) = render(r#"{{arg "op"}}"#, "op=<&>").unwrap();
        assert_eq!(out, "<&>");
    }

    #[test]
    fn test_type_helpers() {
        let (out, _) = render(
            r#"{{type_string (pointer_to target)}} {{#each (fields target)}}{{name}}:{{type_string type}};{{/each}}"#,
            "",
        )
        .unwrap();
        assert_eq!(out, "*Order Base:Base;Items:[]Base;When:time.Time;count:int;");
    }

    #[test]
    fn test_field_and_type_name() {
        let (out, _) = render(
            r#"{{#with (field target "ID")}}{{name}} {{type_name type}}{{/with}} {{#with (field target "Items")}}{{type_name type}}{{/with}}"#,
            "",
        )
        .unwrap();
        assert_eq!(out, "ID int Base");
    }

    #[test]
    fn test_implements_helper() {
        let (out, _) = render(
            r#"{{implements target "fmt.Stringer"}} {{implements (pointer_to target) "fmt.Stringer"}}"#,
            "",
        )
        .unwrap();
        assert_eq!(out, "false true");
    }

    #[test]
    fn test_import_helpers() {
        let (out, refs) = render(
            r#"{{add_import "strings"}}{{#each (fields target)}}{{add_import_type type}}{{/each}}{{add_import "strings"}}done"#,
            "",
        )
        .unwrap();
        assert_eq!(out, "done");
        assert_eq!(refs, vec!["strings", "example.com/app", "time"]);
    }

    #[test]
    fn test_string_helpers() {
        let (out, _) = render(
            r#"{{concat "Sort" target_name "By" 2}} {{is_exported "Name"}} {{is_exported "name"}}"#,
            "",
        )
        .unwrap();
        assert_eq!(out, "SortOrderBy2 true false");
    }

    #[test]
    fn test_typed_failures_surface() {
        let err = render(r#"{{require_arg "name"}}"#, "").unwrap_err();
        assert!(matches!(err, CodegenError::MissingRequiredArgument { .. }));

        let err = render(r#"{{implements target "Nope"}}"#, "").unwrap_err();
        assert!(matches!(err, CodegenError::InterfaceNotFound { .. }));
    }

    #[test]
    fn test_strict_mode_missing_data() {
        let err = render("{{nothing_here}}", "").unwrap_err();
        assert!(matches!(err, CodegenError::Execution { .. }));
    }

    #[test]
    fn test_parse_error() {
        let engine = HandlebarsEngine::new();
        assert!(engine.parse("bad", "{{#each x}}").is_err());
    }
}
