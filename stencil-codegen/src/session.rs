//! Generation sessions.
//!
//! A session runs the invocations of one file: it skips invocations it has
//! already executed, resolves templates through the run-wide locator, and
//! accumulates fragments and external references.

use crate::context::ExecutionContext;
use crate::engine::TemplateEngine;
use crate::error::CodegenError;
use crate::invocation::{Invocation, InvocationKey};
use crate::locator::TemplateLocator;
use std::collections::HashSet;
use stencil_universe::Universe;

/// Insertion-ordered, duplicate-free set of references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl ReferenceSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a reference if it is not already present. Returns true if it
    /// was added.
    pub fn insert(&mut self, reference: &str) -> bool {
        if self.index.contains(reference) {
            return false;
        }
        self.index.insert(reference.to_string());
        self.order.push(reference.to_string());
        true
    }

    /// Appends every reference of `other` in its order.
    pub fn extend(&mut self, other: &ReferenceSet) {
        for reference in other.iter() {
            self.insert(reference);
        }
    }

    /// Returns true if the reference is present.
    #[must_use]
    pub fn contains(&self, reference: &str) -> bool {
        self.index.contains(reference)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the references in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Result of a completed session.
#[derive(Debug, Clone, Default)]
pub struct SessionOutput {
    /// Generated fragments in discovery order.
    pub outputs: Vec<String>,
    /// Required external references.
    pub references: ReferenceSet,
}

/// State for generating one file.
pub struct GenerationSession<'g, E: TemplateEngine> {
    universe: &'g Universe,
    engine: &'g E,
    locator: &'g mut TemplateLocator<E::Template>,
    seen: HashSet<InvocationKey>,
    references: ReferenceSet,
    outputs: Vec<String>,
}

impl<'g, E: TemplateEngine> GenerationSession<'g, E> {
    /// Creates a session sharing the run's template cache.
    pub fn new(
        universe: &'g Universe,
        engine: &'g E,
        locator: &'g mut TemplateLocator<E::Template>,
    ) -> Self {
        Self {
            universe,
            engine,
            locator,
            seen: HashSet::new(),
            references: ReferenceSet::new(),
            outputs: Vec::new(),
        }
    }

    /// Runs every invocation in order and returns the accumulated output.
    ///
    /// # Errors
    /// Returns the first failure, wrapped as `CodegenError::Invocation`. No
    /// partial output is returned.
    pub fn run(mut self, invocations: &[Invocation]) -> Result<SessionOutput, CodegenError> {
        for invocation in invocations {
            self.execute(invocation)?;
        }
        Ok(self.finish())
    }

    /// Executes one invocation unless an identical one already ran. Returns
    /// true if it was executed.
    ///
    /// Session state only changes when the invocation succeeds.
    ///
    /// # Errors
    /// Returns the failure wrapped as `CodegenError::Invocation`.
    pub fn execute(&mut self, invocation: &Invocation) -> Result<bool, CodegenError> {
        let key = invocation.key();
        if self.seen.contains(&key) {
            tracing::debug!(
                "Skipping duplicate invocation of {} for {} (field {})",
                invocation.generator,
                invocation.target,
                invocation.field
            );
            return Ok(false);
        }

        let template = self
            .locator
            .resolve(self.engine, self.universe, &invocation.generator)
            .map_err(|e| {
                e.in_invocation(invocation.generator.to_string(), invocation.target.to_string())
            })?;
        let context = ExecutionContext::new(self.universe, invocation);
        let fragment = self.engine.execute(template, &context).map_err(|e| {
            e.in_invocation(invocation.generator.to_string(), invocation.target.to_string())
        })?;

        self.seen.insert(key);
        self.outputs.push(fragment);
        self.references.extend(&context.into_references());
        Ok(true)
    }

    /// Fragments produced so far.
    #[must_use]
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// References committed so far.
    #[must_use]
    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// Ends the session.
    #[must_use]
    pub fn finish(self) -> SessionOutput {
        SessionOutput {
            outputs: self.outputs,
            references: self.references,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::directive::ArgumentMap;
    use crate::engine::HandlebarsEngine;
    use std::fs;
    use stencil_universe::parse_universe;
    use stencil_universe::TypeIdentity;

    fn fixture(dir: &std::path::Path) -> Universe {
        let gen_dir = dir.join("gen");
        fs::create_dir_all(&gen_dir).unwrap();
        fs::write(
            gen_dir.join("Stamp.tmpl"),
            "{{add_import \"time\"}}func (x {{target_name}}) Stamp{{arg \"n\"}}() {}",
        )
        .unwrap();
        fs::write(
            gen_dir.join("Generic.tmpl"),
            "{{add_import \"bad\"}}{{#with (field target \"Value\")}}{{add_import_type type}}{{/with}}",
        )
        .unwrap();

        let xml = format!(
            r#"<universe>
    <package path="example.com/gen" name="gen">
        <file path="{gen}/gen.go"/>
        <type name="Stamp"><struct/></type>
        <type name="Generic"><struct/></type>
    </package>
    <package path="example.com/app" name="app">
        <file path="{app}/app.go"/>
        <type name="Box">
            <struct>
                <field name="Value"><typeparam name="T"/></field>
            </struct>
        </type>
    </package>
</universe>"#,
            gen = gen_dir.display(),
            app = dir.join("app").display(),
        );
        parse_universe(&xml).expect("Failed to parse")
    }

    fn invocation(generator: &str, args: &str, field: &str) -> Invocation {
        Invocation::new(
            TypeIdentity::new("example.com/gen", generator),
            TypeIdentity::new("example.com/app", "Box"),
            ArgumentMap::parse(args).unwrap(),
            field,
        )
    }

    #[test]
    fn test_reference_set_order_and_dedup() {
        let mut set = ReferenceSet::new();
        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(set.contains("a"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_duplicate_invocations_run_once() {
        let dir = tempfile::tempdir().unwrap();
        let universe = fixture(dir.path());
        let engine = HandlebarsEngine::new();
        let mut locator = TemplateLocator::new(&GeneratorConfig::default());
        let session = GenerationSession::new(&universe, &engine, &mut locator);

        let output = session
            .run(&[
                invocation("Stamp", "n=1,m=2", "a"),
                invocation("Stamp", "m=2,n=1", "b"),
                invocation("Stamp", "n=2", "c"),
            ])
            .expect("Failed to run");

        assert_eq!(
            output.outputs,
            vec!["func (x Box) Stamp1() {}", "func (x Box) Stamp2() {}"]
        );
        assert_eq!(output.references.into_vec(), vec!["time"]);
    }

    #[test]
    fn test_failure_leaves_session_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let universe = fixture(dir.path());
        let engine = HandlebarsEngine::new();
        let mut locator = TemplateLocator::new(&GeneratorConfig::default());
        let mut session = GenerationSession::new(&universe, &engine, &mut locator);

        assert!(session.execute(&invocation("Stamp", "n=1", "a")).unwrap());
        let err = session
            .execute(&invocation("Generic", "", "g"))
            .expect_err("type parameter must fail");
        assert!(matches!(
            err.root_cause(),
            CodegenError::UnsupportedTypeShape { .. }
        ));
        match &err {
            CodegenError::Invocation {
                generator, target, ..
            } => {
                assert_eq!(generator, "example.com/gen.Generic");
                assert_eq!(target, "example.com/app.Box");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(session.outputs().len(), 1);
        assert_eq!(session.references().iter().collect::<Vec<_>>(), vec!["time"]);
        assert!(!session.references().contains("bad"));
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let universe = fixture(dir.path());
        fs::remove_file(dir.path().join("gen").join("Stamp.tmpl")).unwrap();
        let engine = HandlebarsEngine::new();
        let mut locator = TemplateLocator::new(&GeneratorConfig::default());
        let session = GenerationSession::new(&universe, &engine, &mut locator);

        let err = session
            .run(&[invocation("Stamp", "", "a")])
            .expect_err("template is missing");
        assert!(matches!(
            err.root_cause(),
            CodegenError::TemplateNotFound { .. }
        ));
    }
}
