//! Directive extraction.
//!
//! Walks the fields of a composite type and turns every directive-carrying
//! field into an [`Invocation`]. When the generator type is itself a struct,
//! its own directives are expanded too, inheriting the outer arguments and
//! targeting the outermost type.

use crate::config::GeneratorConfig;
use crate::directive::{ArgumentMap, directive_value};
use crate::error::CodegenError;
use crate::invocation::Invocation;
use stencil_universe::display::{relative_to, type_string};
use stencil_universe::{Field, StructShape, TypeDecl, TypeIdentity, Universe};
use std::path::Path;

/// Extracts invocations from type declarations.
pub struct DirectiveExtractor<'a> {
    universe: &'a Universe,
    config: &'a GeneratorConfig,
}

impl<'a> DirectiveExtractor<'a> {
    /// Creates an extractor over `universe`.
    #[must_use]
    pub fn new(universe: &'a Universe, config: &'a GeneratorConfig) -> Self {
        Self { universe, config }
    }

    /// Extracts the invocations for one declaration, in depth-first field
    /// order. Declarations that are not struct shaped yield nothing.
    ///
    /// # Errors
    /// Returns `MalformedDirective`, `InvalidGeneratorType`, or
    /// `RecursionLimitExceeded`.
    pub fn extract(&self, decl: &TypeDecl) -> Result<Vec<Invocation>, CodegenError> {
        let mut out = Vec::new();
        if let Some(shape) = decl.as_struct() {
            self.collect(
                &decl.identity,
                &decl.identity,
                shape,
                &ArgumentMap::new(),
                0,
                &mut out,
            )?;
        }
        Ok(out)
    }

    /// Extracts the invocations for every struct declared in `file`, in
    /// source order.
    ///
    /// # Errors
    /// Returns `UnresolvedFile` if the file does not belong to exactly one
    /// package, `NoDirectivesFound` if nothing in it carries a directive, or
    /// any error from [`extract`](Self::extract).
    pub fn extract_file(&self, file: &Path) -> Result<Vec<Invocation>, CodegenError> {
        let package = self.universe.package_for_file(file)?;
        let mut out = Vec::new();
        for decl in self.universe.structs_in_file(&package.path, file) {
            out.extend(self.extract(decl)?);
        }
        if out.is_empty() {
            return Err(CodegenError::NoDirectivesFound {
                file: file.to_path_buf(),
            });
        }
        Ok(out)
    }

    fn collect(
        &self,
        target: &TypeIdentity,
        owner: &TypeIdentity,
        shape: &StructShape,
        inherited: &ArgumentMap,
        depth: usize,
        out: &mut Vec<Invocation>,
    ) -> Result<(), CodegenError> {
        for field in &shape.fields {
            let Some(raw) = directive_value(&field.tag, self.config.tag_key()).map_err(|source| {
                CodegenError::MalformedDirective {
                    target: owner.to_string(),
                    field: field.name.clone(),
                    source,
                }
            })?
            else {
                continue;
            };

            let args = ArgumentMap::parse(&raw)
                .map_err(|source| CodegenError::MalformedDirective {
                    target: owner.to_string(),
                    field: field.name.clone(),
                    source,
                })?
                .merged_with(inherited);

            let generator = self.generator_decl(owner, field)?;
            out.push(Invocation::new(
                generator.identity.clone(),
                target.clone(),
                args.clone(),
                field.name.clone(),
            ));

            if let Some(nested) = generator.as_struct() {
                if depth + 1 > self.config.max_depth() {
                    return Err(CodegenError::RecursionLimitExceeded {
                        generator: generator.identity.to_string(),
                        limit: self.config.max_depth(),
                    });
                }
                self.collect(
                    target,
                    &generator.identity,
                    nested,
                    &args,
                    depth + 1,
                    out,
                )?;
            }
        }
        Ok(())
    }

    fn generator_decl(
        &self,
        owner: &TypeIdentity,
        field: &Field,
    ) -> Result<&'a TypeDecl, CodegenError> {
        field
            .ty
            .as_named()
            .and_then(|id| self.universe.get_type(id))
            .ok_or_else(|| CodegenError::InvalidGeneratorType {
                target: owner.to_string(),
                field: field.name.clone(),
                found: type_string(&field.ty, &relative_to(self.universe, &owner.package)),
            })
    }
}
