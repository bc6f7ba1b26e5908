//! Template discovery and caching.

use crate::config::GeneratorConfig;
use crate::engine::TemplateEngine;
use crate::error::CodegenError;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};
use stencil_universe::{TypeIdentity, Universe, UniverseError};

/// Finds and caches the parsed template of each generator type.
///
/// The template of generator `G` lives next to the file declaring `G`, as
/// `<dir>/G.<ext>`.
pub struct TemplateLocator<T> {
    extension: String,
    cache: HashMap<TypeIdentity, T>,
}

impl<T> TemplateLocator<T> {
    /// Creates an empty locator.
    #[must_use]
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            extension: config.template_extension().to_string(),
            cache: HashMap::new(),
        }
    }

    /// Returns the template path for a generator.
    ///
    /// # Errors
    /// Returns `UniverseError::UnknownType` if the generator is not declared.
    pub fn path_for(
        &self,
        universe: &Universe,
        generator: &TypeIdentity,
    ) -> Result<PathBuf, CodegenError> {
        template_path(universe, generator, &self.extension)
    }

    /// Returns the template for a generator, loading and parsing it on first
    /// use.
    ///
    /// # Errors
    /// Returns `TemplateNotFound` if the file cannot be read, or
    /// `TemplateParseError` if the engine rejects it.
    pub fn resolve<E>(
        &mut self,
        engine: &E,
        universe: &Universe,
        generator: &TypeIdentity,
    ) -> Result<&T, CodegenError>
    where
        E: TemplateEngine<Template = T>,
    {
        match self.cache.entry(generator.clone()) {
            Entry::Occupied(entry) => {
                tracing::debug!("Template cache hit for {}", generator);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let path = template_path(universe, generator, &self.extension)?;
                let template = load(engine, generator, &path)?;
                Ok(entry.insert(template))
            }
        }
    }

    /// Returns true if the generator's template is cached.
    #[must_use]
    pub fn is_cached(&self, generator: &TypeIdentity) -> bool {
        self.cache.contains_key(generator)
    }

    /// Number of cached templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn template_path(
    universe: &Universe,
    generator: &TypeIdentity,
    extension: &str,
) -> Result<PathBuf, CodegenError> {
    let decl = universe
        .get_type(generator)
        .ok_or_else(|| UniverseError::UnknownType {
            identity: generator.to_string(),
            referrer: "template lookup".to_string(),
        })?;
    let dir = decl.position.file.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(format!("{}.{extension}", generator.name)))
}

fn load<E: TemplateEngine>(
    engine: &E,
    generator: &TypeIdentity,
    path: &Path,
) -> Result<E::Template, CodegenError> {
    tracing::debug!("Loading template for {} from {}", generator, path.display());
    let source = fs::read_to_string(path).map_err(|source| CodegenError::TemplateNotFound {
        generator: generator.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    engine
        .parse(&generator.to_string(), &source)
        .map_err(|e| CodegenError::TemplateParseError {
            generator: generator.to_string(),
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
