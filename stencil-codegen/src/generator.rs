//! Run-level driver.
//!
//! A [`Generator`] lives for one run. It owns the template cache, opens one
//! [`GenerationSession`] per processed file, and hands each result to an
//! [`OutputWriter`].

use crate::config::GeneratorConfig;
use crate::engine::{HandlebarsEngine, TemplateEngine};
use crate::error::CodegenError;
use crate::extract::DirectiveExtractor;
use crate::invocation::Invocation;
use crate::locator::TemplateLocator;
use crate::output::{GeneratedFile, OutputWriter, output_path};
use crate::session::{GenerationSession, SessionOutput};
use std::path::{Path, PathBuf};
use stencil_universe::Universe;

/// Outcome of processing several files.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files whose output was written, with the destination path.
    pub written: Vec<(PathBuf, PathBuf)>,
    /// Files that failed, with their error.
    pub failed: Vec<(PathBuf, CodegenError)>,
}

impl RunReport {
    /// Returns true if every file succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Generation driver over a loaded universe.
pub struct Generator<'u, E: TemplateEngine = HandlebarsEngine> {
    universe: &'u Universe,
    config: GeneratorConfig,
    engine: E,
    locator: TemplateLocator<E::Template>,
}

impl<'u> Generator<'u, HandlebarsEngine> {
    /// Creates a generator using the Handlebars engine.
    #[must_use]
    pub fn new(universe: &'u Universe, config: GeneratorConfig) -> Self {
        Self::with_engine(universe, config, HandlebarsEngine::new())
    }
}

impl<'u, E: TemplateEngine> Generator<'u, E> {
    /// Creates a generator using a custom engine.
    #[must_use]
    pub fn with_engine(universe: &'u Universe, config: GeneratorConfig, engine: E) -> Self {
        let locator = TemplateLocator::new(&config);
        Self {
            universe,
            config,
            engine,
            locator,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Returns the run-wide template cache.
    #[must_use]
    pub fn locator(&self) -> &TemplateLocator<E::Template> {
        &self.locator
    }

    /// Extracts the invocations for one source file.
    ///
    /// # Errors
    /// Returns extraction errors, `UnresolvedFile`, or `NoDirectivesFound`.
    pub fn extract(&self, file: &Path) -> Result<Vec<Invocation>, CodegenError> {
        DirectiveExtractor::new(self.universe, &self.config).extract_file(file)
    }

    /// Runs a list of invocations in a fresh session.
    ///
    /// # Errors
    /// Returns the first failing invocation's error.
    pub fn run(&mut self, invocations: &[Invocation]) -> Result<SessionOutput, CodegenError> {
        GenerationSession::new(self.universe, &self.engine, &mut self.locator).run(invocations)
    }

    /// Generates the output for one source file without writing it.
    ///
    /// # Errors
    /// Returns any extraction or session error.
    pub fn generate_file(&mut self, file: &Path) -> Result<GeneratedFile, CodegenError> {
        let universe = self.universe;
        let package = universe.package_for_file(file)?;
        let invocations = self.extract(file)?;
        let output = self.run(&invocations)?;

        Ok(GeneratedFile {
            source: file.to_path_buf(),
            path: output_path(file, self.config.output_suffix()),
            package_path: package.path.clone(),
            package_name: package.name.clone(),
            references: output.references.into_vec(),
            fragments: output.outputs,
        })
    }

    /// Generates and writes the output for one source file.
    ///
    /// # Errors
    /// Returns any generation or write error.
    pub fn process_file(
        &mut self,
        file: &Path,
        writer: &mut dyn OutputWriter,
    ) -> Result<PathBuf, CodegenError> {
        let generated = self.generate_file(file)?;
        writer.write(&generated)?;
        tracing::info!(
            "Generated {} fragment(s) for {} into {}",
            generated.fragments.len(),
            file.display(),
            generated.path.display()
        );
        Ok(generated.path)
    }

    /// Processes files in order. A failing file does not stop the others.
    pub fn process_files<P: AsRef<Path>>(
        &mut self,
        files: &[P],
        writer: &mut dyn OutputWriter,
    ) -> RunReport {
        let mut report = RunReport::default();
        for file in files {
            let file = file.as_ref();
            match self.process_file(file, writer) {
                Ok(path) => report.written.push((file.to_path_buf(), path)),
                Err(e) => {
                    tracing::info!("Generation failed for {}: {}", file.display(), e);
                    report.failed.push((file.to_path_buf(), e));
                }
            }
        }
        report
    }
}
