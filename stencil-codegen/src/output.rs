//! Generated file assembly and writing.

use crate::error::CodegenError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Banner placed at the top of every generated file.
pub const GENERATED_BANNER: &str = "// Code generated by stencil. DO NOT EDIT.";

/// Output of one processed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Source file the output was generated from.
    pub source: PathBuf,
    /// Destination path.
    pub path: PathBuf,
    /// Import path of the source file's package.
    pub package_path: String,
    /// Short name of the source file's package.
    pub package_name: String,
    /// Required references, in registration order.
    pub references: Vec<String>,
    /// Generated fragments, in discovery order.
    pub fragments: Vec<String>,
}

impl GeneratedFile {
    /// Renders the file: banner, package clause, imports other than the
    /// file's own package, then the fragments separated by blank lines.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(GENERATED_BANNER);
        out.push_str("\n\npackage ");
        out.push_str(&self.package_name);
        out.push('\n');

        let imports: Vec<&str> = self
            .references
            .iter()
            .map(String::as_str)
            .filter(|r| !r.is_empty() && *r != self.package_path)
            .collect();
        match imports.as_slice() {
            [] => {}
            [single] => {
                out.push_str(&format!("\nimport \"{single}\"\n"));
            }
            many => {
                out.push_str("\nimport (\n");
                for reference in many {
                    out.push_str(&format!("\t\"{reference}\"\n"));
                }
                out.push_str(")\n");
            }
        }

        for fragment in &self.fragments {
            out.push('\n');
            out.push_str(fragment.trim_end_matches('\n'));
            out.push('\n');
        }
        out
    }
}

/// Destination for generated files.
pub trait OutputWriter {
    /// Writes one generated file.
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if writing fails.
    fn write(&mut self, file: &GeneratedFile) -> Result<(), CodegenError>;
}

/// Writes each generated file to its destination path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOutputWriter;

impl FileOutputWriter {
    /// Creates a new file writer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl OutputWriter for FileOutputWriter {
    fn write(&mut self, file: &GeneratedFile) -> Result<(), CodegenError> {
        if let Some(dir) = file.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&file.path, file.render())?;
        Ok(())
    }
}

/// Writes generated files to a stream, each preceded by a header line
/// naming its destination.
#[derive(Debug)]
pub struct StreamOutputWriter<W> {
    inner: W,
}

impl<W: Write> StreamOutputWriter<W> {
    /// Wraps a stream.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> OutputWriter for StreamOutputWriter<W> {
    fn write(&mut self, file: &GeneratedFile) -> Result<(), CodegenError> {
        writeln!(self.inner, "// ==> {}", file.path.display())?;
        self.inner.write_all(file.render().as_bytes())?;
        self.inner.flush()?;
        Ok(())
    }
}

/// Destination path for the output of `source`:
/// `<dir>/<stem><suffix>.<ext>`.
#[must_use]
pub fn output_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match source.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    source.with_file_name(name)
}
