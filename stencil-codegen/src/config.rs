//! Generator configuration.

/// Default struct-tag key carrying generation directives.
pub const DEFAULT_TAG_KEY: &str = "codegen";

/// Default template file extension.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "tmpl";

/// Default bound on nested directive depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default suffix appended to the stem of generated files.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_generated";

/// Settings shared by every stage of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    tag_key: String,
    template_extension: String,
    max_depth: usize,
    output_suffix: String,
}

impl GeneratorConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag_key: DEFAULT_TAG_KEY.to_string(),
            template_extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }

    /// Sets the struct-tag key read for directives.
    #[must_use]
    pub fn with_tag_key(mut self, key: impl Into<String>) -> Self {
        self.tag_key = key.into();
        self
    }

    /// Sets the template file extension (without the dot).
    #[must_use]
    pub fn with_template_extension(mut self, ext: impl Into<String>) -> Self {
        self.template_extension = ext.into();
        self
    }

    /// Sets the maximum nested directive depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the suffix for generated file stems.
    #[must_use]
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    /// Returns the directive tag key.
    #[must_use]
    pub fn tag_key(&self) -> &str {
        &self.tag_key
    }

    /// Returns the template file extension.
    #[must_use]
    pub fn template_extension(&self) -> &str {
        &self.template_extension
    }

    /// Returns the maximum nested directive depth.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the generated file suffix.
    #[must_use]
    pub fn output_suffix(&self) -> &str {
        &self.output_suffix
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}
