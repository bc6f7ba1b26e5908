//! Generator invocations.

use crate::directive::ArgumentMap;
use stencil_universe::TypeIdentity;
use std::fmt;

/// A request to run one generator's template against one target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Generator type (the directive field's declared type).
    pub generator: TypeIdentity,
    /// Type the output is generated for.
    pub target: TypeIdentity,
    /// Directive arguments, inherited ones included.
    pub args: ArgumentMap,
    /// Field that introduced the directive. Diagnostic only.
    pub field: String,
}

impl Invocation {
    /// Creates a new invocation.
    #[must_use]
    pub fn new(
        generator: TypeIdentity,
        target: TypeIdentity,
        args: ArgumentMap,
        field: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            target,
            args,
            field: field.into(),
        }
    }

    /// Returns the deduplication key of this invocation.
    #[must_use]
    pub fn key(&self) -> InvocationKey {
        InvocationKey {
            generator: self.generator.clone(),
            target: self.target.clone(),
            args: self.args.to_pairs(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for {} (field {})",
            self.generator, self.target, self.field
        )
    }
}

/// Identity of an invocation within a session. The introducing field is not
/// part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvocationKey {
    /// Generator type.
    pub generator: TypeIdentity,
    /// Target type.
    pub target: TypeIdentity,
    /// Name-ordered argument pairs.
    pub args: Vec<(String, String)>,
}
