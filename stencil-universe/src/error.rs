//! Error types for universe loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for parsing the universe interchange document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// Unknown element encountered.
    #[error("unknown element '{element}' in context '{context}'")]
    UnknownElement {
        /// Element name.
        element: String,
        /// Parent context.
        context: String,
    },

    /// Invalid document structure.
    #[error("invalid universe structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// Universe consistency error raised while loading.
    #[error(transparent)]
    Universe(#[from] UniverseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Error type for universe queries and validation.
#[derive(Debug, Error)]
pub enum UniverseError {
    /// Type declared twice.
    #[error("duplicate type declaration: '{identity}'")]
    DuplicateType {
        /// Qualified identity.
        identity: String,
    },

    /// Package declared twice.
    #[error("duplicate package declaration: '{path}'")]
    DuplicatePackage {
        /// Package path.
        path: String,
    },

    /// Named reference to an undeclared type.
    #[error("type '{identity}' referenced from '{referrer}' is not declared")]
    UnknownType {
        /// Missing identity.
        identity: String,
        /// Declaration holding the reference.
        referrer: String,
    },

    /// Declaration belongs to a package that is not loaded.
    #[error("type '{identity}' belongs to unknown package '{package}'")]
    UnknownPackage {
        /// Declared identity.
        identity: String,
        /// Missing package path.
        package: String,
    },

    /// A source file does not map to exactly one package.
    #[error("file '{}' resolves to {matches} packages, expected exactly 1", path.display())]
    UnresolvedFile {
        /// Source file.
        path: PathBuf,
        /// Number of packages claiming the file.
        matches: usize,
    },
}

impl ParseError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates an unknown element error.
    pub fn unknown_element(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownElement {
            element: element.into(),
            context: context.into(),
        }
    }

    /// Creates an invalid structure error.
    pub fn structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
