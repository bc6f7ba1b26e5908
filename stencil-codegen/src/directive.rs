//! Directive tags and argument maps.
//!
//! A directive is the value stored under the reserved key of a field tag,
//! using the struct-tag convention of space separated `key:"value"` pairs:
//!
//! ```text
//! json:"items" codegen:"type=string,sorted"
//! ```
//!
//! The value is a comma separated argument list where each entry is either
//! `name=value` or a bare `name` (mapping to the empty string).

use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use thiserror::Error;

/// Syntax problem in a field tag or directive argument list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveSyntaxError {
    /// Tag key not followed by `:"`.
    #[error("tag key '{key}' is not followed by a quoted value")]
    MissingValue {
        /// Offending key text.
        key: String,
    },

    /// Quoted tag value without a closing quote.
    #[error("unterminated value for tag key '{key}'")]
    UnterminatedValue {
        /// Tag key.
        key: String,
    },

    /// Unsupported escape sequence in a quoted value.
    #[error("invalid escape '\\{escape}' in value for tag key '{key}'")]
    InvalidEscape {
        /// Tag key.
        key: String,
        /// Escaped character.
        escape: char,
    },

    /// Argument entry without a name.
    #[error("argument entry '{entry}' has no name")]
    EmptyArgumentKey {
        /// Offending entry.
        entry: String,
    },
}

/// Looks up `key` in a struct tag.
///
/// Returns the unquoted value of the first pair whose key matches, or `None`
/// if no pair matches.
///
/// # Errors
/// Returns `DirectiveSyntaxError` if the tag is malformed before a match is
/// found, or the matching value cannot be unquoted.
pub fn lookup_tag(tag: &str, key: &str) -> Result<Option<String>, DirectiveSyntaxError> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return Ok(None);
        }

        let bytes = rest.as_bytes();
        let mut i = 0;
        while i < bytes.len()
            && bytes[i] > b' '
            && bytes[i] != b':'
            && bytes[i] != b'"'
            && bytes[i] != 0x7f
        {
            i += 1;
        }
        if i == 0 || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
            let end = rest.find(' ').unwrap_or(rest.len());
            return Err(DirectiveSyntaxError::MissingValue {
                key: rest[..end].to_string(),
            });
        }
        let name = &rest[..i];
        rest = &rest[i + 1..];

        let bytes = rest.as_bytes();
        let mut j = 1;
        while j < bytes.len() && bytes[j] != b'"' {
            if bytes[j] == b'\\' {
                j += 1;
            }
            j += 1;
        }
        if j >= bytes.len() {
            return Err(DirectiveSyntaxError::UnterminatedValue {
                key: name.to_string(),
            });
        }
        let quoted = &rest[1..j];
        rest = &rest[j + 1..];

        if name == key {
            return unquote(quoted, name).map(Some);
        }
    }
}

fn unquote(quoted: &str, key: &str) -> Result<String, DirectiveSyntaxError> {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => {
                return Err(DirectiveSyntaxError::InvalidEscape {
                    key: key.to_string(),
                    escape: other,
                });
            }
            None => {
                return Err(DirectiveSyntaxError::UnterminatedValue {
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(out)
}

/// Reads the directive stored under `key`, if any.
///
/// A tag with broken syntax only counts as malformed when it mentions
/// `key:`; otherwise the field is treated as carrying no directive.
///
/// # Errors
/// Returns `DirectiveSyntaxError` for malformed tags that mention `key`.
pub fn directive_value(tag: &str, key: &str) -> Result<Option<String>, DirectiveSyntaxError> {
    match lookup_tag(tag, key) {
        Ok(value) => Ok(value),
        Err(e) if tag.contains(&format!("{key}:")) => Err(e),
        Err(_) => Ok(None),
    }
}

/// Directive arguments, kept sorted by name so that equality and hashing are
/// structural.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ArgumentMap(BTreeMap<String, String>);

impl ArgumentMap {
    /// Creates an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw `k1=v1,k2,...` argument list.
    ///
    /// The empty string yields an empty map. Names are trimmed, values are
    /// kept verbatim, and the first occurrence of a repeated name wins.
    ///
    /// # Errors
    /// Returns `DirectiveSyntaxError::EmptyArgumentKey` for an entry without
    /// a name (including empty entries such as a trailing comma).
    pub fn parse(raw: &str) -> Result<Self, DirectiveSyntaxError> {
        let mut map = BTreeMap::new();
        if raw.is_empty() {
            return Ok(Self(map));
        }

        for entry in raw.split(',') {
            let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
            let key = key.trim();
            if key.is_empty() {
                return Err(DirectiveSyntaxError::EmptyArgumentKey {
                    entry: entry.to_string(),
                });
            }
            map.entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        Ok(Self(map))
    }

    /// Returns the value of an argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns true if the argument is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Sets an argument, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Fills in every argument of `outer` this map does not define.
    pub fn inherit(&mut self, outer: &ArgumentMap) {
        for (name, value) in &outer.0 {
            self.0
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Returns a copy of this map extended with `outer`'s missing arguments.
    #[must_use]
    pub fn merged_with(&self, outer: &ArgumentMap) -> Self {
        let mut merged = self.clone();
        merged.inherit(outer);
        merged
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over arguments in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Canonical name-ordered pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ArgumentMap {
    /// Collects pairs; the first occurrence of a repeated name wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (k, v) in iter {
            map.entry(k.into()).or_insert_with(|| v.into());
        }
        Self(map)
    }
}

impl<'a> IntoIterator for &'a ArgumentMap {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
