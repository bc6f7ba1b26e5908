//! Packages, declarations, and the resolved type universe.

use crate::error::UniverseError;
use crate::types::{Signature, StructShape, TypeIdentity, TypeShape};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A loaded package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Import path.
    pub path: String,
    /// Short name used to qualify references.
    pub name: String,
    /// Source directory.
    pub dir: PathBuf,
    /// Source files belonging to the package.
    pub files: Vec<PathBuf>,
}

impl Package {
    /// Creates a new package with no files.
    #[must_use]
    pub fn new(path: impl Into<String>, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    /// Adds a source file to the package.
    pub fn add_file(&mut self, file: impl Into<PathBuf>) {
        self.files.push(file.into());
    }

    /// Returns true if the package owns `file`.
    #[must_use]
    pub fn contains_file(&self, file: &Path) -> bool {
        self.files.iter().any(|f| f == file)
    }
}

/// Source position of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Declaring file.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Method declared on a named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Signature, receiver excluded.
    pub signature: Signature,
    /// Whether the receiver is a pointer.
    pub pointer_receiver: bool,
}

/// Declaration of a named type.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// Identity.
    pub identity: TypeIdentity,
    /// Declaration position.
    pub position: Position,
    /// Underlying shape.
    pub underlying: TypeShape,
    /// Declared methods.
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    /// Creates a declaration without methods.
    #[must_use]
    pub fn new(identity: TypeIdentity, position: Position, underlying: TypeShape) -> Self {
        Self {
            identity,
            position,
            underlying,
            methods: Vec::new(),
        }
    }

    /// Adds a method to the declaration.
    #[must_use]
    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Returns the struct shape if the underlying type is a struct.
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructShape> {
        match &self.underlying {
            TypeShape::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the shape referring to this declaration.
    #[must_use]
    pub fn shape(&self) -> TypeShape {
        TypeShape::Named(self.identity.clone())
    }
}

/// Fully resolved set of packages and named type declarations.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    /// Packages in load order.
    pub packages: Vec<Package>,
    /// Type declarations in load order.
    pub types: Vec<TypeDecl>,
    /// Type lookup map (built while adding declarations).
    type_map: HashMap<TypeIdentity, usize>,
    /// Package lookup map.
    package_map: HashMap<String, usize>,
}

impl Universe {
    /// Creates an empty universe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package.
    ///
    /// # Errors
    /// Returns `UniverseError::DuplicatePackage` if the path is already loaded.
    pub fn add_package(&mut self, package: Package) -> Result<(), UniverseError> {
        if self.package_map.contains_key(&package.path) {
            return Err(UniverseError::DuplicatePackage { path: package.path });
        }
        self.package_map
            .insert(package.path.clone(), self.packages.len());
        self.packages.push(package);
        Ok(())
    }

    /// Adds a type declaration.
    ///
    /// # Errors
    /// Returns `UniverseError::DuplicateType` if the identity is already declared.
    pub fn add_type(&mut self, decl: TypeDecl) -> Result<(), UniverseError> {
        if self.type_map.contains_key(&decl.identity) {
            return Err(UniverseError::DuplicateType {
                identity: decl.identity.to_string(),
            });
        }
        self.type_map.insert(decl.identity.clone(), self.types.len());
        self.types.push(decl);
        Ok(())
    }

    /// Looks up a package by import path.
    #[must_use]
    pub fn package(&self, path: &str) -> Option<&Package> {
        self.package_map.get(path).map(|&idx| &self.packages[idx])
    }

    /// Looks up a type declaration.
    #[must_use]
    pub fn get_type(&self, identity: &TypeIdentity) -> Option<&TypeDecl> {
        self.type_map.get(identity).map(|&idx| &self.types[idx])
    }

    /// Returns true if the identity is declared.
    #[must_use]
    pub fn has_type(&self, identity: &TypeIdentity) -> bool {
        self.type_map.contains_key(identity)
    }

    /// Short name for a package path, falling back to the last path segment
    /// for packages that were not loaded.
    #[must_use]
    pub fn package_name<'a>(&'a self, path: &'a str) -> &'a str {
        match self.package(path) {
            Some(pkg) => &pkg.name,
            None => path.rsplit('/').next().unwrap_or(path),
        }
    }

    /// Resolves the single package owning `file`.
    ///
    /// # Errors
    /// Returns `UniverseError::UnresolvedFile` if zero or several packages
    /// claim the file.
    pub fn package_for_file(&self, file: &Path) -> Result<&Package, UniverseError> {
        let mut matches = self.packages.iter().filter(|p| p.contains_file(file));
        match (matches.next(), matches.next()) {
            (Some(pkg), None) => Ok(pkg),
            (first, second) => {
                let count = usize::from(first.is_some())
                    + usize::from(second.is_some())
                    + matches.count();
                Err(UniverseError::UnresolvedFile {
                    path: file.to_path_buf(),
                    matches: count,
                })
            }
        }
    }

    /// Returns struct-shaped declarations of `package` declared in `file`,
    /// ordered by source line.
    #[must_use]
    pub fn structs_in_file(&self, package: &str, file: &Path) -> Vec<&TypeDecl> {
        let mut decls: Vec<&TypeDecl> = self
            .types
            .iter()
            .filter(|d| {
                d.identity.package == package
                    && d.position.file == file
                    && d.as_struct().is_some()
            })
            .collect();
        decls.sort_by_key(|d| d.position.line);
        decls
    }

    /// Resolves named types to their underlying shape. Other shapes are
    /// returned unchanged.
    #[must_use]
    pub fn underlying<'a>(&'a self, shape: &'a TypeShape) -> Option<&'a TypeShape> {
        let mut current = shape;
        // Bounded so that `type A B; type B A` cannot loop.
        for _ in 0..self.types.len() + 1 {
            match current {
                TypeShape::Named(id) => current = &self.get_type(id)?.underlying,
                other => return Some(other),
            }
        }
        None
    }

    /// Rebuilds the lookup maps from the declaration vectors.
    pub fn build_maps(&mut self) {
        self.type_map.clear();
        for (idx, decl) in self.types.iter().enumerate() {
            self.type_map.insert(decl.identity.clone(), idx);
        }
        self.package_map.clear();
        for (idx, pkg) in self.packages.iter().enumerate() {
            self.package_map.insert(pkg.path.clone(), idx);
        }
    }
}
