//! Global fully-qualified-name → (simple name, module path) index.

use std::collections::HashMap;

use prost_types::FileDescriptorProto;

use crate::error::{CodegenError, Result};
use crate::paths::{self, ArtifactKind};

/// Where a message or enum type lives in the generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Simple name as declared (`Bar` for `.foo.Bar`).
    pub name: String,
    /// Module path of the declaring file's types artifact, relative to a
    /// generated directory and without extension (`foo/foos.types`).
    pub module: String,
}

/// Read-only after [`TypeRegistry::build`]; one per compiler invocation.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Index every top-level message and enum of every file.
    ///
    /// Messages and enums share one namespace. Duplicate qualified names are
    /// not rejected: the later declaration (file order, then declaration
    /// order) replaces the earlier one.
    pub fn build(files: &[FileDescriptorProto]) -> Result<Self> {
        let mut registry = Self::default();
        for file in files {
            let file_name = file
                .name
                .as_deref()
                .ok_or_else(|| CodegenError::invalid("file descriptor has no name"))?;
            let package = file.package();
            let module = paths::module_path(package, file_name, ArtifactKind::Types);

            let message_names = file.message_type.iter().map(|m| m.name.as_deref());
            let enum_names = file.enum_type.iter().map(|e| e.name.as_deref());
            for name in message_names.chain(enum_names) {
                let name = name.ok_or_else(|| {
                    CodegenError::invalid(format!("unnamed type declared in '{file_name}'"))
                })?;
                registry.insert(qualified_name(package, name), name, &module);
            }
        }
        tracing::debug!(types = registry.len(), "type registry built");
        Ok(registry)
    }

    pub fn insert(&mut self, qualified: String, name: &str, module: &str) {
        let replaced = self.entries.insert(
            qualified,
            TypeEntry {
                name: name.to_string(),
                module: module.to_string(),
            },
        );
        if let Some(previous) = replaced {
            tracing::debug!(
                name = %previous.name,
                module = %previous.module,
                "duplicate qualified type name, keeping the later declaration"
            );
        }
    }

    pub fn get(&self, qualified: &str) -> Option<&TypeEntry> {
        self.entries.get(qualified)
    }

    pub fn resolve(&self, qualified: &str) -> Result<&TypeEntry> {
        self.get(qualified)
            .ok_or_else(|| CodegenError::UnresolvedType(qualified.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, TypeEntry)> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = (String, TypeEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// `.package.Name`, or `.Name` for the empty package.
pub fn qualified_name(package: &str, name: &str) -> String {
    if package.is_empty() {
        format!(".{name}")
    } else {
        format!(".{package}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{DescriptorProto, EnumDescriptorProto};

    fn file_with(
        name: &str,
        package: Option<&str>,
        messages: &[&str],
        enums: &[&str],
    ) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_string()),
            package: package.map(str::to_string),
            message_type: messages
                .iter()
                .map(|m| DescriptorProto {
                    name: Some(m.to_string()),
                    ..Default::default()
                })
                .collect(),
            enum_type: enums
                .iter()
                .map(|e| EnumDescriptorProto {
                    name: Some(e.to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn registers_types_without_a_package() {
        let registry = TypeRegistry::build(&[file_with("foos.proto", None, &["Bar"], &[])]).unwrap();
        let entry = registry.get(".Bar").expect("registered");
        assert_eq!(entry.name, "Bar");
        assert_eq!(entry.module, "foos.types");
    }

    #[test]
    fn registers_types_with_a_single_level_package() {
        let registry =
            TypeRegistry::build(&[file_with("foos.proto", Some("foo"), &["Bar"], &[])]).unwrap();
        let entry = registry.get(".foo.Bar").expect("registered");
        assert_eq!(entry.name, "Bar");
        assert_eq!(entry.module, "foo/foos.types");
    }

    #[test]
    fn registers_types_with_a_multi_level_package() {
        let registry =
            TypeRegistry::build(&[file_with("foos.proto", Some("foo.baz"), &["Bar"], &[])])
                .unwrap();
        let entry = registry.get(".foo.baz.Bar").expect("registered");
        assert_eq!(entry.name, "Bar");
        assert_eq!(entry.module, "foo/baz/foos.types");
    }

    #[test]
    fn enums_share_the_message_namespace() {
        let registry = TypeRegistry::build(&[file_with("foos.proto", None, &[], &["Foo"])]).unwrap();
        let entry = registry.get(".Foo").expect("registered");
        assert_eq!(entry.name, "Foo");
        assert_eq!(entry.module, "foos.types");
    }

    #[test]
    fn counts_every_declaration_across_files() {
        let registry = TypeRegistry::build(&[
            file_with("a.proto", Some("a"), &["One", "Two"], &["Kind"]),
            file_with("b.proto", Some("b.c"), &["Three"], &["Mode", "State"]),
        ])
        .unwrap();
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.resolve(".b.c.State").unwrap().module, "b/c/b.types");
    }

    #[test]
    fn later_declaration_wins_on_collision() {
        let registry = TypeRegistry::build(&[
            file_with("first.proto", Some("dup"), &["Thing"], &[]),
            file_with("second.proto", Some("dup"), &[], &["Thing"]),
        ])
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve(".dup.Thing").unwrap().module, "dup/second.types");
    }

    #[test]
    fn resolve_reports_unknown_names() {
        let registry = TypeRegistry::build(&[file_with("foo.proto", None, &["Foo"], &[])]).unwrap();
        let err = registry.resolve(".Bar").unwrap_err();
        assert_eq!(err.to_string(), "Type '.Bar' was not found in the type map");
    }

    #[test]
    fn empty_input_builds_an_empty_registry() {
        assert!(TypeRegistry::build(&[]).unwrap().is_empty());
    }
}
