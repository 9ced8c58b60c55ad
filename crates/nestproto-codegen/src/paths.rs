//! Output locations and relative import paths.
//!
//! Every path this crate emits goes through [`normalize`], so generated file
//! names and import specifiers use `/` whatever the host separator is.

use std::fmt;
use std::path::Path;

use prost_types::FileDescriptorProto;

use crate::error::{CodegenError, Result};

/// Which artifact a per-file output holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Types,
    Backend,
    Frontend,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Types, Self::Backend, Self::Frontend];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Types => "types",
            Self::Backend => "backend",
            Self::Frontend => "frontend",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapse a path to canonical `/`-separated form.
///
/// `\` becomes `/`, empty and `.` segments are dropped and `..` cancels the
/// preceding segment. Leading `..` segments of a relative path are kept; an
/// absolute path keeps its root.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Join two path fragments with `/`, skipping an empty prefix.
pub fn join(base: &str, rest: &str) -> String {
    if base.is_empty() {
        normalize(rest)
    } else {
        normalize(&format!("{base}/{rest}"))
    }
}

/// `foo.bar.baz` → `foo/bar/baz`; the empty package maps to the empty string.
pub fn package_dir(package: &str) -> String {
    package.replace('.', "/")
}

/// The source file name with its `.proto` extension removed.
pub fn source_stem(file_name: &str) -> &str {
    file_name.strip_suffix(".proto").unwrap_or(file_name)
}

/// Module path (no `.ts`) of a file's artifact, relative to a generated directory.
pub fn module_path(package: &str, file_name: &str, kind: ArtifactKind) -> String {
    join(
        &package_dir(package),
        &format!("{}.{kind}", source_stem(file_name)),
    )
}

/// Output path of a file's artifact relative to a generated directory.
pub fn relative_output_path(file: &FileDescriptorProto, kind: ArtifactKind) -> Result<String> {
    let name = file
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::invalid("file descriptor has no name"))?;
    Ok(format!("{}.ts", module_path(file.package(), name, kind)))
}

/// Full, normalized name of a generated file below `generated_dir`.
pub fn output_file_name(generated_dir: &Path, relative: &str) -> String {
    join(&generated_dir.to_string_lossy(), relative)
}

/// Proto path a generated file hands to the gRPC loader, relative to the generated dir.
pub fn proto_path(file_name: &str) -> String {
    normalize(&format!("../protos/{file_name}"))
}

/// Relative specifier an import in `from` must use to reach module `to`.
///
/// Both arguments are relative to the same generated directory. One `../` is
/// emitted per directory level of `from`; a file at the root uses `./`.
pub fn import_path(from: &str, to: &str) -> String {
    let depth = normalize(from).matches('/').count();
    let target = normalize(to);
    if depth == 0 {
        format!("./{target}")
    } else {
        format!("{}{target}", "../".repeat(depth))
    }
}
