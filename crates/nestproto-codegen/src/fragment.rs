//! Composable source fragments with deferred import resolution.
//!
//! A [`Code`] is a sequence of literal text and symbolic type references.
//! Fragments concatenate freely (`+`, [`Code::join`], `collect`); the empty
//! fragment is the identity. Import statements are only computed in
//! [`Code::render`], once the output location of the whole file is known.
//!
//! An imported name that collides with a local declaration or with another
//! import is bound under an alias (`Bar as Bar1`) and written as the alias.

use std::fmt;
use std::ops::{Add, AddAssign};

use crate::paths;

/// First line of every generated file.
pub const HEADER: &str = "/* eslint-disable */";

/// Where an imported symbol comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Module {
    /// Bare specifier of an installed package (`rxjs`, `@nestjs/microservices`).
    Package(String),
    /// Module path relative to the generated directory, without extension.
    Generated(String),
}

/// A named import that is not yet bound to a concrete specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: String,
    pub module: Module,
}

impl Symbol {
    pub fn package(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: Module::Package(package.into()),
        }
    }

    pub fn generated(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: Module::Generated(module.into()),
        }
    }

    /// Import specifier as seen from the file at `location`.
    fn specifier(&self, location: &str) -> String {
        match &self.module {
            Module::Package(package) => package.clone(),
            Module::Generated(module) => paths::import_path(location, module),
        }
    }

    fn is_defined_in(&self, location: &str) -> bool {
        match &self.module {
            Module::Package(_) => false,
            Module::Generated(module) => {
                let own = location.strip_suffix(".ts").unwrap_or(location);
                paths::normalize(module) == paths::normalize(own)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Symbol(Symbol),
    /// A name the file itself declares.
    Declaration(String),
}

/// The local name an imported symbol is written as.
#[derive(Debug)]
struct Binding<'a> {
    name: &'a str,
    specifier: String,
    local: String,
}

impl Binding<'_> {
    fn import_name(&self) -> String {
        if self.local == self.name {
            self.local.clone()
        } else {
            format!("{} as {}", self.name, self.local)
        }
    }
}

/// Pending source text.
///
/// Adjacent text is merged and empty text is dropped, so equal rendered
/// fragments built in different groupings compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    segments: Vec<Segment>,
}

impl Code {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        let mut code = Self::empty();
        code.push_text(text.into());
        code
    }

    pub fn symbol(symbol: Symbol) -> Self {
        Self {
            segments: vec![Segment::Symbol(symbol)],
        }
    }

    pub fn declaration(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Declaration(name.into())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenate `parts`, placing `separator` between consecutive parts.
    pub fn join<I>(parts: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = Code>,
    {
        let mut joined = Self::empty();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                joined.push_text(separator.to_string());
            }
            joined.append(part);
        }
        joined
    }

    pub fn append(&mut self, other: Code) {
        for segment in other.segments {
            match segment {
                Segment::Text(text) => self.push_text(text),
                symbol => self.segments.push(symbol),
            }
        }
    }

    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(&text),
            _ => self.segments.push(Segment::Text(text)),
        }
    }

    /// Symbols in first-reference order, repeats included.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Symbol(symbol) => Some(symbol),
            _ => None,
        })
    }

    /// Names taken in the file at `location` before any import is bound.
    fn local_names(&self, location: &str) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Declaration(name) => Some(name.as_str()),
                Segment::Symbol(symbol) if symbol.is_defined_in(location) => {
                    Some(symbol.name.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Imports of the file at `location` in first-reference order.
    fn bindings(&self, location: &str) -> Vec<Binding<'_>> {
        let taken = self.local_names(location);
        let mut bindings: Vec<Binding<'_>> = Vec::new();
        for symbol in self.symbols() {
            if symbol.is_defined_in(location) {
                continue;
            }
            let specifier = symbol.specifier(location);
            if bindings
                .iter()
                .any(|b| b.name == symbol.name && b.specifier == specifier)
            {
                continue;
            }
            let is_free =
                |local: &str| !taken.contains(&local) && !bindings.iter().any(|b| b.local == local);
            let mut local = symbol.name.clone();
            let mut suffix = 0;
            while !is_free(&local) {
                suffix += 1;
                local = format!("{}{suffix}", symbol.name);
            }
            bindings.push(Binding {
                name: &symbol.name,
                specifier,
                local,
            });
        }
        bindings
    }

    /// Import lines for a file at `location` (relative to the generated dir).
    ///
    /// One line per specifier in first-reference order; names within a
    /// line keep first-reference order too.
    pub fn import_lines(&self, location: &str) -> Vec<String> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for binding in self.bindings(location) {
            let name = binding.import_name();
            match groups.iter_mut().find(|(s, _)| *s == binding.specifier) {
                Some((_, names)) => names.push(name),
                None => groups.push((binding.specifier, vec![name])),
            }
        }

        groups
            .into_iter()
            .map(|(specifier, names)| {
                format!("import {{ {} }} from '{specifier}';", names.join(", "))
            })
            .collect()
    }

    /// Body text with imported symbols written under their bound names.
    fn body(&self, location: &str, bindings: &[Binding<'_>]) -> String {
        let mut body = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) | Segment::Declaration(text) => body.push_str(text),
                Segment::Symbol(symbol) => {
                    let local = if symbol.is_defined_in(location) {
                        None
                    } else {
                        let specifier = symbol.specifier(location);
                        bindings
                            .iter()
                            .find(|b| b.name == symbol.name && b.specifier == specifier)
                            .map(|b| b.local.as_str())
                    };
                    body.push_str(local.unwrap_or(&symbol.name));
                }
            }
        }
        body
    }

    /// Finalize into the full contents of the file at `location`.
    pub fn render(&self, location: &str) -> String {
        let imports = self.import_lines(location);
        let body = self.body(location, &self.bindings(location));
        let body = body.trim();

        let mut out = String::with_capacity(HEADER.len() + body.len() + 64);
        out.push_str(HEADER);
        out.push('\n');
        for line in &imports {
            out.push_str(line);
            out.push('\n');
        }
        if !body.is_empty() {
            if !imports.is_empty() {
                out.push('\n');
            }
            out.push_str(body);
            out.push('\n');
        }
        out
    }
}

/// The body text with every symbol written as its bare name.
impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) | Segment::Declaration(text) => f.write_str(text)?,
                Segment::Symbol(symbol) => f.write_str(&symbol.name)?,
            }
        }
        Ok(())
    }
}

impl Add for Code {
    type Output = Code;

    fn add(mut self, rhs: Code) -> Code {
        self.append(rhs);
        self
    }
}

impl AddAssign for Code {
    fn add_assign(&mut self, rhs: Code) {
        self.append(rhs);
    }
}

impl FromIterator<Code> for Code {
    fn from_iter<I: IntoIterator<Item = Code>>(iter: I) -> Self {
        let mut code = Self::empty();
        for part in iter {
            code.append(part);
        }
        code
    }
}

impl From<&str> for Code {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Code {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<Symbol> for Code {
    fn from(symbol: Symbol) -> Self {
        Self::symbol(symbol)
    }
}

/// Concatenate heterogeneous pieces (`&str`, `String`, [`Symbol`], [`Code`]).
#[macro_export]
macro_rules! code {
    () => { $crate::fragment::Code::empty() };
    ($($part:expr),+ $(,)?) => {{
        let mut code = $crate::fragment::Code::empty();
        $( code += $crate::fragment::Code::from($part); )+
        code
    }};
}
