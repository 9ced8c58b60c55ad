//! Descriptor field and method signatures → TypeScript type expressions.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{FieldDescriptorProto, MethodDescriptorProto};

use crate::code;
use crate::error::{CodegenError, Result};
use crate::fragment::{Code, Symbol};
use crate::registry::TypeRegistry;

pub const NUMBER: &str = "number";
pub const BOOLEAN: &str = "boolean";
pub const STRING: &str = "string";
/// Uninhabited type for wire types the generated contracts do not carry.
pub const NEVER: &str = "never";

pub fn observable() -> Symbol {
    Symbol::package("Observable", "rxjs")
}

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Optional,
    Required,
    Repeated,
}

impl Cardinality {
    /// Fails when the label is absent or not one of the three known values.
    pub fn of(field: &FieldDescriptorProto) -> Result<Self> {
        let label = field.label.and_then(|raw| Label::try_from(raw).ok());
        match label {
            Some(Label::Optional) => Ok(Self::Optional),
            Some(Label::Required) => Ok(Self::Required),
            Some(Label::Repeated) => Ok(Self::Repeated),
            None => Err(CodegenError::invalid(format!(
                "Unknown field label type: {} (field '{}')",
                field.label.unwrap_or(0),
                field.name()
            ))),
        }
    }
}

/// Target type of a non-reference wire type, `None` for message/enum references.
///
/// An unknown raw type value is treated like the unsupported ones.
pub fn scalar_type(raw: Option<i32>) -> Option<&'static str> {
    let Some(kind) = raw.and_then(|raw| Type::try_from(raw).ok()) else {
        return Some(NEVER);
    };
    match kind {
        Type::Double
        | Type::Float
        | Type::Int64
        | Type::Uint64
        | Type::Int32
        | Type::Fixed64
        | Type::Fixed32
        | Type::Uint32
        | Type::Sfixed32
        | Type::Sfixed64
        | Type::Sint32
        | Type::Sint64 => Some(NUMBER),
        Type::Bool => Some(BOOLEAN),
        Type::String => Some(STRING),
        Type::Group | Type::Bytes => Some(NEVER),
        Type::Message | Type::Enum => None,
    }
}

/// Symbolic import of a registered message or enum.
pub fn type_reference(registry: &TypeRegistry, qualified: &str) -> Result<Code> {
    let entry = registry.resolve(qualified)?;
    Ok(Code::symbol(Symbol::generated(&entry.name, &entry.module)))
}

/// The element type of a field, before cardinality is applied.
pub fn translate_field_type(field: &FieldDescriptorProto, registry: &TypeRegistry) -> Result<Code> {
    if let Some(scalar) = scalar_type(field.r#type) {
        return Ok(Code::text(scalar));
    }
    let type_name = field.type_name.as_deref().ok_or_else(|| {
        CodegenError::invalid(format!(
            "field '{}' references a message or enum but has no type name",
            field.name()
        ))
    })?;
    type_reference(registry, type_name)
}

/// One interface member line, e.g. `  bar?: number;`.
pub fn translate_field(field: &FieldDescriptorProto, registry: &TypeRegistry) -> Result<Code> {
    let name = field
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::invalid("field has no name"))?;
    let cardinality = Cardinality::of(field)?;
    let ty = translate_field_type(field, registry)?;
    Ok(match cardinality {
        Cardinality::Optional => code!["  ", name, "?: ", ty, ";"],
        Cardinality::Required => code!["  ", name, ": ", ty, ";"],
        Cardinality::Repeated => code!["  ", name, ": ", ty, "[];"],
    })
}

pub fn translate_method_input(
    method: &MethodDescriptorProto,
    registry: &TypeRegistry,
) -> Result<Code> {
    let input = method.input_type.as_deref().ok_or_else(|| {
        CodegenError::invalid(format!("method '{}' has no input type", method.name()))
    })?;
    type_reference(registry, input)
}

/// `T | Promise<T> | Observable<T>`: an implementation may answer in any of
/// the three styles, so the contract admits all of them.
///
/// Streaming flags on the method do not change the union.
pub fn translate_method_output(
    method: &MethodDescriptorProto,
    registry: &TypeRegistry,
) -> Result<Code> {
    let output = method.output_type.as_deref().ok_or_else(|| {
        CodegenError::invalid(format!("method '{}' has no output type", method.name()))
    })?;
    let ty = type_reference(registry, output)?;
    Ok(code![
        ty.clone(),
        " | Promise<",
        ty.clone(),
        "> | ",
        observable(),
        "<",
        ty,
        ">"
    ])
}

/// `name(request: In): Out | Promise<Out> | Observable<Out>`, without indentation.
pub fn method_signature(method: &MethodDescriptorProto, registry: &TypeRegistry) -> Result<Code> {
    let name = method
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::invalid("method has no name"))?;
    Ok(code![
        name,
        "(request: ",
        translate_method_input(method, registry)?,
        "): ",
        translate_method_output(method, registry)?
    ])
}
