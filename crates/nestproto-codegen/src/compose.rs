//! Declarations shared by every artifact, and the "types" artifact itself.

use prost_types::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto};

use crate::code;
use crate::error::{CodegenError, Result};
use crate::fragment::Code;
use crate::registry::TypeRegistry;
use crate::translate;

/// Separator between top-level declarations of one file.
pub const DECLARATION_SEPARATOR: &str = "\n\n";

/// A braced block: `head {}` when there are no members, otherwise one member per line.
pub fn block(head: impl Into<Code>, members: Vec<Code>) -> Code {
    let head: Code = head.into();
    if members.is_empty() {
        return code![head, " {}"];
    }
    code![head, " {\n", Code::join(members, "\n"), "\n}"]
}

/// `export interface Name { ... }` over already indented member lines.
pub fn interface(name: &str, members: Vec<Code>) -> Code {
    block(code!["export interface ", Code::declaration(name)], members)
}

pub fn message_interface(message: &DescriptorProto, registry: &TypeRegistry) -> Result<Code> {
    let name = message
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::invalid("message has no name"))?;
    let members = message
        .field
        .iter()
        .map(|field| translate::translate_field(field, registry))
        .collect::<Result<Vec<_>>>()?;
    Ok(interface(name, members))
}

pub fn enum_declaration(enumeration: &EnumDescriptorProto) -> Result<Code> {
    let name = enumeration
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::invalid("enum has no name"))?;
    let values = enumeration
        .value
        .iter()
        .map(|value| {
            let label = value.name.as_deref().ok_or_else(|| {
                CodegenError::invalid(format!("value of enum '{name}' has no name"))
            })?;
            Ok(Code::text(format!("  {label} = {},", value.number())))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(block(code!["export enum ", Code::declaration(name)], values))
}

/// Every top-level message interface, then every enum, in declaration order.
pub fn types_content(file: &FileDescriptorProto, registry: &TypeRegistry) -> Result<Code> {
    let messages = file
        .message_type
        .iter()
        .map(|message| message_interface(message, registry));
    let enums = file.enum_type.iter().map(enum_declaration);
    let declarations = messages.chain(enums).collect::<Result<Vec<_>>>()?;
    Ok(Code::join(declarations, DECLARATION_SEPARATOR))
}
