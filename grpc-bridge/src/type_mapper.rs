//! Scalar type mappings.
//!
//! | Source type | Scalar | Wrapper message |
//! |-------------|--------|-----------------|
//! | `boolean`, `Boolean` | `bool` | `gBoolean` |
//! | `byte`, `Byte` | `int32` | `gByte` |
//! | `short`, `Short` | `int32` | `gShort` |
//! | `int`, `Integer` | `int32` | `gInteger` |
//! | `long`, `Long` | `int64` | `gLong` |
//! | `float`, `Float` | `float` | `gFloat` |
//! | `double`, `Double` | `double` | `gDouble` |
//! | `char`, `Character` | `int32` | `gCharacter` (holds a `string`) |
//! | `String` | `string` | `gString` |
//!
//! Boxed names may also appear qualified (`java.lang.Integer`).

use crate::error::{GenerateError, GenerateResult};

/// A one-field message standing in for a scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperDefinition {
    /// Boxed class simple name the wrapper replaces.
    pub class_name: &'static str,
    /// Message name.
    pub message: &'static str,
    /// Scalar type of the `value` field.
    pub scalar: &'static str,
}

/// Wrapper messages, in emission order.
pub const WRAPPERS: &[WrapperDefinition] = &[
    WrapperDefinition { class_name: "Boolean", message: "gBoolean", scalar: "bool" },
    WrapperDefinition { class_name: "Byte", message: "gByte", scalar: "int32" },
    WrapperDefinition { class_name: "Short", message: "gShort", scalar: "int32" },
    WrapperDefinition { class_name: "Integer", message: "gInteger", scalar: "int32" },
    WrapperDefinition { class_name: "Long", message: "gLong", scalar: "int64" },
    WrapperDefinition { class_name: "Float", message: "gFloat", scalar: "float" },
    WrapperDefinition { class_name: "Double", message: "gDouble", scalar: "double" },
    WrapperDefinition { class_name: "Character", message: "gCharacter", scalar: "string" },
    WrapperDefinition { class_name: "String", message: "gString", scalar: "string" },
];

/// Maps primitive, boxed and string types to schema types.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper;

impl TypeMapper {
    /// Scalar schema type for a field of the given type name.
    pub fn scalar(name: &str) -> GenerateResult<&'static str> {
        let scalar = match strip_lang(name) {
            "boolean" | "Boolean" => "bool",
            "byte" | "Byte" | "short" | "Short" | "int" | "Integer" | "char" | "Character" => "int32",
            "long" | "Long" => "int64",
            "float" | "Float" => "float",
            "double" | "Double" => "double",
            "String" | "string" => "string",
            _ => return Err(GenerateError::unknown_scalar(name)),
        };
        Ok(scalar)
    }

    /// Wrapper message name used when a scalar travels as a message.
    pub fn wrapper(name: &str) -> GenerateResult<&'static str> {
        let wrapper = match strip_lang(name) {
            "boolean" | "Boolean" => "gBoolean",
            "byte" | "Byte" => "gByte",
            "short" | "Short" => "gShort",
            "int" | "Integer" => "gInteger",
            "long" | "Long" => "gLong",
            "float" | "Float" => "gFloat",
            "double" | "Double" => "gDouble",
            "char" | "Character" => "gCharacter",
            "String" | "string" => "gString",
            _ => return Err(GenerateError::unknown_scalar(name)),
        };
        Ok(wrapper)
    }

    /// Check if a class simple name is replaced by a wrapper message.
    pub fn is_wrapped_class(simple_name: &str) -> bool {
        WRAPPERS.iter().any(|w| w.class_name == simple_name)
    }
}

/// Strip the `java.lang.` prefix from boxed and string names.
fn strip_lang(name: &str) -> &str {
    name.strip_prefix("java.lang.").unwrap_or(name)
}
