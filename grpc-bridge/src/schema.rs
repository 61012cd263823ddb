//! Schema document model and its protobuf text rendering.

use std::fmt::{self, Write as _};

/// Type name of the opaque "any" box.
pub const ANY_TYPE: &str = "google.protobuf.Any";

/// Type name of the timestamp box.
pub const TIMESTAMP_TYPE: &str = "google.protobuf.Timestamp";

/// A single field of a message: `[repeated] <type> <name> = <N>;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub repeated: bool,
    pub ty: String,
    pub name: String,
    pub number: u32,
}

/// A `oneof` group inside a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

/// An enumeration nested inside a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<(String, i32)>,
}

/// A message block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition {
    pub name: String,
    pub enums: Vec<EnumDefinition>,
    pub fields: Vec<FieldDefinition>,
    pub oneof: Option<OneofDefinition>,
}

impl MessageDefinition {
    /// Start building a message. Field numbers start at 1.
    pub fn builder(name: impl Into<String>) -> MessageBuilder {
        MessageBuilder {
            message: MessageDefinition {
                name: name.into(),
                enums: Vec::new(),
                fields: Vec::new(),
                oneof: None,
            },
            next_number: 1,
        }
    }

    /// Look up a plain field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All field numbers in declaration order, `oneof` branches included.
    pub fn numbers(&self) -> Vec<u32> {
        let branches = self.oneof.iter().flat_map(|o| o.fields.iter());
        self.fields
            .iter()
            .chain(branches)
            .map(|f| f.number)
            .collect()
    }

    /// Types carried by the `oneof` branches.
    pub fn branch_types(&self) -> Vec<&str> {
        self.oneof
            .iter()
            .flat_map(|o| o.fields.iter())
            .map(|f| f.ty.as_str())
            .collect()
    }
}

/// Builder that owns the running field number of one message.
#[derive(Debug)]
pub struct MessageBuilder {
    message: MessageDefinition,
    next_number: u32,
}

impl MessageBuilder {
    fn take_number(&mut self) -> u32 {
        let number = self.next_number;
        self.next_number += 1;
        number
    }

    /// Append a singular field.
    pub fn field(self, ty: impl Into<String>, name: impl Into<String>) -> Self {
        self.push(false, ty, name)
    }

    /// Append a repeated field.
    pub fn repeated(self, ty: impl Into<String>, name: impl Into<String>) -> Self {
        self.push(true, ty, name)
    }

    /// Append a field with an explicit label.
    pub fn push(mut self, repeated: bool, ty: impl Into<String>, name: impl Into<String>) -> Self {
        let number = self.take_number();
        self.message.fields.push(FieldDefinition {
            repeated,
            ty: ty.into(),
            name: name.into(),
            number,
        });
        self
    }

    /// Declare a nested enumeration.
    pub fn enumeration(mut self, name: impl Into<String>, values: &[(&str, i32)]) -> Self {
        self.message.enums.push(EnumDefinition {
            name: name.into(),
            values: values.iter().map(|(n, v)| ((*n).to_string(), *v)).collect(),
        });
        self
    }

    /// Open the message's `oneof` group.
    pub fn oneof(mut self, name: impl Into<String>) -> Self {
        self.message.oneof = Some(OneofDefinition {
            name: name.into(),
            fields: Vec::new(),
        });
        self
    }

    /// Append a branch to the `oneof` group, opening one if needed.
    pub fn branch(mut self, ty: impl Into<String>, name: impl Into<String>) -> Self {
        let number = self.take_number();
        let oneof = self.message.oneof.get_or_insert_with(|| OneofDefinition {
            name: "messageType".to_string(),
            fields: Vec::new(),
        });
        oneof.fields.push(FieldDefinition {
            repeated: false,
            ty: ty.into(),
            name: name.into(),
            number,
        });
        self
    }

    pub fn build(self) -> MessageDefinition {
        self.message
    }
}

/// One remote procedure of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcDefinition {
    pub name: String,
    pub request: String,
    pub response: String,
    /// Whether the response is a server stream.
    pub streaming: bool,
    /// Summary rendered as a comment line above the rpc.
    pub summary: String,
}

/// The service block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub name: String,
    pub rpcs: Vec<RpcDefinition>,
}

impl ServiceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rpcs: Vec::new(),
        }
    }

    pub fn rpc(&self, name: &str) -> Option<&RpcDefinition> {
        self.rpcs.iter().find(|r| r.name == name)
    }
}

/// Header metadata of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaHeader {
    /// Protobuf package.
    pub package: String,
    /// Target language package option.
    pub java_package: String,
    /// Target language outer class option.
    pub outer_classname: String,
}

impl SchemaHeader {
    /// Derive the header from a target package and class name.
    pub fn new(package_name: &str, class_name: &str) -> Self {
        Self {
            package: package_name.replace('-', "."),
            java_package: package_name.to_string(),
            outer_classname: format!("{class_name}_proto"),
        }
    }
}

/// The complete generated schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    pub header: SchemaHeader,
    /// Present when at least one endpoint was found.
    pub service: Option<ServiceDefinition>,
    /// Discovered, wrapper and auxiliary messages, in emission order.
    pub messages: Vec<MessageDefinition>,
    pub entity_envelope: MessageDefinition,
    pub return_envelope: MessageDefinition,
}

impl SchemaDocument {
    /// Find any message, envelopes included, by name.
    pub fn message(&self, name: &str) -> Option<&MessageDefinition> {
        self.messages
            .iter()
            .chain([&self.entity_envelope, &self.return_envelope])
            .find(|m| m.name == name)
    }

    /// Count messages with the given name.
    pub fn count_messages(&self, name: &str) -> usize {
        self.messages
            .iter()
            .chain([&self.entity_envelope, &self.return_envelope])
            .filter(|m| m.name == name)
            .count()
    }

    /// Render the document as protobuf source text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SchemaHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "syntax = \"proto3\";")?;
        writeln!(f, "package {};", self.package)?;
        writeln!(f, "import \"google/protobuf/any.proto\";")?;
        writeln!(f, "import \"google/protobuf/timestamp.proto\";")?;
        writeln!(f, "option java_package = \"{}\";", self.java_package)?;
        writeln!(f, "option java_outer_classname = \"{}\";", self.outer_classname)
    }
}

impl fmt::Display for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repeated {
            f.write_str("repeated ")?;
        }
        write!(f, "{} {} = {};", self.ty, self.name, self.number)
    }
}

impl fmt::Display for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "service {} {{", self.name)?;
        for rpc in &self.rpcs {
            writeln!(f, "  // {}", rpc.summary)?;
            let stream = if rpc.streaming { "stream " } else { "" };
            writeln!(
                f,
                "  rpc {} ({}) returns ({}{});",
                rpc.name, rpc.request, stream, rpc.response
            )?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for MessageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enums.is_empty() && self.fields.is_empty() && self.oneof.is_none() {
            return writeln!(f, "message {} {{}}", self.name);
        }

        writeln!(f, "message {} {{", self.name)?;
        for e in &self.enums {
            writeln!(f, "  enum {} {{", e.name)?;
            for (name, value) in &e.values {
                writeln!(f, "    {name} = {value};")?;
            }
            writeln!(f, "  }}")?;
        }
        for field in &self.fields {
            writeln!(f, "  {field}")?;
        }
        if let Some(oneof) = self.oneof.as_ref().filter(|o| !o.fields.is_empty()) {
            writeln!(f, "  oneof {} {{", oneof.name)?;
            for field in &oneof.fields {
                writeln!(f, "    {field}")?;
            }
            writeln!(f, "  }}")?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write!(out, "{}", self.header)?;
        if let Some(service) = &self.service {
            write!(out, "\n{service}")?;
        }
        for message in self
            .messages
            .iter()
            .chain([&self.entity_envelope, &self.return_envelope])
        {
            write!(out, "\n{message}")?;
        }
        f.write_str(&out)
    }
}
