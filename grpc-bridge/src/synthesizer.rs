//! Conversion of one class into a message definition.
//!
//! Inheritance is erased: a class whose direct ancestor is not the root type
//! gets one extra field, named after the ancestor, carrying the ancestor's
//! message. The ancestor is queued and synthesized on its own, so its own
//! super field carries the rest of the chain.

use crate::context::GenerationContext;
use crate::error::GenerateResult;
use crate::model::{is_platform_name, ClassModel, TypeRef, ROOT_TYPE};
use crate::naming::super_field_name;
use crate::schema::{MessageDefinition, ANY_TYPE};
use crate::type_mapper::TypeMapper;
use std::path::Path;

/// Generic response marker; never synthesized.
pub const RESPONSE_CLASS: &str = "jakarta.ws.rs.core.Response";

/// Schema shape of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldShape {
    repeated: bool,
    ty: String,
}

impl FieldShape {
    fn single(ty: impl Into<String>) -> Self {
        Self {
            repeated: false,
            ty: ty.into(),
        }
    }

    fn repeated(ty: impl Into<String>) -> Self {
        Self {
            repeated: true,
            ty: ty.into(),
        }
    }
}

/// Turns classes taken off the worklist into messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageSynthesizer;

impl MessageSynthesizer {
    /// Check if a class is left out of the schema entirely.
    pub fn is_skipped(class: &ClassModel) -> bool {
        class.is_interface
            || is_platform_name(&class.qualified_name)
            || TypeMapper::is_wrapped_class(class.simple_name())
            || class.qualified_name == RESPONSE_CLASS
    }

    /// Synthesize a class, appending its message to the context.
    ///
    /// `origin` is the search root the class was loaded from, if it came from
    /// the additional class loader. Returns false when the class was already
    /// visited or is skipped.
    pub fn synthesize(
        &self,
        ctx: &mut GenerationContext<'_>,
        class: &ClassModel,
        origin: Option<&Path>,
    ) -> GenerateResult<bool> {
        let qualified_name = &class.qualified_name;
        if !ctx.worklist.mark_visited(qualified_name) {
            return Ok(false);
        }
        if Self::is_skipped(class) {
            tracing::debug!(class = %qualified_name, "skipped");
            return Ok(false);
        }

        let name = ctx.names.identifier(qualified_name, class.is_inner)?;
        let mut message = MessageDefinition::builder(name);

        for field in &class.fields {
            let shape = self.field_shape(ctx, &field.ty, qualified_name, origin)?;
            message = message.push(shape.repeated, shape.ty, field.name.clone());
        }

        if let Some(ancestor) = class.ancestor.as_deref().filter(|a| a.qualified_name != ROOT_TYPE) {
            let ty = self.ancestor_type(ctx, ancestor)?;
            message = message.field(ty, super_field_name(ancestor.simple_name()));
        }

        let message = message.build();
        tracing::debug!(
            class = %qualified_name,
            message = %message.name,
            fields = message.fields.len(),
            "synthesized"
        );
        ctx.messages.push(message);
        Ok(true)
    }

    fn field_shape(
        &self,
        ctx: &mut GenerationContext<'_>,
        ty: &TypeRef,
        owner: &str,
        origin: Option<&Path>,
    ) -> GenerateResult<FieldShape> {
        let shape = match ty {
            TypeRef::Primitive { name } | TypeRef::Boxed { name } => FieldShape::single(TypeMapper::scalar(name)?),
            TypeRef::Reference { .. } if ty.is_string() => FieldShape::single("string"),
            TypeRef::Reference { name, inner, .. } => {
                FieldShape::single(ctx.resolve_reference(name, *inner, origin, owner)?)
            }
            TypeRef::Array { element } => match element.as_ref() {
                TypeRef::Primitive { name } if name == "byte" => FieldShape::single("bytes"),
                TypeRef::Primitive { name } | TypeRef::Boxed { name } => {
                    FieldShape::repeated(TypeMapper::scalar(name)?)
                }
                TypeRef::Reference { .. } if element.is_string() => FieldShape::repeated("string"),
                TypeRef::Reference { name, inner, .. } => {
                    FieldShape::repeated(ctx.resolve_reference(name, *inner, origin, owner)?)
                }
                TypeRef::Array { .. } | TypeRef::TypeVariable { .. } => FieldShape::repeated("bytes"),
            },
            TypeRef::TypeVariable { .. } => FieldShape::single("bytes"),
        };
        Ok(shape)
    }

    /// Message type of the super field, queueing the ancestor.
    ///
    /// The resolved model's snapshot of the ancestor wins over the copy
    /// embedded in the child.
    fn ancestor_type(&self, ctx: &mut GenerationContext<'_>, embedded: &ClassModel) -> GenerateResult<String> {
        let ancestor = ctx
            .resolved_class(&embedded.qualified_name)
            .cloned()
            .unwrap_or_else(|| embedded.clone());
        if Self::is_skipped(&ancestor) {
            return Ok(ANY_TYPE.to_string());
        }
        let name = ctx.names.identifier(&ancestor.qualified_name, ancestor.is_inner)?;
        ctx.worklist.push_resolved(ancestor);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::AdditionalClassLoader;
    use crate::model::ResolvedClasses;

    fn synthesize_all(classes: &[ClassModel]) -> Vec<MessageDefinition> {
        let mut resolved = ResolvedClasses::default();
        for class in classes {
            resolved.insert(class);
        }
        let loader = AdditionalClassLoader::default();
        let mut ctx = GenerationContext::new(&resolved, &loader, "XService");

        for class in classes {
            ctx.worklist.push_resolved(class.clone());
        }
        while let Some(crate::worklist::Pending::Resolved(class)) = ctx.worklist.pop() {
            MessageSynthesizer.synthesize(&mut ctx, &class, None).unwrap();
        }
        ctx.messages
    }

    #[test]
    fn test_scalar_and_array_fields() {
        let class = ClassModel::new("a.Shapes")
            .with_field("i", TypeRef::primitive("int"))
            .with_field("l", TypeRef::boxed("Long"))
            .with_field("s", TypeRef::string())
            .with_field("raw", TypeRef::array(TypeRef::primitive("byte")))
            .with_field("flags", TypeRef::array(TypeRef::primitive("boolean")))
            .with_field("names", TypeRef::array(TypeRef::string()))
            .with_field("grid", TypeRef::array(TypeRef::array(TypeRef::primitive("int"))))
            .with_field("value", TypeRef::TypeVariable { name: "T".to_string() });

        let messages = synthesize_all(&[class]);
        let text = messages[0].to_string();
        assert!(text.contains("  int32 i = 1;\n"));
        assert!(text.contains("  int64 l = 2;\n"));
        assert!(text.contains("  string s = 3;\n"));
        assert!(text.contains("  bytes raw = 4;\n"));
        assert!(text.contains("  repeated bool flags = 5;\n"));
        assert!(text.contains("  repeated string names = 6;\n"));
        assert!(text.contains("  repeated bytes grid = 7;\n"));
        assert!(text.contains("  bytes value = 8;\n"));
    }

    #[test]
    fn test_reference_fields_are_followed() {
        let item = ClassModel::new("a.Item").with_field("n", TypeRef::primitive("int"));
        let holder = ClassModel::new("a.Holder")
            .with_field("first", TypeRef::reference("a.Item"))
            .with_field("all", TypeRef::array(TypeRef::reference("a.Item")))
            .with_field("when", TypeRef::reference("java.time.Instant"));

        let messages = synthesize_all(&[holder, item]);
        assert_eq!(messages.len(), 2);

        let holder = &messages[0];
        assert_eq!(holder.field("first").unwrap().ty, "a___Item");
        assert!(holder.field("all").unwrap().repeated);
        assert_eq!(holder.field("when").unwrap().ty, ANY_TYPE);
        assert_eq!(messages[1].name, "a___Item");
    }

    #[test]
    fn test_super_field_follows_fields() {
        let base = ClassModel::new("a.Base").with_field("s", TypeRef::string());
        let child = ClassModel::new("a.Child")
            .with_field("j", TypeRef::primitive("int"))
            .with_ancestor(base.clone());

        let messages = synthesize_all(&[child]);
        let child = &messages[0];
        assert_eq!(child.numbers(), vec![1, 2]);
        assert_eq!(child.field("base___super").unwrap().ty, "a___Base");
        assert_eq!(messages[1].name, "a___Base");
    }

    #[test]
    fn test_root_ancestor_adds_no_field() {
        let class = ClassModel::new("a.A").with_ancestor(ClassModel::new(ROOT_TYPE));
        let messages = synthesize_all(&[class]);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].fields.is_empty());
    }

    #[test]
    fn test_skip_rules() {
        assert!(MessageSynthesizer::is_skipped(&ClassModel::new("a.Api").as_interface()));
        assert!(MessageSynthesizer::is_skipped(&ClassModel::new("java.util.Date")));
        assert!(MessageSynthesizer::is_skipped(&ClassModel::new("java.lang.Integer")));
        assert!(MessageSynthesizer::is_skipped(&ClassModel::new(RESPONSE_CLASS)));
        assert!(!MessageSynthesizer::is_skipped(&ClassModel::new("a.Plain")));
    }

    #[test]
    fn test_cycle_terminates() {
        let a = ClassModel::new("a.A").with_field("b", TypeRef::reference("a.B"));
        let b = ClassModel::new("a.B").with_field("a", TypeRef::reference("a.A"));

        let messages = synthesize_all(&[a, b]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].field("b").unwrap().ty, "a___B");
        assert_eq!(messages[1].field("a").unwrap().ty, "a___A");
    }
}
