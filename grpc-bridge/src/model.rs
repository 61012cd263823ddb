//! Resolved object model consumed by the generator.
//!
//! These types are produced by an external resolution step (a source parser
//! with a symbol solver) and are read-only to the generator. They deserialize
//! from JSON so that resolution can happen in a separate process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Qualified name of the platform root type.
pub const ROOT_TYPE: &str = "java.lang.Object";

/// Package prefixes of the platform's built-in namespace.
pub const PLATFORM_PREFIXES: &[&str] = &["java.", "javax."];

/// Return the simple name of a possibly qualified name.
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Check if a qualified name lives in the platform's built-in namespace.
pub fn is_platform_name(qualified_name: &str) -> bool {
    PLATFORM_PREFIXES
        .iter()
        .any(|prefix| qualified_name.starts_with(prefix))
}

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// Primitive type (`int`, `boolean`, ...).
    Primitive { name: String },

    /// Boxed primitive (`Integer`, `java.lang.Long`, ...).
    Boxed { name: String },

    /// Array of some element type.
    Array { element: Box<TypeRef> },

    /// Reference to a declared class.
    Reference {
        name: String,
        #[serde(default)]
        inner: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<TypeRef>,
    },

    /// Unresolved type variable (`T`).
    TypeVariable {
        #[serde(default)]
        name: String,
    },
}

impl TypeRef {
    /// Create a primitive type.
    pub fn primitive(name: impl Into<String>) -> Self {
        TypeRef::Primitive { name: name.into() }
    }

    /// Create a boxed primitive type.
    pub fn boxed(name: impl Into<String>) -> Self {
        TypeRef::Boxed { name: name.into() }
    }

    /// Create an array of the given element type.
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
        }
    }

    /// Create a reference to a top-level class.
    pub fn reference(name: impl Into<String>) -> Self {
        TypeRef::Reference {
            name: name.into(),
            inner: false,
            arguments: Vec::new(),
        }
    }

    /// Create a reference to an inner class.
    pub fn inner(name: impl Into<String>) -> Self {
        TypeRef::Reference {
            name: name.into(),
            inner: true,
            arguments: Vec::new(),
        }
    }

    /// Create a generic reference with type arguments.
    pub fn generic(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        TypeRef::Reference {
            name: name.into(),
            inner: false,
            arguments,
        }
    }

    /// Create the string type.
    pub fn string() -> Self {
        Self::reference("java.lang.String")
    }

    /// Check if this is the string type.
    pub fn is_string(&self) -> bool {
        matches!(self, TypeRef::Reference { name, .. } if name == "String" || name == "java.lang.String")
    }

    /// Name to look up in the scalar tables, if this type is scalar-like.
    pub fn scalar_name(&self) -> Option<&str> {
        match self {
            TypeRef::Primitive { name } | TypeRef::Boxed { name } => Some(name),
            TypeRef::Reference { .. } if self.is_string() => Some("String"),
            _ => None,
        }
    }

    /// Human readable rendering for logs and errors.
    pub fn describe(&self) -> String {
        match self {
            TypeRef::Primitive { name } | TypeRef::Boxed { name } => name.clone(),
            TypeRef::Array { element } => format!("{}[]", element.describe()),
            TypeRef::Reference {
                name, arguments, ..
            } => {
                if arguments.is_empty() {
                    name.clone()
                } else {
                    let args: Vec<String> = arguments.iter().map(TypeRef::describe).collect();
                    format!("{}<{}>", name, args.join(", "))
                }
            }
            TypeRef::TypeVariable { name } => name.clone(),
        }
    }
}

/// A declared field of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldModel {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl FieldModel {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Immutable snapshot of a resolved class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassModel {
    /// Fully qualified name; the identity of the class.
    pub qualified_name: String,

    /// Package of the class.
    #[serde(default)]
    pub package_name: String,

    #[serde(default)]
    pub is_interface: bool,

    /// Whether the class is nested inside another class.
    #[serde(default)]
    pub is_inner: bool,

    /// Declared fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldModel>,

    /// Direct ancestor, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor: Option<Box<ClassModel>>,
}

impl ClassModel {
    /// Create a top-level class with no fields.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let package_name = qualified_name
            .rsplit_once('.')
            .map(|(package, _)| package.to_string())
            .unwrap_or_default();
        Self {
            qualified_name,
            package_name,
            is_interface: false,
            is_inner: false,
            fields: Vec::new(),
            ancestor: None,
        }
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldModel::new(name, ty));
        self
    }

    /// Set the direct ancestor.
    pub fn with_ancestor(mut self, ancestor: ClassModel) -> Self {
        self.ancestor = Some(Box::new(ancestor));
        self
    }

    /// Mark the class as nested.
    pub fn as_inner(mut self) -> Self {
        self.is_inner = true;
        self
    }

    /// Mark the class as an interface.
    pub fn as_interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    /// Simple (unqualified) class name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }

    /// Package of the class, derived from the qualified name when unset.
    pub fn package(&self) -> &str {
        if self.package_name.is_empty() {
            self.qualified_name
                .rsplit_once('.')
                .map_or("", |(package, _)| package)
        } else {
            &self.package_name
        }
    }
}

/// A value carried by an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    /// A string literal.
    Literal(String),

    /// A reference to a named constant, such as `MediaType.SERVER_SENT_EVENTS`.
    Constant { owner: String, name: String },
}

/// An annotation on a class, method or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation name, simple or qualified.
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<AnnotationValue>,
}

impl Annotation {
    /// Create a marker annotation.
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Create an annotation with a single literal value.
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: vec![AnnotationValue::Literal(value.into())],
        }
    }

    /// Create an annotation whose value references a constant.
    pub fn constant(name: impl Into<String>, owner: impl Into<String>, constant: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: vec![AnnotationValue::Constant {
                owner: owner.into(),
                name: constant.into(),
            }],
        }
    }

    /// Simple name of the annotation.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Check the annotation's simple name.
    pub fn is(&self, simple: &str) -> bool {
        self.simple_name() == simple
    }

    /// First literal value, if any.
    pub fn first_literal(&self) -> Option<&str> {
        self.values.iter().find_map(|value| match value {
            AnnotationValue::Literal(s) => Some(s.as_str()),
            AnnotationValue::Constant { .. } => None,
        })
    }
}

/// Find an annotation by simple name.
pub fn find_annotation<'a>(annotations: &'a [Annotation], simple: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.is(simple))
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamModel {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ParamModel {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Declared return of a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Void,
    Type(TypeRef),
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodModel {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamModel>,

    /// `None` when the declaration carries no return type at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ReturnType>,
}

impl MethodModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            params: Vec::new(),
            return_type: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_param(mut self, param: ParamModel) -> Self {
        self.params.push(param);
        self
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ReturnType::Type(ty));
        self
    }

    pub fn returning_void(mut self) -> Self {
        self.return_type = Some(ReturnType::Void);
        self
    }

    /// Find an annotation on the method by simple name.
    pub fn annotation(&self, simple: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, simple)
    }
}

/// A class together with its annotations and methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredClass {
    pub class: ClassModel,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodModel>,
}

impl DeclaredClass {
    pub fn new(class: ClassModel) -> Self {
        Self {
            class,
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_method(mut self, method: MethodModel) -> Self {
        self.methods.push(method);
        self
    }
}

/// The declarations of one independently resolved source unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationUnit {
    #[serde(default)]
    pub classes: Vec<DeclaredClass>,
}

impl DeclarationUnit {
    pub fn new(classes: Vec<DeclaredClass>) -> Self {
        Self { classes }
    }
}

/// Arena of every class the resolution step supplied, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct ResolvedClasses {
    classes: HashMap<String, ClassModel>,
}

impl ResolvedClasses {
    /// Build the arena from declaration units, including embedded ancestors.
    pub fn from_units(units: &[DeclarationUnit]) -> Self {
        let mut resolved = Self::default();
        for unit in units {
            for declared in &unit.classes {
                resolved.insert(&declared.class);
            }
        }
        resolved
    }

    /// Insert a class and its ancestor chain; the first snapshot of a name wins.
    pub fn insert(&mut self, class: &ClassModel) {
        let mut current = Some(class);
        while let Some(class) = current {
            self.classes
                .entry(class.qualified_name.clone())
                .or_insert_with(|| class.clone());
            current = class.ancestor.as_deref();
        }
    }

    pub fn get(&self, qualified_name: &str) -> Option<&ClassModel> {
        self.classes.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.classes.contains_key(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
