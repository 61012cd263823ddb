//! # grpc-bridge
//!
//! Synthesizes a flat protobuf schema from a resolved Jakarta REST class graph.
//!
//! The input is an already-resolved object model: classes with their fields,
//! ancestors, annotations and methods. The output is one `.proto` document
//! holding a service with an rpc per resource method, a message per class
//! reachable from those methods, scalar wrapper messages, and two envelope
//! messages whose `oneof` carries every request and response payload.
//!
//! ## Architecture
//!
//! - [`resource`] - finds endpoints and classifies their call style
//! - [`worklist`] - deduplicating queue driving the type-graph closure
//! - [`synthesizer`] - turns one class into one message
//! - [`loader`] - on-demand loading of classes outside the resolved model
//! - [`assembler`] - wrappers, metadata messages and envelopes
//! - [`naming`] / [`type_mapper`] - identifiers and scalar tables
//! - [`schema`] - the document model and its text rendering
//!
//! ## Example
//!
//! ```
//! use grpc_bridge::{GeneratorOptions, ProtoGenerator};
//! use grpc_bridge::model::{Annotation, ClassModel, DeclarationUnit, DeclaredClass, MethodModel, TypeRef};
//!
//! let resource = DeclaredClass::new(ClassModel::new("dev.example.Greeter"))
//!     .with_annotation(Annotation::literal("Path", "greet"))
//!     .with_method(
//!         MethodModel::new("hello")
//!             .with_annotation(Annotation::marker("GET"))
//!             .returning(TypeRef::string()),
//!     );
//!
//! let generator = ProtoGenerator::new(GeneratorOptions::new("dev.example", "Greeter"));
//! let document = generator.generate(&[DeclarationUnit::new(vec![resource])]).unwrap();
//!
//! let text = document.render();
//! assert!(text.contains("service GreeterService {"));
//! assert!(text.contains("rpc hello (GeneralEntityMessage) returns (GeneralReturnMessage);"));
//! ```

pub mod assembler;
pub mod context;
pub mod error;
pub mod generator;
pub mod loader;
pub mod model;
pub mod naming;
pub mod resource;
pub mod schema;
pub mod synthesizer;
pub mod type_mapper;
pub mod worklist;

pub use error::{GenerateError, GenerateResult, LoadError};
pub use generator::{GeneratorOptions, ProtoGenerator};
pub use loader::{AdditionalClassLoader, ClassLoader, JsonClassLoader};
pub use schema::SchemaDocument;
