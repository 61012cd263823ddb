//! # grpc-bridge-cli
//!
//! CLI library for generating protobuf schemas from resolved Jakarta REST
//! declaration units.
//!
//! ## Architecture
//!
//! - [`config`] - `grpc-bridge.toml` loading and CLI overrides
//! - [`scanner`] - declaration file discovery and filtering
//! - [`parser`] - parallel decoding of declaration units
//! - [`generator`] - one generation run over the core crate
//! - [`writer`] - schema output and dry-run support
//! - [`error`] - error types and exit codes

pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod scanner;
pub mod writer;

pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use generator::{GeneratedOutput, SchemaGenerator};
pub use parser::DeclarationParser;
pub use scanner::{DeclarationFile, DeclarationScanner};
pub use writer::FileWriter;
