//! One generation run as the CLI sees it: scan, parse, synthesize, render.

use crate::config::Config;
use crate::error::CliResult;
use crate::parser::DeclarationParser;
use crate::scanner::DeclarationScanner;
use crate::writer::output_path;
use grpc_bridge::model::DeclarationUnit;
use grpc_bridge::ProtoGenerator;
use std::path::PathBuf;

/// Rendered schema plus what the progress output reports about it.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Complete schema text.
    pub content: String,

    /// Where the schema belongs.
    pub path: PathBuf,

    /// Number of rpcs in the service.
    pub rpcs: usize,

    /// Number of messages, envelopes included.
    pub messages: usize,
}

/// Runs the core generator with a CLI configuration.
pub struct SchemaGenerator {
    config: Config,
}

impl SchemaGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scan and decode every declaration unit under the input directory.
    ///
    /// Any invalid unit fails the whole load.
    pub fn load_units(&self, filter: Option<&str>) -> CliResult<Vec<DeclarationUnit>> {
        let mut scanner = DeclarationScanner::new(&self.config.input.dir);
        if let Some(pattern) = filter {
            scanner = scanner.with_filter(pattern)?;
        }
        let files = scanner.scan()?;
        DeclarationParser::new().parse_all(&files)
    }

    /// Synthesize and render the schema for `units`.
    pub fn generate(&self, units: &[DeclarationUnit]) -> CliResult<GeneratedOutput> {
        self.config.validate()?;

        let generator = ProtoGenerator::new(self.config.generator_options());
        let document = generator.generate(units)?;

        Ok(GeneratedOutput {
            content: document.render(),
            path: output_path(&self.config.output.dir, &self.config.target.class_name),
            rpcs: document.service.as_ref().map_or(0, |service| service.rpcs.len()),
            messages: document.messages.len() + 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CliError, GenerateError};
    use grpc_bridge::model::{Annotation, ClassModel, DeclaredClass, MethodModel, TypeRef};
    use std::path::Path;

    fn config(class_name: &str) -> Config {
        let mut config = Config::default();
        config.target.class_name = class_name.to_string();
        config.output.dir = PathBuf::from("out");
        config
    }

    #[test]
    fn test_generate_reports_counts() {
        let resource = DeclaredClass::new(ClassModel::new("dev.example.Greeter")).with_method(
            MethodModel::new("hello")
                .with_annotation(Annotation::marker("GET"))
                .returning(TypeRef::string()),
        );

        let output = SchemaGenerator::new(config("Greeter"))
            .generate(&[DeclarationUnit::new(vec![resource])])
            .unwrap();

        assert_eq!(output.rpcs, 1);
        assert_eq!(output.path, Path::new("out").join("proto").join("Greeter.proto"));
        assert!(output.messages > 2);
        assert!(output.content.contains("service GreeterService {"));
    }

    #[test]
    fn test_generate_surfaces_core_errors() {
        let resource = DeclaredClass::new(ClassModel::new("dev.example.Broken")).with_method(
            MethodModel::new("get")
                .with_annotation(Annotation::marker("GET"))
                .returning(TypeRef::reference("dev.example.Missing")),
        );

        let result = SchemaGenerator::new(config("Broken")).generate(&[DeclarationUnit::new(vec![resource])]);

        assert!(matches!(
            result,
            Err(CliError::Generate(GenerateError::UnresolvedReference { .. }))
        ));
    }

    #[test]
    fn test_generate_rejects_invalid_config() {
        let result = SchemaGenerator::new(config("")).generate(&[]);
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
