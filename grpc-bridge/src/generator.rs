//! Top-level orchestration of one generation run.

use crate::assembler::SchemaAssembler;
use crate::context::GenerationContext;
use crate::error::GenerateResult;
use crate::loader::{AdditionalClassLoader, AdditionalKey, ClassLoader};
use crate::model::{DeclarationUnit, ResolvedClasses};
use crate::resource::ResourceScanner;
use crate::schema::SchemaDocument;
use crate::synthesizer::MessageSynthesizer;
use crate::worklist::Pending;
use std::path::PathBuf;

/// Transport runtime package excluded from resource scanning by default.
pub const DEFAULT_EXCLUDED_PREFIX: &str = "grpc.server";

/// Options of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Target package; `-` becomes `.` in the schema package.
    pub package_name: String,
    /// Target class name, used for the service and outer class names.
    pub class_name: String,
    /// Qualified-name prefixes of classes never scanned for endpoints.
    pub excluded_prefixes: Vec<String>,
    /// Search roots for classes outside the resolved model.
    pub additional_roots: Vec<PathBuf>,
    /// Extra `<root>:<qualified name>` keys to synthesize.
    pub additional_classes: Vec<String>,
}

impl GeneratorOptions {
    pub fn new(package_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            class_name: class_name.into(),
            excluded_prefixes: vec![DEFAULT_EXCLUDED_PREFIX.to_string()],
            additional_roots: Vec::new(),
            additional_classes: Vec::new(),
        }
    }

    pub fn with_additional_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.additional_roots.push(root.into());
        self
    }

    pub fn with_additional_class(mut self, key: impl Into<String>) -> Self {
        self.additional_classes.push(key.into());
        self
    }

    /// Name of the generated service.
    pub fn service_name(&self) -> String {
        format!("{}Service", self.class_name)
    }
}

/// Generates a protobuf schema from resolved declaration units.
#[derive(Debug)]
pub struct ProtoGenerator {
    options: GeneratorOptions,
    loader: AdditionalClassLoader,
}

impl ProtoGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        let loader = AdditionalClassLoader::new(options.additional_roots.clone());
        Self { options, loader }
    }

    /// Replace the class loader behind the additional search roots.
    pub fn with_class_loader(mut self, loader: impl ClassLoader + 'static) -> Self {
        self.loader = AdditionalClassLoader::new(self.options.additional_roots.clone()).with_loader(loader);
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Run the generator over the units, in the given order.
    ///
    /// Any error aborts the run; no partial document is returned.
    #[tracing::instrument(skip_all, fields(class = %self.options.class_name, units = units.len()))]
    pub fn generate(&self, units: &[DeclarationUnit]) -> GenerateResult<SchemaDocument> {
        let resolved = ResolvedClasses::from_units(units);
        let mut ctx = GenerationContext::new(&resolved, &self.loader, self.options.service_name());

        for key in &self.options.additional_classes {
            ctx.worklist.push_on_demand(key.clone());
        }

        let scanner = ResourceScanner::new(self.options.excluded_prefixes.clone());
        for declared in units.iter().flat_map(|unit| &unit.classes) {
            scanner.scan(&mut ctx, declared)?;
        }

        self.drain(&mut ctx)?;

        tracing::info!(
            rpcs = ctx.service.rpcs.len(),
            messages = ctx.messages.len(),
            visited = ctx.worklist.visited_count(),
            "type graph closed"
        );

        let assembler = SchemaAssembler::new(&self.options.package_name, &self.options.class_name);
        Ok(assembler.assemble(ctx))
    }

    /// Drain the worklist until the transitive closure is reached.
    fn drain(&self, ctx: &mut GenerationContext<'_>) -> GenerateResult<()> {
        let synthesizer = MessageSynthesizer;
        while let Some(pending) = ctx.worklist.pop() {
            match pending {
                Pending::Resolved(class) => {
                    synthesizer.synthesize(ctx, &class, None)?;
                }
                Pending::OnDemand(raw) => {
                    let key = AdditionalKey::parse(&raw)?;
                    if ctx.worklist.is_visited(&key.qualified_name) {
                        tracing::trace!(key = %raw, "already visited");
                        continue;
                    }
                    let class = ctx.load_on_demand(&key)?;
                    synthesizer.synthesize(ctx, &class, Some(key.root.as_path()))?;
                }
            }
        }
        Ok(())
    }
}
