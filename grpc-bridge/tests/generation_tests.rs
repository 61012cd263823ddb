//! End-to-end generation tests over small class graphs.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use grpc_bridge::loader::JsonClassLoader;
use grpc_bridge::model::{
    Annotation, ClassModel, DeclarationUnit, DeclaredClass, MethodModel, ParamModel, TypeRef,
};
use grpc_bridge::schema::ANY_TYPE;
use grpc_bridge::{GenerateError, GeneratorOptions, ProtoGenerator, SchemaDocument};

const PACKAGE: &str = "io.grpc.examples";

fn generate(classes: Vec<DeclaredClass>) -> SchemaDocument {
    generate_with(GeneratorOptions::new(PACKAGE, "CC1"), classes)
}

fn generate_with(options: GeneratorOptions, classes: Vec<DeclaredClass>) -> SchemaDocument {
    ProtoGenerator::new(options)
        .generate(&[DeclarationUnit::new(classes)])
        .unwrap()
}

fn get(name: &str) -> MethodModel {
    MethodModel::new(name)
        .with_annotation(Annotation::marker("GET"))
        .with_annotation(Annotation::literal("Path", name))
}

fn resource(methods: Vec<MethodModel>) -> DeclaredClass {
    methods
        .into_iter()
        .fold(DeclaredClass::new(ClassModel::new("io.grpc.examples.CC1")), DeclaredClass::with_method)
}

fn write_class(root: &Path, class: &ClassModel) {
    let path = JsonClassLoader::class_path(root, &class.qualified_name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(class).unwrap()).unwrap();
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_entity_with_ancestor_and_string_return() {
    let cc3 = ClassModel::new("io.grpc.examples.CC3").with_field("s", TypeRef::string());
    let cc2 = ClassModel::new("io.grpc.examples.CC2")
        .with_field("j", TypeRef::primitive("int"))
        .with_ancestor(cc3);
    let m1 = get("m1")
        .with_param(ParamModel::new("cc2", TypeRef::reference("io.grpc.examples.CC2")))
        .returning(TypeRef::string());

    let document = generate(vec![resource(vec![m1]), DeclaredClass::new(cc2)]);

    let service = document.service.as_ref().unwrap();
    assert_eq!(service.name, "CC1Service");
    let rpc = service.rpc("m1").unwrap();
    assert_eq!(rpc.request, "GeneralEntityMessage");
    assert_eq!(rpc.response, "GeneralReturnMessage");
    assert!(!rpc.streaming);
    assert_eq!(rpc.summary, "m1 io_grpc_examples___CC2 gString GET sync");

    let cc2 = document.message("io_grpc_examples___CC2").unwrap();
    assert_eq!(cc2.field("j").unwrap().ty, "int32");
    assert_eq!(cc2.field("cC3___super").unwrap().ty, "io_grpc_examples___CC3");
    assert_eq!(cc2.numbers(), vec![1, 2]);

    let cc3 = document.message("io_grpc_examples___CC3").unwrap();
    assert_eq!(cc3.field("s").unwrap().ty, "string");

    assert_eq!(
        document.entity_envelope.branch_types(),
        vec!["io_grpc_examples___CC2", "FormMap"]
    );
    assert_eq!(document.return_envelope.branch_types(), vec!["gString"]);

    let text = document.render();
    assert!(text.starts_with("syntax = \"proto3\";\npackage io.grpc.examples;\n"));
    assert!(text.contains("  // m1 io_grpc_examples___CC2 gString GET sync\n"));
    assert!(text.contains("  rpc m1 (GeneralEntityMessage) returns (GeneralReturnMessage);\n"));
    assert!(text.contains("    io_grpc_examples___CC2 io_grpc_examples___CC2_field = 6;\n"));
    assert!(text.contains("    FormMap form_field = 7;\n"));
    assert!(text.contains("    gString gString_field = 4;\n"));
}

#[test]
fn test_empty_message_is_shared() {
    let document = generate(vec![resource(vec![
        get("first").returning_void(),
        get("second"),
        get("third").returning_void(),
    ])]);

    assert_eq!(document.count_messages("gEmpty"), 1);
    assert_eq!(document.entity_envelope.branch_types(), vec!["gEmpty", "FormMap"]);
    assert_eq!(document.return_envelope.branch_types(), vec![ANY_TYPE, "gEmpty"]);
    assert!(document.render().contains("message gEmpty {}\n"));
}

#[test]
fn test_server_sent_events_stream() {
    let events = get("events")
        .with_annotation(Annotation::constant("Produces", "MediaType", "SERVER_SENT_EVENTS"))
        .returning_void();
    let document = generate(vec![resource(vec![events])]);

    let rpc = document.service.as_ref().unwrap().rpc("events").unwrap();
    assert!(rpc.streaming);
    assert_eq!(rpc.response, "dev_resteasy_grpc_bridge_runtime_sse___SseEvent");
    assert!(document
        .render()
        .contains("rpc events (GeneralEntityMessage) returns (stream dev_resteasy_grpc_bridge_runtime_sse___SseEvent);"));

    assert_eq!(document.count_messages("dev_resteasy_grpc_bridge_runtime_sse___SseEvent"), 1);
    assert!(document
        .return_envelope
        .branch_types()
        .contains(&"dev_resteasy_grpc_bridge_runtime_sse___SseEvent"));
}

#[test]
fn test_mutual_references_terminate() {
    let a = ClassModel::new("g.A").with_field("b", TypeRef::reference("g.B"));
    let b = ClassModel::new("g.B")
        .with_field("a", TypeRef::reference("g.A"))
        .with_field("self_ref", TypeRef::reference("g.B"));
    let m = get("m").with_param(ParamModel::new("a", TypeRef::reference("g.A")));

    let document = generate(vec![resource(vec![m]), DeclaredClass::new(a), DeclaredClass::new(b)]);

    assert_eq!(document.count_messages("g___A"), 1);
    assert_eq!(document.count_messages("g___B"), 1);
    assert_eq!(document.message("g___A").unwrap().field("b").unwrap().ty, "g___B");
    assert_eq!(document.message("g___B").unwrap().field("a").unwrap().ty, "g___A");
}

#[test]
fn test_inheritance_chain_is_flattened_one_level_at_a_time() {
    let c = ClassModel::new("h.C").with_field("c", TypeRef::primitive("long"));
    let b = ClassModel::new("h.B").with_ancestor(c);
    let a = ClassModel::new("h.A").with_field("a", TypeRef::primitive("int")).with_ancestor(b);
    let m = get("m").returning(TypeRef::reference("h.A"));

    let document = generate(vec![resource(vec![m]), DeclaredClass::new(a)]);

    let a = document.message("h___A").unwrap();
    assert_eq!(a.fields.len(), 2);
    assert_eq!(a.field("b___super").unwrap().ty, "h___B");
    assert!(a.fields.iter().all(|f| f.ty != "h___C"));

    let b = document.message("h___B").unwrap();
    assert_eq!(b.fields.len(), 1);
    assert_eq!(b.field("c___super").unwrap().ty, "h___C");
    assert_eq!(b.field("c___super").unwrap().number, 1);

    assert!(document.message("h___C").is_some());
}

#[test]
fn test_ancestor_uses_resolved_snapshot() {
    let base = ClassModel::new("h.Base").with_field("current", TypeRef::primitive("int"));
    let stale = ClassModel::new("h.Base").with_field("stale", TypeRef::primitive("int"));
    let child = ClassModel::new("h.Child").with_ancestor(stale);
    let m = get("m").returning(TypeRef::reference("h.Child"));

    let document = generate(vec![
        resource(vec![m]),
        DeclaredClass::new(base),
        DeclaredClass::new(child),
    ]);

    let base = document.message("h___Base").unwrap();
    assert!(base.field("current").is_some());
    assert!(base.field("stale").is_none());
    assert_eq!(document.count_messages("h___Base"), 1);
}

#[test]
fn test_default_package_class_does_not_shadow_fixed_messages() {
    let form_map = ClassModel::new("FormMap").with_field("n", TypeRef::primitive("int"));
    let m = get("m").with_param(ParamModel::new("f", TypeRef::reference("FormMap")));

    let document = generate(vec![resource(vec![m]), DeclaredClass::new(form_map)]);

    assert_eq!(document.count_messages("FormMap"), 1);
    let branches = document.entity_envelope.branch_types();
    assert_eq!(branches.len(), 2);
    assert!(branches[0].starts_with("FormMap_h"));
    assert_eq!(branches[1], "FormMap");
    assert!(document.message(branches[0]).unwrap().field("n").is_some());
}

#[test]
fn test_union_deduplicates_by_name() {
    let item = ClassModel::new("u.Item");
    let methods = vec![
        get("a").with_param(ParamModel::new("i", TypeRef::reference("u.Item"))),
        get("b").with_param(ParamModel::new("i", TypeRef::reference("u.Item"))),
        get("c").with_param(ParamModel::new("n", TypeRef::primitive("int"))),
        get("d").with_param(ParamModel::new("n", TypeRef::boxed("Integer"))),
    ];
    let document = generate(vec![resource(methods), DeclaredClass::new(item)]);

    assert_eq!(
        document.entity_envelope.branch_types(),
        vec!["u___Item", "gInteger", "FormMap"]
    );
}

#[test]
fn test_generic_and_async_returns() {
    let payload = ClassModel::new("v.Payload");
    let methods = vec![
        get("stage").returning(TypeRef::generic(
            "java.util.concurrent.CompletionStage",
            vec![TypeRef::reference("v.Payload")],
        )),
        get("response").returning(TypeRef::reference("jakarta.ws.rs.core.Response")),
        get("list").returning(TypeRef::generic("java.util.List", vec![TypeRef::string()])),
    ];
    let document = generate(vec![resource(methods), DeclaredClass::new(payload)]);

    let service = document.service.as_ref().unwrap();
    assert_eq!(service.rpc("stage").unwrap().summary, "stage gEmpty v___Payload GET completionStage");
    assert_eq!(service.rpc("response").unwrap().summary, format!("response gEmpty {ANY_TYPE} GET sync"));
    assert_eq!(service.rpc("list").unwrap().summary, format!("list gEmpty {ANY_TYPE} GET sync"));
    assert!(document.message("v___Payload").is_some());
}

#[test]
fn test_inner_class_naming() {
    let inner = ClassModel::new("w.Outer.Inner").as_inner();
    let m = get("m").with_param(ParamModel::new("i", TypeRef::inner("w.Outer.Inner")));
    let document = generate(vec![resource(vec![m]), DeclaredClass::new(inner)]);

    assert!(document.message("w_Outer_INNER_Inner").is_some());
}

#[test]
fn test_transport_runtime_classes_are_not_scanned() {
    let bridge = DeclaredClass::new(ClassModel::new("grpc.server.CC1_Server")).with_method(get("internal"));
    let document = generate(vec![bridge]);
    assert!(document.service.is_none());
}

#[test]
fn test_output_is_deterministic() {
    let build = || {
        let mut classes = vec![resource(vec![
            get("a").with_param(ParamModel::new("x", TypeRef::reference("d.X"))),
            get("b").returning(TypeRef::reference("d.Y")),
        ])];
        classes.push(DeclaredClass::new(
            ClassModel::new("d.X").with_field("y", TypeRef::reference("d.Y")),
        ));
        classes.push(DeclaredClass::new(ClassModel::new("d.Y")));
        generate(classes).render()
    };
    assert_eq!(build(), build());
}

// =============================================================================
// Additional class loading
// =============================================================================

#[test]
fn test_classes_outside_model_are_loaded_from_roots() {
    let root = TempDir::new().unwrap();
    write_class(
        root.path(),
        &ClassModel::new("x.Extra")
            .with_field("other", TypeRef::reference("x.Other"))
            .with_field("n", TypeRef::primitive("int")),
    );
    write_class(root.path(), &ClassModel::new("x.Other").with_field("back", TypeRef::reference("x.Extra")));

    let options = GeneratorOptions::new(PACKAGE, "CC1").with_additional_root(root.path());
    let m = get("m").with_param(ParamModel::new("e", TypeRef::reference("x.Extra")));
    let document = generate_with(options, vec![resource(vec![m])]);

    assert_eq!(document.count_messages("x___Extra"), 1);
    assert_eq!(document.count_messages("x___Other"), 1);
    assert_eq!(document.message("x___Other").unwrap().field("back").unwrap().ty, "x___Extra");
}

#[test]
fn test_configured_additional_class_is_synthesized() {
    let root = TempDir::new().unwrap();
    write_class(root.path(), &ClassModel::new("x.Seed").with_field("s", TypeRef::string()));

    let key = format!("{}:x.Seed", root.path().display());
    let options = GeneratorOptions::new(PACKAGE, "CC1").with_additional_class(key);
    let document = generate_with(options, Vec::new());

    assert!(document.message("x___Seed").is_some());
}

#[test]
fn test_missing_on_demand_class_aborts() {
    let root = TempDir::new().unwrap();
    write_class(root.path(), &ClassModel::new("x.Extra").with_field("gone", TypeRef::reference("x.Gone")));

    let options = GeneratorOptions::new(PACKAGE, "CC1").with_additional_root(root.path());
    let m = get("m").with_param(ParamModel::new("e", TypeRef::reference("x.Extra")));
    let err = ProtoGenerator::new(options)
        .generate(&[DeclarationUnit::new(vec![resource(vec![m])])])
        .unwrap_err();

    assert!(matches!(err, GenerateError::Load(ref e) if e.is_not_found()));
}

#[test]
fn test_on_demand_class_already_in_model_is_not_loaded() {
    let root = TempDir::new().unwrap();
    let shared = ClassModel::new("x.Shared").with_field("n", TypeRef::primitive("int"));
    let key = format!("{}:x.Shared", root.path().display());

    // No file exists under the root; the resolved class wins.
    let options = GeneratorOptions::new(PACKAGE, "CC1").with_additional_class(key);
    let m = get("m").with_param(ParamModel::new("s", TypeRef::reference("x.Shared")));
    let document = generate_with(options, vec![resource(vec![m]), DeclaredClass::new(shared)]);

    assert_eq!(document.count_messages("x___Shared"), 1);
}

#[test]
fn test_skipped_on_demand_classes_render_as_any() {
    let root = TempDir::new().unwrap();
    write_class(
        root.path(),
        &ClassModel::new("x.Extra")
            .with_field("api", TypeRef::reference("x.Api"))
            .with_field("count", TypeRef::reference("x.Integer")),
    );
    write_class(root.path(), &ClassModel::new("x.Api").as_interface());
    write_class(root.path(), &ClassModel::new("x.Integer"));

    let options = GeneratorOptions::new(PACKAGE, "CC1").with_additional_root(root.path());
    let m = MethodModel::new("m")
        .with_annotation(Annotation::marker("POST"))
        .with_param(ParamModel::new("e", TypeRef::reference("x.Extra")));
    let document = generate_with(options, vec![resource(vec![m])]);

    let extra = document.message("x___Extra").unwrap();
    assert_eq!(extra.field("api").unwrap().ty, ANY_TYPE);
    assert_eq!(extra.field("count").unwrap().ty, ANY_TYPE);
    assert!(document.message("x___Api").is_none());
    assert!(document.message("x___Integer").is_none());
}
