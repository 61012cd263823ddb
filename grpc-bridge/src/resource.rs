//! Discovery of remotely invocable resource methods.
//!
//! A method is an endpoint when it carries an HTTP verb annotation or a
//! `Path` annotation. A path-only method is a sub-resource locator. Each
//! endpoint becomes one rpc whose request is the entity envelope and whose
//! response is the return envelope (or a stream of events for server-sent
//! event endpoints).

use crate::context::GenerationContext;
use crate::error::GenerateResult;
use crate::model::{find_annotation, AnnotationValue, DeclaredClass, MethodModel, ParamModel, ReturnType, TypeRef};
use crate::naming::flatten;
use crate::schema::{RpcDefinition, ANY_TYPE};
use crate::type_mapper::TypeMapper;
use std::fmt;

/// Message name of the shared empty payload.
pub const EMPTY_TYPE: &str = "gEmpty";

/// Request type of every rpc.
pub const ENTITY_ENVELOPE: &str = "GeneralEntityMessage";

/// Response type of every non-streaming rpc.
pub const RETURN_ENVELOPE: &str = "GeneralReturnMessage";

/// Qualified name of the server-sent event class.
pub const SSE_EVENT_CLASS: &str = "dev.resteasy.grpc.bridge.runtime.sse.SseEvent";

/// Server-push media type.
const EVENT_STREAM: &str = "text/event-stream";

/// Parameter annotations marking request metadata rather than the entity.
const METADATA_ANNOTATIONS: &[&str] = &[
    "Context",
    "CookieParam",
    "HeaderParam",
    "MatrixParam",
    "PathParam",
    "QueryParam",
];

/// Message name of the server-sent event class.
pub fn sse_event_type() -> String {
    flatten(SSE_EVENT_CLASS, false)
}

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    /// Sub-resource locator (path only, no verb).
    Locator,
}

impl HttpMethod {
    /// Verbs in lookup order.
    pub const VERBS: [HttpMethod; 7] = [
        HttpMethod::Delete,
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Patch,
        HttpMethod::Post,
        HttpMethod::Put,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Delete => "DELETE",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Locator => "LOCATOR",
        }
    }

    /// First verb annotation on the method, or `Locator`.
    pub fn of(method: &MethodModel) -> Self {
        Self::VERBS
            .into_iter()
            .find(|verb| method.annotation(verb.as_str()).is_some())
            .unwrap_or(HttpMethod::Locator)
    }

    pub fn is_locator(&self) -> bool {
        matches!(self, HttpMethod::Locator)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a caller receives the result of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallStyle {
    Sync,
    /// Result delivered through a suspended async response.
    Suspended,
    /// Result delivered through an asynchronous-result wrapper.
    CompletionStage,
    /// Server-sent events.
    Streaming,
}

impl CallStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStyle::Sync => "sync",
            CallStyle::Suspended => "suspended",
            CallStyle::CompletionStage => "completionStage",
            CallStyle::Streaming => "sse",
        }
    }

    /// Whether the result arrives after the call returns.
    pub fn is_deferred(&self) -> bool {
        matches!(self, CallStyle::Suspended | CallStyle::CompletionStage)
    }

    /// Classify a method.
    pub fn of(method: &MethodModel) -> Self {
        if produces_event_stream(method) {
            CallStyle::Streaming
        } else if method
            .params
            .iter()
            .any(|p| find_annotation(&p.annotations, "Suspended").is_some())
        {
            CallStyle::Suspended
        } else if matches!(&method.return_type, Some(ReturnType::Type(ty)) if is_completion_stage(ty)) {
            CallStyle::CompletionStage
        } else {
            CallStyle::Sync
        }
    }
}

impl fmt::Display for CallStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remotely invocable method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method_name: String,
    pub http_method: HttpMethod,
    /// `classPath/methodPath`, or just the method path.
    pub path: String,
    /// Message name of the request payload.
    pub entity: String,
    /// Message name of the response payload.
    pub returns: String,
    pub call_style: CallStyle,
}

impl Endpoint {
    /// One-line summary rendered above the rpc.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.path, self.entity, self.returns, self.http_method, self.call_style
        )
    }

    /// The rpc declared for this endpoint.
    pub fn rpc(&self) -> RpcDefinition {
        let streaming = self.call_style == CallStyle::Streaming;
        RpcDefinition {
            name: self.method_name.clone(),
            request: ENTITY_ENVELOPE.to_string(),
            response: if streaming {
                sse_event_type()
            } else {
                RETURN_ENVELOPE.to_string()
            },
            streaming,
            summary: self.summary(),
        }
    }
}

/// Walks declared classes and turns their endpoints into rpcs.
#[derive(Debug, Clone, Default)]
pub struct ResourceScanner {
    excluded_prefixes: Vec<String>,
}

impl ResourceScanner {
    pub fn new(excluded_prefixes: Vec<String>) -> Self {
        Self { excluded_prefixes }
    }

    /// Check if a class is skipped as part of the transport runtime.
    pub fn is_excluded(&self, qualified_name: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    }

    /// Scan one class, appending an rpc per endpoint and queueing every class
    /// its endpoints reference.
    pub fn scan(&self, ctx: &mut GenerationContext<'_>, declared: &DeclaredClass) -> GenerateResult<Vec<Endpoint>> {
        let class_name = &declared.class.qualified_name;
        if self.is_excluded(class_name) {
            tracing::debug!(class = %class_name, "skipping transport runtime class");
            return Ok(Vec::new());
        }

        let class_path = path_of(find_annotation(&declared.annotations, "Path"));
        let mut endpoints = Vec::new();

        for method in declared.methods.iter().filter(|m| is_endpoint(m)) {
            let endpoint = self.endpoint(ctx, class_name, &class_path, method)?;
            tracing::debug!(
                class = %class_name,
                method = %endpoint.method_name,
                http_method = %endpoint.http_method,
                style = %endpoint.call_style,
                "endpoint"
            );

            ctx.add_entity_type(&endpoint.entity);
            ctx.add_return_type(&endpoint.returns);
            ctx.service.rpcs.push(endpoint.rpc());
            endpoints.push(endpoint);
        }

        Ok(endpoints)
    }

    fn endpoint(
        &self,
        ctx: &mut GenerationContext<'_>,
        class_name: &str,
        class_path: &str,
        method: &MethodModel,
    ) -> GenerateResult<Endpoint> {
        let method_path = path_of(method.annotation("Path"));
        if method_path.is_empty() && class_path.is_empty() {
            tracing::warn!(class = %class_name, method = %method.name, "no path, using an empty one");
        }
        let path = if class_path.is_empty() {
            method_path
        } else {
            format!("{class_path}/{method_path}")
        };

        let http_method = HttpMethod::of(method);
        let call_style = CallStyle::of(method);
        let entity = entity_type(ctx, class_name, method, http_method)?;
        let returns = return_type(ctx, class_name, method, http_method, call_style)?;

        Ok(Endpoint {
            method_name: method.name.clone(),
            http_method,
            path,
            entity,
            returns,
            call_style,
        })
    }
}

/// Check if a method carries a verb or a `Path` annotation.
pub fn is_endpoint(method: &MethodModel) -> bool {
    method.annotations.iter().any(|a| {
        let name = a.simple_name();
        name == "Path" || HttpMethod::VERBS.iter().any(|v| v.as_str().eq_ignore_ascii_case(name))
    })
}

fn path_of(annotation: Option<&crate::model::Annotation>) -> String {
    annotation
        .and_then(|a| a.first_literal())
        .unwrap_or_default()
        .to_string()
}

fn produces_event_stream(method: &MethodModel) -> bool {
    let Some(produces) = method.annotation("Produces") else {
        return false;
    };
    produces.values.iter().any(|value| match value {
        AnnotationValue::Literal(media) => media == EVENT_STREAM,
        AnnotationValue::Constant { owner, name } => {
            crate::model::simple_name(owner) == "MediaType" && name == "SERVER_SENT_EVENTS"
        }
    })
}

fn is_completion_stage(ty: &TypeRef) -> bool {
    matches!(ty, TypeRef::Reference { name, .. } if is_named(name, "CompletionStage", "java.util.concurrent"))
}

fn is_named(name: &str, simple: &str, package: &str) -> bool {
    name == simple || name.strip_prefix(package).and_then(|rest| rest.strip_prefix('.')) == Some(simple)
}

/// Whether a parameter carries the request entity.
fn is_entity(param: &ParamModel) -> bool {
    let metadata = param
        .annotations
        .iter()
        .any(|a| METADATA_ANNOTATIONS.contains(&a.simple_name()));
    let async_response = matches!(
        &param.ty,
        TypeRef::Reference { name, .. } if is_named(name, "AsyncResponse", "jakarta.ws.rs.container")
    );
    !metadata && !async_response
}

fn entity_type(
    ctx: &mut GenerationContext<'_>,
    class_name: &str,
    method: &MethodModel,
    http_method: HttpMethod,
) -> GenerateResult<String> {
    if http_method.is_locator() {
        return Ok(ANY_TYPE.to_string());
    }
    match method.params.iter().find(|p| is_entity(p)) {
        Some(param) => payload_type(ctx, class_name, &param.ty),
        None => {
            ctx.needs_empty = true;
            Ok(EMPTY_TYPE.to_string())
        }
    }
}

fn return_type(
    ctx: &mut GenerationContext<'_>,
    class_name: &str,
    method: &MethodModel,
    http_method: HttpMethod,
    call_style: CallStyle,
) -> GenerateResult<String> {
    if call_style == CallStyle::Suspended || http_method.is_locator() {
        return Ok(ANY_TYPE.to_string());
    }
    if call_style == CallStyle::Streaming {
        let sse = sse_event_type();
        ctx.has_streaming = true;
        return Ok(sse);
    }

    match &method.return_type {
        None => {
            ctx.needs_empty = true;
            Ok(EMPTY_TYPE.to_string())
        }
        Some(ReturnType::Void) => Ok(ANY_TYPE.to_string()),
        Some(ReturnType::Type(ty)) => {
            let ty = unwrap_generic(ty);
            if matches!(&ty, TypeRef::Reference { name, .. } if is_named(name, "Response", "jakarta.ws.rs.core")) {
                return Ok(ANY_TYPE.to_string());
            }
            payload_type(ctx, class_name, &ty)
        }
    }
}

/// Unwrap one level of generic wrapper.
///
/// An asynchronous-result wrapper yields its type argument; any other generic
/// type yields its raw type.
fn unwrap_generic(ty: &TypeRef) -> TypeRef {
    match ty {
        TypeRef::Reference { arguments, .. } if is_completion_stage(ty) => {
            arguments.first().cloned().unwrap_or(TypeRef::TypeVariable { name: String::new() })
        }
        TypeRef::Reference { name, inner, .. } => TypeRef::Reference {
            name: name.clone(),
            inner: *inner,
            arguments: Vec::new(),
        },
        other => other.clone(),
    }
}

/// Message name carrying a value of the given type through an envelope.
fn payload_type(ctx: &mut GenerationContext<'_>, class_name: &str, ty: &TypeRef) -> GenerateResult<String> {
    if let Some(scalar) = ty.scalar_name() {
        return Ok(TypeMapper::wrapper(scalar)?.to_string());
    }
    match ty {
        TypeRef::Reference { name, inner, .. } => ctx.resolve_reference(name, *inner, None, class_name),
        _ => Ok(ANY_TYPE.to_string()),
    }
}
