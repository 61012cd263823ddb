//! Final assembly of the schema document.
//!
//! Runs once both worklists are drained. Message order in the output is:
//! discovered classes, the server-sent event message (if any endpoint
//! streams), the shared empty message (if needed), scalar wrappers, the
//! fixed request/response metadata messages, and finally the two envelopes.

use crate::context::GenerationContext;
use crate::naming::branch_field_name;
use crate::resource::{sse_event_type, EMPTY_TYPE, ENTITY_ENVELOPE, RETURN_ENVELOPE};
use crate::schema::{MessageDefinition, SchemaDocument, SchemaHeader, ANY_TYPE, TIMESTAMP_TYPE};
use crate::type_mapper::WRAPPERS;

/// Builds the schema document from a drained generation context.
#[derive(Debug, Clone)]
pub struct SchemaAssembler {
    header: SchemaHeader,
}

impl SchemaAssembler {
    pub fn new(package_name: &str, class_name: &str) -> Self {
        Self {
            header: SchemaHeader::new(package_name, class_name),
        }
    }

    pub fn assemble(&self, ctx: GenerationContext<'_>) -> SchemaDocument {
        let GenerationContext {
            mut messages,
            mut entity_types,
            mut return_types,
            needs_empty,
            has_streaming,
            service,
            ..
        } = ctx;

        if has_streaming {
            messages.push(sse_event_message());
        }

        if needs_empty {
            messages.push(MessageDefinition::builder(EMPTY_TYPE).build());
            entity_types.insert(EMPTY_TYPE.to_string());
            return_types.insert(EMPTY_TYPE.to_string());
        }

        messages.extend(wrapper_messages());
        messages.extend(metadata_messages());

        let entity_envelope = entity_types
            .iter()
            .fold(
                MessageDefinition::builder(ENTITY_ENVELOPE)
                    .field("ServletInfo", "servletInfo")
                    .field("string", "URL")
                    .field("map<string, gHeader>", "headers")
                    .repeated("gCookie", "cookies")
                    .field("string", "httpMethod")
                    .oneof("messageType"),
                |builder, ty| builder.branch(ty.as_str(), branch_field_name(ty)),
            )
            .branch("FormMap", "form_field")
            .build();

        let return_envelope = return_types
            .iter()
            .fold(
                MessageDefinition::builder(RETURN_ENVELOPE)
                    .field("map<string, gHeader>", "headers")
                    .repeated("gNewCookie", "cookies")
                    .field("gInteger", "status")
                    .oneof("messageType"),
                |builder, ty| builder.branch(ty.as_str(), branch_field_name(ty)),
            )
            .build();

        tracing::debug!(
            messages = messages.len(),
            rpcs = service.rpcs.len(),
            entity_branches = entity_types.len(),
            return_branches = return_types.len(),
            "assembled schema"
        );

        SchemaDocument {
            header: self.header.clone(),
            service: (!service.rpcs.is_empty()).then_some(service),
            messages,
            entity_envelope,
            return_envelope,
        }
    }
}

fn sse_event_message() -> MessageDefinition {
    MessageDefinition::builder(sse_event_type())
        .field("string", "comment")
        .field("string", "id")
        .field("string", "name")
        .field(ANY_TYPE, "data")
        .field("int64", "reconnectDelay")
        .build()
}

/// Names of the messages emitted regardless of the class graph.
pub fn fixed_message_names() -> impl Iterator<Item = &'static str> {
    WRAPPERS
        .iter()
        .map(|w| w.message)
        .chain(METADATA_MESSAGES.iter().copied())
        .chain([EMPTY_TYPE, ENTITY_ENVELOPE, RETURN_ENVELOPE])
}

const METADATA_MESSAGES: &[&str] = &["gHeader", "gCookie", "gNewCookie", "ServletInfo", "FormValues", "FormMap"];

/// One `{ <scalar> value = 1; }` message per wrapper, in table order.
pub fn wrapper_messages() -> impl Iterator<Item = MessageDefinition> {
    WRAPPERS
        .iter()
        .map(|w| MessageDefinition::builder(w.message).field(w.scalar, "value").build())
}

/// Header, cookie, connection and form messages used by the envelopes.
pub fn metadata_messages() -> Vec<MessageDefinition> {
    vec![
        MessageDefinition::builder("gHeader")
            .repeated("string", "values")
            .build(),
        MessageDefinition::builder("gCookie")
            .field("string", "name")
            .field("string", "value")
            .field("int32", "version")
            .field("string", "path")
            .field("string", "domain")
            .build(),
        MessageDefinition::builder("gNewCookie")
            .enumeration("SameSite", &[("NONE", 0), ("LAX", 1), ("STRICT", 2)])
            .field("string", "name")
            .field("string", "value")
            .field("int32", "version")
            .field("string", "path")
            .field("string", "domain")
            .field("string", "comment")
            .field("int32", "maxAge")
            .field(TIMESTAMP_TYPE, "expiry")
            .field("bool", "secure")
            .field("bool", "httpOnly")
            .field("SameSite", "sameSite")
            .build(),
        MessageDefinition::builder("ServletInfo")
            .field("string", "characterEncoding")
            .field("string", "clientAddress")
            .field("string", "clientHost")
            .field("int32", "clientPort")
            .build(),
        MessageDefinition::builder("FormValues")
            .repeated("string", "formValues_field")
            .build(),
        MessageDefinition::builder("FormMap")
            .field("map<string, FormValues>", "formMap_field")
            .build(),
    ]
}
