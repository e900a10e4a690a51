//! Relationship linkage schemas, relationship results and relationship request bodies.
//!
//! All keys share the `<Owner><Target>Relationship` prefix, so two owners
//! pointing at the same target never collide. Schemas are created on first
//! use and reused afterwards, even when several relationships of one owner
//! map to the same (target, cardinality) pair. A key produced by two
//! different (owner, target) pairs is a `DuplicateComponent` error.

use serde_json::{json, Value};

use crate::config::Relationship;
use crate::document::{json_api_content, schema_ref, DocumentBuilder};
use crate::error::GenerateError;
use crate::generate::Context;
use crate::names::{self, ResourceNames};

/// `<Owner><Target>Relationship`
pub fn relationship_schema_name(owner: &ResourceNames, relationship: &Relationship) -> String {
    format!(
        "{}{}Relationship",
        owner.prefix,
        names::schema_prefix(&relationship.target)
    )
}

/// Name of the schema carried in `data`: the linkage for to-one, the
/// linkage array (`...Set`) for to-many. Also keys the relationship request body.
pub fn relationship_data_name(owner: &ResourceNames, relationship: &Relationship) -> String {
    let base = relationship_schema_name(owner, relationship);
    if relationship.is_to_many() {
        format!("{}Set", base)
    } else {
        base
    }
}

/// Ensure the `{type, id}` linkage schema exists and return its name.
pub fn relationship_schema(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    owner: &ResourceNames,
    relationship: &Relationship,
) -> Result<String, GenerateError> {
    let name = relationship_schema_name(owner, relationship);
    let target = &relationship.target;
    doc.claim_relationship(&name, owner.name, target)?;
    let known = ctx.config.resources.contains_key(target);

    let inserted = doc.ensure_schema(&name, || {
        let (type_schema, id_schema) = if known {
            let prefix = names::schema_prefix(target);
            (
                schema_ref(&format!("{}Type", prefix)),
                schema_ref(&format!("{}Id", prefix)),
            )
        } else {
            (
                json!({ "type": "string", "enum": [target] }),
                json!({ "type": "string" }),
            )
        };
        json!({
            "type": "object",
            "required": ["type", "id"],
            "additionalProperties": false,
            "properties": {
                "type": type_schema,
                "id": id_schema
            }
        })
    });

    if inserted && !known {
        tracing::warn!(
            owner = owner.name,
            target = %target,
            "relationship target is not a configured resource, inlining its linkage"
        );
    }
    Ok(name)
}

/// Result wrapper for a to-one relationship (`...RelationshipResult`).
pub fn relationship_result_schema(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    owner: &ResourceNames,
    relationship_name: &str,
    relationship: &Relationship,
) -> Result<String, GenerateError> {
    let linkage = relationship_schema(doc, ctx, owner, relationship)?;
    let name = format!("{}Result", linkage);
    doc.ensure_schema(&name, || {
        json!({
            "type": "object",
            "required": ["data"],
            "properties": {
                "data": nullable_ref(&linkage),
                "links": relationship_links(ctx.base_url, &owner.plural, relationship_name)
            }
        })
    });
    Ok(name)
}

/// Result wrapper for a to-many relationship (`...RelationshipSetResult`).
pub fn relationship_set_result_schema(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    owner: &ResourceNames,
    relationship_name: &str,
    relationship: &Relationship,
) -> Result<String, GenerateError> {
    let linkage = relationship_schema(doc, ctx, owner, relationship)?;
    let set = format!("{}Set", linkage);
    doc.ensure_schema(&set, || {
        json!({ "type": "array", "items": schema_ref(&linkage) })
    });

    let name = format!("{}Result", set);
    doc.ensure_schema(&name, || {
        json!({
            "type": "object",
            "required": ["data"],
            "properties": {
                "data": schema_ref(&set),
                "links": relationship_links(ctx.base_url, &owner.plural, relationship_name)
            }
        })
    });
    Ok(name)
}

/// Name of the (set) result schema for a relationship, creating it if needed.
pub fn relationship_result_name(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    owner: &ResourceNames,
    relationship_name: &str,
    relationship: &Relationship,
) -> Result<String, GenerateError> {
    if relationship.is_to_many() {
        relationship_set_result_schema(doc, ctx, owner, relationship_name, relationship)
    } else {
        relationship_result_schema(doc, ctx, owner, relationship_name, relationship)
    }
}

/// Reference embedded in a resource's `relationships` properties.
pub fn relationship_ref(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    owner: &ResourceNames,
    relationship_name: &str,
    relationship: &Relationship,
) -> Result<Value, GenerateError> {
    let name = relationship_result_name(doc, ctx, owner, relationship_name, relationship)?;
    Ok(schema_ref(&name))
}

/// Ensure the request body used by mutating relationship endpoints and return its key.
pub fn relationship_request_body(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    owner: &ResourceNames,
    relationship_name: &str,
    relationship: &Relationship,
) -> Result<String, GenerateError> {
    // The result schema also creates the linkage (and set) schemas the body points at.
    relationship_result_name(doc, ctx, owner, relationship_name, relationship)?;

    let name = relationship_data_name(owner, relationship);
    let data = if relationship.is_to_many() {
        schema_ref(&name)
    } else {
        nullable_ref(&name)
    };
    let description = if relationship.is_to_many() {
        format!("Resource identifiers of related {}", target_plural(ctx, relationship))
    } else {
        format!(
            "Resource identifier of the related {}, or null to clear it",
            relationship.target
        )
    };

    doc.ensure_request_body(&name, || {
        json!({
            "description": description,
            "required": true,
            "content": json_api_content(json!({
                "type": "object",
                "required": ["data"],
                "additionalProperties": false,
                "properties": { "data": data }
            }))
        })
    });
    Ok(name)
}

/// Plural of a relationship's target, or `<type>s` when the target is not configured.
pub fn target_plural(ctx: &Context<'_>, relationship: &Relationship) -> String {
    match ctx.config.resources.get(&relationship.target) {
        Some(def) => names::plural(&relationship.target, def),
        None => names::fallback_plural(&relationship.target),
    }
}

// --- Internal implementation ---

fn nullable_ref(name: &str) -> Value {
    json!({ "allOf": [schema_ref(name)], "nullable": true })
}

fn relationship_links(base_url: &str, plural: &str, relationship_name: &str) -> Value {
    let base = base_url.trim_end_matches('/');
    json!({
        "type": "object",
        "properties": {
            "self": {
                "type": "string",
                "format": "uri",
                "example": format!("{}/{}/1/relationships/{}", base, plural, relationship_name)
            },
            "related": {
                "type": "string",
                "format": "uri",
                "example": format!("{}/{}/1/{}", base, plural, relationship_name)
            }
        }
    })
}
