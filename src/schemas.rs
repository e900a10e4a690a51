//! Component schemas for a single resource.
//!
//! For a resource `pet` the builder emits, under `components.schemas`:
//!
//! | Key | Shape |
//! |-----|-------|
//! | `PetId`, `PetType` | id string, `type` enum |
//! | `PetAttributes` | the configured attribute map, closed |
//! | `PetGetResource` | id, type, attributes, relationships, links |
//! | `PetPostResource`, `PetPatchResource` | request shapes (when declared) |
//! | `PetResult`, `PetSetResult` | response documents |
//! | `PetPostBody`, `PetPatchBody` | request documents (when declared) |
//!
//! Attribute fragments live only in `PetAttributes`; every projection points
//! into it with a `$ref`.

use serde_json::{json, Map, Value};

use crate::config::{AttributeSelection, Operation, ResourceDef};
use crate::document::{
    fragment_escape, json_api_content, schema_ref, DocumentBuilder, META_SCHEMA,
    PAGINATION_LINKS_SCHEMA, SELF_LINK_SCHEMA,
};
use crate::error::GenerateError;
use crate::generate::Context;
use crate::names::ResourceNames;
use crate::relationships;

pub const ID: &str = "Id";
pub const TYPE: &str = "Type";
pub const ATTRIBUTES: &str = "Attributes";
pub const GET_RESOURCE: &str = "GetResource";
pub const POST_RESOURCE: &str = "PostResource";
pub const PATCH_RESOURCE: &str = "PatchResource";
pub const RESULT: &str = "Result";
pub const SET_RESULT: &str = "SetResult";
pub const POST_BODY: &str = "PostBody";
pub const PATCH_BODY: &str = "PatchBody";

/// Emit every schema a resource needs.
///
/// # Errors
///
/// Returns `GenerateError::DuplicateComponent` if another resource already
/// claimed one of this resource's keys.
pub fn build_resource_schemas(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    res: &ResourceNames,
    def: &ResourceDef,
) -> Result<(), GenerateError> {
    doc.insert_schema(res.schema(ID), json!({ "type": "string" }))?;
    doc.insert_schema(
        res.schema(TYPE),
        json!({ "type": "string", "enum": [res.name] }),
    )?;
    doc.insert_schema(res.schema(ATTRIBUTES), attributes_schema(def))?;

    let get_resource = resource_schema(doc, ctx, res, def, Operation::Get)?;
    doc.insert_schema(res.schema(GET_RESOURCE), get_resource)?;
    doc.insert_schema(res.schema(RESULT), result_schema(res))?;
    doc.insert_schema(res.schema(SET_RESULT), set_result_schema(res, def))?;

    for operation in [Operation::Post, Operation::PatchById] {
        if !def.declares(operation) {
            continue;
        }
        let resource = resource_schema(doc, ctx, res, def, operation)?;
        doc.insert_schema(resource_schema_name(res, operation)?, resource)?;

        let body_name = body_name(res, operation)?;
        doc.insert_schema(body_name.clone(), body_schema(res, operation)?)?;
        doc.insert_request_body(
            body_name.clone(),
            json!({
                "required": true,
                "content": json_api_content(schema_ref(&body_name))
            }),
        )?;
    }

    Ok(())
}

/// Key of the per-operation resource schema.
///
/// # Errors
///
/// Returns `GenerateError::UnexpectedOperation` for id-only operations
/// (`getById`, `deleteById`) which have no resource schema of their own.
pub fn resource_schema_name(
    res: &ResourceNames,
    operation: Operation,
) -> Result<String, GenerateError> {
    match operation {
        Operation::Get => Ok(res.schema(GET_RESOURCE)),
        Operation::Post => Ok(res.schema(POST_RESOURCE)),
        Operation::PatchById => Ok(res.schema(PATCH_RESOURCE)),
        other => Err(GenerateError::UnexpectedOperation {
            token: other.token().to_string(),
        }),
    }
}

/// Key of the request body schema (and request body component) for an operation.
///
/// # Errors
///
/// Returns `GenerateError::InvalidBodyType` unless `operation` is post or patchById.
pub fn body_name(res: &ResourceNames, operation: Operation) -> Result<String, GenerateError> {
    match operation {
        Operation::Post => Ok(res.schema(POST_BODY)),
        Operation::PatchById => Ok(res.schema(PATCH_BODY)),
        other => Err(GenerateError::InvalidBodyType {
            operation: other.token().to_string(),
        }),
    }
}

/// Request document: the operation's resource schema under `data`.
///
/// # Errors
///
/// Returns `GenerateError::InvalidBodyType` unless `operation` is post or patchById.
pub fn body_schema(res: &ResourceNames, operation: Operation) -> Result<Value, GenerateError> {
    let resource = match operation {
        Operation::Post => res.schema(POST_RESOURCE),
        Operation::PatchById => res.schema(PATCH_RESOURCE),
        other => {
            return Err(GenerateError::InvalidBodyType {
                operation: other.token().to_string(),
            })
        }
    };
    Ok(json!({
        "type": "object",
        "required": ["data"],
        "additionalProperties": false,
        "properties": { "data": schema_ref(&resource) }
    }))
}

/// Resource object shape for one of `get`, `post` or `patchById`.
///
/// # Errors
///
/// Returns `GenerateError::UnexpectedOperation` for other operations.
pub fn resource_schema(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    res: &ResourceNames,
    def: &ResourceDef,
    operation: Operation,
) -> Result<Value, GenerateError> {
    let mut properties = Map::new();
    properties.insert("id".into(), schema_ref(&res.schema(ID)));
    properties.insert("type".into(), schema_ref(&res.schema(TYPE)));

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));

    match operation {
        Operation::Get => {
            properties.insert(
                "attributes".into(),
                project_attributes(res, def, &def.get_attributes, &[]),
            );

            if !def.relationships.is_empty() {
                let mut relationships = Map::new();
                for (name, relationship) in &def.relationships {
                    relationships.insert(
                        name.clone(),
                        relationships::relationship_ref(doc, ctx, res, name, relationship)?,
                    );
                }
                properties.insert(
                    "relationships".into(),
                    json!({ "type": "object", "properties": relationships }),
                );
            }

            if def.self_links {
                properties.insert("links".into(), schema_ref(SELF_LINK_SCHEMA));
            }
        }
        Operation::Post => {
            let required = required_post_attributes(def);
            properties.insert(
                "attributes".into(),
                project_attributes(res, def, &def.post_attributes, &required),
            );
            schema.insert("required".into(), json!(["type", "attributes"]));
            schema.insert("additionalProperties".into(), json!(false));
        }
        Operation::PatchById => {
            properties.insert(
                "attributes".into(),
                project_attributes(res, def, &def.patch_attributes, &[]),
            );
            schema.insert("required".into(), json!(["type", "id"]));
            schema.insert("additionalProperties".into(), json!(false));
        }
        other => {
            return Err(GenerateError::UnexpectedOperation {
                token: other.token().to_string(),
            })
        }
    }

    schema.insert("properties".into(), Value::Object(properties));
    Ok(Value::Object(schema))
}

/// Project the attribute schema onto a selection.
///
/// `All` keeps a direct reference to `<Prefix>Attributes`; an explicit list
/// builds a closed object whose properties reference individual attributes.
/// Names missing from the attribute map are skipped rather than reported.
pub fn project_attributes(
    res: &ResourceNames,
    def: &ResourceDef,
    selection: &AttributeSelection,
    required: &[&str],
) -> Value {
    let attributes_name = res.schema(ATTRIBUTES);

    match selection {
        AttributeSelection::All => {
            let reference = schema_ref(&attributes_name);
            if required.is_empty() {
                reference
            } else {
                json!({ "allOf": [reference, { "required": required }] })
            }
        }
        AttributeSelection::Only(_) => {
            let selected = selection.resolve(&def.attributes);

            let mut properties = Map::new();
            for name in &selected {
                properties.insert(
                    (*name).to_string(),
                    json!({
                        "$ref": format!(
                            "#/components/schemas/{}/properties/{}",
                            attributes_name,
                            fragment_escape(name)
                        )
                    }),
                );
            }

            let mut schema = Map::new();
            schema.insert("type".into(), json!("object"));
            schema.insert("properties".into(), Value::Object(properties));
            let required: Vec<&str> = required
                .iter()
                .copied()
                .filter(|name| selected.contains(name))
                .collect();
            if !required.is_empty() {
                schema.insert("required".into(), json!(required));
            }
            schema.insert("additionalProperties".into(), json!(false));
            Value::Object(schema)
        }
    }
}

/// Attribute names a post body must carry, limited to known attributes.
pub fn required_post_attributes(def: &ResourceDef) -> Vec<&str> {
    def.required_post_attributes.resolve(&def.attributes)
}

// --- Internal implementation ---

fn attributes_schema(def: &ResourceDef) -> Value {
    json!({
        "type": "object",
        "properties": def.attributes,
        "additionalProperties": false
    })
}

fn result_schema(res: &ResourceNames) -> Value {
    json!({
        "type": "object",
        "required": ["data"],
        "properties": {
            "data": schema_ref(&res.schema(GET_RESOURCE)),
            "links": schema_ref(SELF_LINK_SCHEMA)
        }
    })
}

fn set_result_schema(res: &ResourceNames, def: &ResourceDef) -> Value {
    let data = json!({ "type": "array", "items": schema_ref(&res.schema(GET_RESOURCE)) });

    if def.paginate {
        json!({
            "type": "object",
            "required": ["data"],
            "properties": {
                "data": data,
                "links": {
                    "allOf": [schema_ref(SELF_LINK_SCHEMA), schema_ref(PAGINATION_LINKS_SCHEMA)]
                },
                "meta": schema_ref(META_SCHEMA)
            }
        })
    } else {
        json!({
            "type": "object",
            "required": ["data"],
            "properties": {
                "data": data,
                "links": schema_ref(SELF_LINK_SCHEMA)
            }
        })
    }
}
