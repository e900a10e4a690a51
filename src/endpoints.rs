//! Path items for resource operations and relationship sub-endpoints.

use serde_json::{json, Map, Value};

use crate::config::{FilterOperator, Operation, Relationship, ResourceDef};
use crate::document::{
    json_api_content, parameter_ref, request_body_ref, response_ref, schema_ref,
    DocumentBuilder, DELETED_RESPONSE, INTERNAL_ERROR_RESPONSE, NOT_FOUND_RESPONSE,
    PAGE_NUMBER_PARAMETER, PAGE_SIZE_PARAMETER, PATCH_CONFLICT_RESPONSE,
    POST_CONFLICT_RESPONSE, RELATIONSHIP_NO_CONTENT_RESPONSE,
};
use crate::error::GenerateError;
use crate::generate::Context;
use crate::names::{self, ResourceNames};
use crate::relationships;
use crate::schemas;

/// Path of an operation: `/<plural>` or `/<plural>/{<name>Id}`.
///
/// # Errors
///
/// Returns `GenerateError::UnexpectedOperation` for unknown tokens.
pub fn path(token: &str, plural: &str, resource_name: &str) -> Result<String, GenerateError> {
    let operation = Operation::parse(token)?;
    if operation.is_id_scoped() {
        Ok(format!(
            "/{}/{{{}}}",
            plural,
            names::id_parameter_name(resource_name)
        ))
    } else {
        Ok(format!("/{}", plural))
    }
}

/// Response map of a resource operation.
pub fn responses(operation: Operation, prefix: &str) -> Value {
    let mut responses = Map::new();

    if operation == Operation::DeleteById {
        responses.insert("204".into(), response_ref(DELETED_RESPONSE));
        responses.insert("500".into(), response_ref(INTERNAL_ERROR_RESPONSE));
        return Value::Object(responses);
    }

    let (status, description, result) = match operation {
        Operation::Get => ("200", "The requested resources", schemas::SET_RESULT),
        Operation::Post => ("201", "The created resource", schemas::RESULT),
        Operation::PatchById => ("200", "The updated resource", schemas::RESULT),
        _ => ("200", "The requested resource", schemas::RESULT),
    };
    responses.insert(
        status.into(),
        json!({
            "description": description,
            "content": json_api_content(schema_ref(&format!("{}{}", prefix, result)))
        }),
    );

    if operation.is_id_scoped() {
        responses.insert("404".into(), response_ref(NOT_FOUND_RESPONSE));
    }
    match operation {
        Operation::Post => {
            responses.insert("409".into(), response_ref(POST_CONFLICT_RESPONSE));
        }
        Operation::PatchById => {
            responses.insert("409".into(), response_ref(PATCH_CONFLICT_RESPONSE));
        }
        _ => {}
    }
    responses.insert("500".into(), response_ref(INTERNAL_ERROR_RESPONSE));

    Value::Object(responses)
}

/// Parameters of a resource operation.
///
/// Declares the resource's id path parameter component on first use.
pub fn parameters(
    doc: &mut DocumentBuilder,
    operation: Operation,
    res: &ResourceNames,
    def: &ResourceDef,
) -> Vec<Value> {
    let mut parameters = Vec::new();

    if operation == Operation::Get {
        if def.paginate {
            parameters.push(parameter_ref(PAGE_NUMBER_PARAMETER));
            parameters.push(parameter_ref(PAGE_SIZE_PARAMETER));
        }
        for (attribute, operators) in &def.filter_params {
            for operator in operators {
                parameters.push(filter_parameter(res, def, attribute, *operator));
            }
        }
    }

    if operation.is_id_scoped() {
        parameters.push(id_parameter(doc, res));
    }

    parameters
}

/// Query parameter name for a filter: `filter[attr]` for `eq`, `filter[attr][op]` otherwise.
pub fn filter_parameter_name(attribute: &str, operator: FilterOperator) -> String {
    match operator {
        FilterOperator::Eq => format!("filter[{}]", attribute),
        other => format!("filter[{}][{}]", attribute, other.as_str()),
    }
}

/// Add every path item of a resource: its declared operations and its relationships.
///
/// # Errors
///
/// Returns `GenerateError` for malformed or unknown operation tokens, and for
/// paths already claimed by another resource.
pub fn build_resource_endpoints(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    res: &ResourceNames,
    def: &ResourceDef,
) -> Result<(), GenerateError> {
    for token in &def.operations {
        let method = names::operation_method(token)?;
        let operation = Operation::parse(token)?;
        let path = path(token, &res.plural, res.name)?;
        let operation_id = names::operation_id(token, res.name, def)?;

        let parameters = parameters(doc, operation, res, def);
        let request_body = match operation {
            Operation::Post | Operation::PatchById => {
                Some(request_body_ref(&schemas::body_name(res, operation)?))
            }
            _ => None,
        };

        tracing::debug!(%method, %path, %operation_id, "adding operation");
        doc.insert_operation(
            &path,
            method,
            operation_object(
                res,
                operation_summary(operation, res),
                operation_id,
                parameters,
                request_body,
                responses(operation, &res.prefix),
            ),
        )?;
    }

    for (name, relationship) in &def.relationships {
        build_relationship_endpoints(doc, ctx, res, name, relationship)?;
    }

    Ok(())
}

// --- Internal implementation ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelationshipMethod {
    Get,
    Patch,
    Post,
    Delete,
}

impl RelationshipMethod {
    fn for_relationship(relationship: &Relationship) -> &'static [RelationshipMethod] {
        if relationship.is_to_many() {
            &[
                RelationshipMethod::Get,
                RelationshipMethod::Patch,
                RelationshipMethod::Post,
                RelationshipMethod::Delete,
            ]
        } else {
            &[RelationshipMethod::Get, RelationshipMethod::Patch]
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            RelationshipMethod::Get => "get",
            RelationshipMethod::Patch => "patch",
            RelationshipMethod::Post => "post",
            RelationshipMethod::Delete => "delete",
        }
    }

    fn is_mutating(&self) -> bool {
        *self != RelationshipMethod::Get
    }

    fn summary(
        &self,
        res: &ResourceNames,
        name: &str,
        target_plural: &str,
        to_many: bool,
    ) -> String {
        match self {
            RelationshipMethod::Get => {
                format!("Get the `{}` relationship of a {}", name, res.name)
            }
            RelationshipMethod::Patch if to_many => format!(
                "Replace the {} in the `{}` relationship of a {}",
                target_plural, name, res.name
            ),
            RelationshipMethod::Patch => {
                format!("Replace the `{}` relationship of a {}", name, res.name)
            }
            RelationshipMethod::Post => format!(
                "Add {} to the `{}` relationship of a {}",
                target_plural, name, res.name
            ),
            RelationshipMethod::Delete => format!(
                "Remove {} from the `{}` relationship of a {}",
                target_plural, name, res.name
            ),
        }
    }
}

fn build_relationship_endpoints(
    doc: &mut DocumentBuilder,
    ctx: &Context<'_>,
    res: &ResourceNames,
    name: &str,
    relationship: &Relationship,
) -> Result<(), GenerateError> {
    let path = format!("{}/relationships/{}", res.item_path(), name);
    let result = relationships::relationship_result_name(doc, ctx, res, name, relationship)?;
    let target_plural = relationships::target_plural(ctx, relationship);

    for method in RelationshipMethod::for_relationship(relationship) {
        let mut responses = Map::new();
        responses.insert(
            "200".into(),
            json!({
                "description": format!("The `{}` relationship", name),
                "content": json_api_content(schema_ref(&result))
            }),
        );
        if method.is_mutating() {
            responses.insert(
                "204".into(),
                response_ref(RELATIONSHIP_NO_CONTENT_RESPONSE),
            );
        }
        responses.insert("404".into(), response_ref(NOT_FOUND_RESPONSE));
        responses.insert("500".into(), response_ref(INTERNAL_ERROR_RESPONSE));

        let request_body = if method.is_mutating() {
            let body = relationships::relationship_request_body(doc, ctx, res, name, relationship)?;
            Some(request_body_ref(&body))
        } else {
            None
        };

        let operation_id = names::relationship_operation_id(method.as_str(), res.name, name);
        let parameters = vec![id_parameter(doc, res)];
        tracing::debug!(
            method = method.as_str(),
            %path,
            %operation_id,
            "adding relationship operation"
        );
        doc.insert_operation(
            &path,
            method.as_str(),
            operation_object(
                res,
                method.summary(res, name, &target_plural, relationship.is_to_many()),
                operation_id,
                parameters,
                request_body,
                Value::Object(responses),
            ),
        )?;
    }

    Ok(())
}

fn operation_object(
    res: &ResourceNames,
    summary: String,
    operation_id: String,
    parameters: Vec<Value>,
    request_body: Option<Value>,
    responses: Value,
) -> Value {
    let mut operation = Map::new();
    operation.insert("tags".into(), json!([res.plural]));
    operation.insert("summary".into(), Value::String(summary));
    operation.insert("operationId".into(), Value::String(operation_id));
    if !parameters.is_empty() {
        operation.insert("parameters".into(), Value::Array(parameters));
    }
    if let Some(body) = request_body {
        operation.insert("requestBody".into(), body);
    }
    operation.insert("responses".into(), responses);
    Value::Object(operation)
}

fn operation_summary(operation: Operation, res: &ResourceNames) -> String {
    match operation {
        Operation::Get => format!("List {}", res.plural),
        Operation::GetById => format!("Get a {} by id", res.name),
        Operation::Post => format!("Create a {}", res.name),
        Operation::PatchById => format!("Update a {}", res.name),
        Operation::DeleteById => format!("Delete a {}", res.name),
    }
}

fn id_parameter(doc: &mut DocumentBuilder, res: &ResourceNames) -> Value {
    doc.ensure_parameter(&res.id_param, || {
        json!({
            "name": res.id_param,
            "in": "path",
            "required": true,
            "description": format!("Identifier of the {}", res.name),
            "schema": schema_ref(&res.schema(schemas::ID))
        })
    });
    parameter_ref(&res.id_param)
}

fn filter_parameter(
    res: &ResourceNames,
    def: &ResourceDef,
    attribute: &str,
    operator: FilterOperator,
) -> Value {
    let mut schema = Map::new();
    if let Some(definition) = def.attributes.get(attribute) {
        for key in ["type", "format"] {
            if let Some(value) = definition.get(key) {
                schema.insert(key.to_string(), value.clone());
            }
        }
    }
    if schema.is_empty() {
        schema.insert("type".into(), json!("string"));
    }

    json!({
        "name": filter_parameter_name(attribute, operator),
        "in": "query",
        "required": false,
        "description": format!("Filter {} by `{}` ({})", res.plural, attribute, operator.as_str()),
        "schema": schema
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    fn owner() -> ResourceDef {
        serde_json::from_value(json!({
            "plural": "owners",
            "operations": ["get", "getById", "post", "patchById", "deleteById"],
            "filterParams": { "age": ["eq", "gte"], "nickname": ["fuzzy"] },
            "attributes": {
                "name": { "type": "string" },
                "age": { "type": "integer", "format": "int32" }
            }
        }))
        .unwrap()
    }

    fn build(def: ResourceDef) -> crate::document::Document {
        let mut config = Configuration {
            title: "Owners".into(),
            version: "1".into(),
            ..Configuration::default()
        };
        config.resources.insert("owner".into(), def);
        crate::generate(&config, "http://localhost").unwrap()
    }

    // === Paths ===

    #[test]
    fn path_for_each_operation() {
        assert_eq!(path("get", "owners", "owner").unwrap(), "/owners");
        assert_eq!(path("post", "owners", "owner").unwrap(), "/owners");
        assert_eq!(
            path("patchById", "owners", "owner").unwrap(),
            "/owners/{ownerId}"
        );
        assert_eq!(
            path("deleteById", "owners", "owner").unwrap(),
            "/owners/{ownerId}"
        );
    }

    #[test]
    fn path_rejects_unknown_token() {
        assert!(matches!(
            path("putById", "owners", "owner"),
            Err(GenerateError::UnexpectedOperation { token }) if token == "putById"
        ));
    }

    // === Responses ===

    #[test]
    fn delete_responses() {
        let responses = responses(Operation::DeleteById, "Owner");
        let codes: Vec<&String> = responses.as_object().unwrap().keys().collect();
        assert_eq!(codes, vec!["204", "500"]);
        assert_eq!(responses["204"]["$ref"], "#/components/responses/Deleted");
    }

    #[test]
    fn post_responses() {
        let responses = responses(Operation::Post, "Owner");
        let codes: Vec<&String> = responses.as_object().unwrap().keys().collect();
        assert_eq!(codes, vec!["201", "409", "500"]);
        assert_eq!(
            responses["201"]["content"]["application/vnd.api+json"]["schema"]["$ref"],
            "#/components/schemas/OwnerResult"
        );
        assert_eq!(responses["409"]["$ref"], "#/components/responses/PostConflict");
    }

    #[test]
    fn patch_responses() {
        let responses = responses(Operation::PatchById, "Owner");
        let codes: Vec<&String> = responses.as_object().unwrap().keys().collect();
        assert_eq!(codes, vec!["200", "404", "409", "500"]);
        assert_eq!(responses["409"]["$ref"], "#/components/responses/PatchConflict");
    }

    #[test]
    fn list_uses_set_result() {
        let responses = responses(Operation::Get, "Owner");
        assert_eq!(
            responses["200"]["content"]["application/vnd.api+json"]["schema"]["$ref"],
            "#/components/schemas/OwnerSetResult"
        );
        assert!(responses.get("404").is_none());
    }

    // === Parameters ===

    #[test]
    fn filter_parameter_names() {
        assert_eq!(filter_parameter_name("age", FilterOperator::Eq), "filter[age]");
        assert_eq!(
            filter_parameter_name("age", FilterOperator::Gte),
            "filter[age][gte]"
        );
    }

    #[test]
    fn list_parameters_copy_attribute_types() {
        let doc = build(owner());
        let parameters = doc.paths()["/owners"]["get"]["parameters"].as_array().unwrap();
        let names: Vec<&str> = parameters
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["filter[age]", "filter[age][gte]", "filter[nickname][fuzzy]"]
        );
        assert_eq!(
            parameters[0]["schema"],
            json!({ "type": "integer", "format": "int32" })
        );
        assert_eq!(parameters[2]["schema"], json!({ "type": "string" }));
    }

    #[test]
    fn pagination_parameters_only_when_paginating() {
        let doc = build(owner());
        let parameters = doc.paths()["/owners"]["get"]["parameters"].as_array().unwrap();
        assert!(parameters.iter().all(|p| p.get("$ref").is_none()));

        let mut def = owner();
        def.paginate = true;
        let doc = build(def);
        let parameters = doc.paths()["/owners"]["get"]["parameters"].as_array().unwrap();
        assert_eq!(
            parameters[0]["$ref"],
            "#/components/parameters/PageNumber"
        );
        assert_eq!(parameters[1]["$ref"], "#/components/parameters/PageSize");
    }

    #[test]
    fn id_parameter_declared_once() {
        let doc = build(owner());
        let parameter = &doc.components().parameters()["ownerId"];
        assert_eq!(parameter["in"], "path");
        assert_eq!(parameter["required"], true);
        assert_eq!(
            parameter["schema"]["$ref"],
            "#/components/schemas/OwnerId"
        );
        assert_eq!(
            doc.paths()["/owners/{ownerId}"]["get"]["parameters"][0]["$ref"],
            "#/components/parameters/ownerId"
        );
    }

    #[test]
    fn id_parameter_absent_without_id_operations() {
        let mut def = owner();
        def.operations = ["get".to_string(), "post".to_string()].into_iter().collect();
        let doc = build(def);
        assert!(!doc.components().parameters().contains_key("ownerId"));
        assert!(doc.paths().get("/owners/{ownerId}").is_none());
    }

    // === Operations ===

    #[test]
    fn operation_ids_and_bodies() {
        let doc = build(owner());
        let item = &doc.paths()["/owners/{ownerId}"];
        assert_eq!(item["patch"]["operationId"], "patchOwnerById");
        assert_eq!(
            item["patch"]["requestBody"]["$ref"],
            "#/components/requestBodies/OwnerPatchBody"
        );
        assert!(item["get"].get("requestBody").is_none());
        assert_eq!(doc.paths()["/owners"]["get"]["operationId"], "getOwners");
        assert_eq!(doc.paths()["/owners"]["post"]["tags"], json!(["owners"]));
    }

    #[test]
    fn to_one_relationship_endpoints() {
        let mut def = owner();
        def.relationships.insert(
            "home".into(),
            serde_json::from_value(json!({ "relationshipType": "toOne", "type": "house" }))
                .unwrap(),
        );
        let doc = build(def);

        let item = doc.paths()["/owners/{ownerId}/relationships/home"]
            .as_object()
            .unwrap();
        assert_eq!(item.keys().collect::<Vec<_>>(), vec!["get", "patch"]);
        assert_eq!(
            item["patch"]["requestBody"]["$ref"],
            "#/components/requestBodies/OwnerHouseRelationship"
        );
        assert_eq!(
            item["patch"]["responses"]["204"]["$ref"],
            "#/components/responses/RelationshipNoContent"
        );
        assert!(item["get"]["responses"].get("204").is_none());
        assert_eq!(item["get"]["operationId"], "getOwnerHomeRelationship");
    }
}
