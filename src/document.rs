//! The generated OpenAPI document and the builder that owns it during generation.
//!
//! [`DocumentBuilder::new`] lays down the parts of the document that do not
//! depend on any single resource: metadata, the security scheme, the JSON:API
//! error and link schemas, shared responses and, when at least one resource
//! paginates, the pagination schemas and parameters. Resource builders then
//! add their entries through the narrow `insert_*`/`ensure_*` methods.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::Configuration;
use crate::error::GenerateError;

/// OpenAPI version emitted in every document.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Media type of every request and response body.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Name of the bearer security scheme.
pub const SECURITY_SCHEME: &str = "bearerAuth";

// Shared schemas
pub const ERROR_SCHEMA: &str = "Error";
pub const ERRORS_SCHEMA: &str = "Errors";
pub const SELF_LINK_SCHEMA: &str = "SelfLink";
pub const META_SCHEMA: &str = "Meta";
pub const PAGINATION_LINKS_SCHEMA: &str = "PaginationLinks";

// Shared parameters
pub const PAGE_NUMBER_PARAMETER: &str = "PageNumber";
pub const PAGE_SIZE_PARAMETER: &str = "PageSize";

// Shared responses
pub const NOT_FOUND_RESPONSE: &str = "NotFound";
pub const POST_CONFLICT_RESPONSE: &str = "PostConflict";
pub const PATCH_CONFLICT_RESPONSE: &str = "PatchConflict";
pub const INTERNAL_ERROR_RESPONSE: &str = "InternalServerError";
pub const DELETED_RESPONSE: &str = "Deleted";
pub const RELATIONSHIP_NO_CONTENT_RESPONSE: &str = "RelationshipNoContent";

/// Document-level switches computed from the whole configuration before any
/// resource is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
    /// At least one resource paginates its collection.
    pub pagination: bool,
}

impl Features {
    pub fn scan(config: &Configuration) -> Self {
        Self {
            pagination: config.resources.values().any(|r| r.paginate),
        }
    }
}

/// `{"$ref": "#/components/schemas/<name>"}`
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

/// `{"$ref": "#/components/parameters/<name>"}`
pub fn parameter_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/parameters/{}", name) })
}

/// `{"$ref": "#/components/responses/<name>"}`
pub fn response_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/responses/{}", name) })
}

/// `{"$ref": "#/components/requestBodies/<name>"}`
pub fn request_body_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/requestBodies/{}", name) })
}

/// Wrap a schema in a JSON:API `content` object.
pub fn json_api_content(schema: Value) -> Value {
    json!({ JSON_API_MEDIA_TYPE: { "schema": schema } })
}

/// Escape a key for use inside a JSON Pointer (RFC 6901).
pub fn pointer_escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Escape a key for use as a JSON Pointer token inside a URI fragment.
///
/// Applies [`pointer_escape`], then percent-encodes every byte that is not
/// allowed verbatim in an RFC 3986 fragment.
pub fn fragment_escape(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in pointer_escape(key).bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~!$&'()*+,;=:@/?".contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// `info` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub title: String,
    pub description: String,
    pub version: String,
}

/// `externalDocs` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalDocs {
    pub url: String,
}

/// One entry of `servers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub url: String,
}

/// One entry of `tags`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    pub description: String,
}

/// `components` section. All maps keep insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    security_schemes: Map<String, Value>,
    schemas: Map<String, Value>,
    parameters: Map<String, Value>,
    responses: Map<String, Value>,
    request_bodies: Map<String, Value>,
}

impl Components {
    pub fn security_schemes(&self) -> &Map<String, Value> {
        &self.security_schemes
    }

    pub fn schemas(&self) -> &Map<String, Value> {
        &self.schemas
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn responses(&self) -> &Map<String, Value> {
        &self.responses
    }

    pub fn request_bodies(&self) -> &Map<String, Value> {
        &self.request_bodies
    }
}

/// A finished OpenAPI document.
///
/// Only produced by [`DocumentBuilder::finish`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    openapi: &'static str,
    info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_docs: Option<ExternalDocs>,
    servers: Vec<Server>,
    security: Vec<Value>,
    tags: Vec<Tag>,
    paths: Map<String, Value>,
    components: Components,
}

impl Document {
    pub fn openapi(&self) -> &str {
        self.openapi
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn external_docs(&self) -> Option<&ExternalDocs> {
        self.external_docs.as_ref()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Path items keyed by path; each item maps methods to operations.
    pub fn paths(&self) -> &Map<String, Value> {
        &self.paths
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Shorthand for `components().schemas()`.
    pub fn schemas(&self) -> &Map<String, Value> {
        &self.components.schemas
    }
}

/// Exclusive owner of a document under construction.
#[derive(Debug)]
pub struct DocumentBuilder {
    doc: Document,
    /// Relationship key -> (owner, target) that produced it.
    relationship_keys: IndexMap<String, (String, String)>,
}

impl DocumentBuilder {
    /// Create the invariant skeleton of a document.
    pub fn new(config: &Configuration, base_url: &str, features: Features) -> Self {
        let mut components = Components::default();

        components.security_schemes.insert(
            SECURITY_SCHEME.to_string(),
            json!({ "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }),
        );

        components
            .schemas
            .insert(ERROR_SCHEMA.to_string(), error_schema());
        components.schemas.insert(
            ERRORS_SCHEMA.to_string(),
            json!({
                "type": "object",
                "required": ["errors"],
                "properties": {
                    "errors": { "type": "array", "items": schema_ref(ERROR_SCHEMA) }
                }
            }),
        );
        components.schemas.insert(
            SELF_LINK_SCHEMA.to_string(),
            json!({
                "type": "object",
                "required": ["self"],
                "properties": {
                    "self": { "type": "string", "format": "uri" }
                }
            }),
        );

        if features.pagination {
            components.schemas.insert(
                META_SCHEMA.to_string(),
                json!({
                    "type": "object",
                    "properties": {
                        "totalItems": { "type": "integer", "minimum": 0 },
                        "totalPages": { "type": "integer", "minimum": 0 }
                    }
                }),
            );
            components.schemas.insert(
                PAGINATION_LINKS_SCHEMA.to_string(),
                json!({
                    "type": "object",
                    "properties": {
                        "first": { "type": "string", "format": "uri" },
                        "last": { "type": "string", "format": "uri" },
                        "prev": { "type": "string", "format": "uri", "nullable": true },
                        "next": { "type": "string", "format": "uri", "nullable": true }
                    }
                }),
            );
            components.parameters.insert(
                PAGE_NUMBER_PARAMETER.to_string(),
                page_parameter("page[number]", "Page to return, starting at 1"),
            );
            components.parameters.insert(
                PAGE_SIZE_PARAMETER.to_string(),
                page_parameter("page[size]", "Number of resources per page"),
            );
        }

        for (name, description) in [
            (NOT_FOUND_RESPONSE, "The requested resource does not exist"),
            (
                POST_CONFLICT_RESPONSE,
                "The resource type does not match the collection, or a client-generated id is already taken",
            ),
            (
                PATCH_CONFLICT_RESPONSE,
                "The resource type or id does not match the endpoint, or the update violates a uniqueness constraint",
            ),
            (INTERNAL_ERROR_RESPONSE, "Unexpected server error"),
        ] {
            components.responses.insert(
                name.to_string(),
                json!({
                    "description": description,
                    "content": json_api_content(schema_ref(ERRORS_SCHEMA))
                }),
            );
        }
        components.responses.insert(
            DELETED_RESPONSE.to_string(),
            json!({ "description": "The resource was deleted" }),
        );
        components.responses.insert(
            RELATIONSHIP_NO_CONTENT_RESPONSE.to_string(),
            json!({
                "description": "The relationship update was accepted and the relationship already matches the request"
            }),
        );

        let doc = Document {
            openapi: OPENAPI_VERSION,
            info: Info {
                title: config.title.clone(),
                description: config.description.clone(),
                version: config.version.clone(),
            },
            external_docs: config
                .external_docs_url
                .as_ref()
                .filter(|url| !url.is_empty())
                .map(|url| ExternalDocs { url: url.clone() }),
            servers: vec![Server {
                url: base_url.to_string(),
            }],
            security: vec![json!({ SECURITY_SCHEME: [] })],
            tags: Vec::new(),
            paths: Map::new(),
            components,
        };

        Self {
            doc,
            relationship_keys: IndexMap::new(),
        }
    }

    /// Insert a schema under a key that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::DuplicateComponent` if the key is taken.
    pub fn insert_schema(
        &mut self,
        name: impl Into<String>,
        schema: Value,
    ) -> Result<(), GenerateError> {
        insert_unique(&mut self.doc.components.schemas, "schema", name.into(), schema)
    }

    /// Insert a schema unless the key already exists. Returns true if inserted.
    pub fn ensure_schema(&mut self, name: &str, build: impl FnOnce() -> Value) -> bool {
        ensure(&mut self.doc.components.schemas, name, build)
    }

    /// Record that the relationship key `name` links `owner` to `target`.
    ///
    /// Claiming the same key again for the same pair is a no-op, so several
    /// relationships of one owner can share their schemas.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::DuplicateComponent` if the key was produced by a
    /// different (owner, target) pair, or if it is first claimed while a
    /// schema of that family is already defined by something else.
    pub fn claim_relationship(
        &mut self,
        name: &str,
        owner: &str,
        target: &str,
    ) -> Result<(), GenerateError> {
        let duplicate = || GenerateError::DuplicateComponent {
            section: "relationship schema",
            name: name.to_string(),
        };

        if let Some((claimed_owner, claimed_target)) = self.relationship_keys.get(name) {
            return if claimed_owner == owner && claimed_target == target {
                Ok(())
            } else {
                Err(duplicate())
            };
        }

        let schemas = &self.doc.components.schemas;
        let taken = ["", "Result", "Set", "SetResult"]
            .iter()
            .any(|suffix| schemas.contains_key(&format!("{}{}", name, suffix)));
        if taken {
            return Err(duplicate());
        }
        self.relationship_keys
            .insert(name.to_string(), (owner.to_string(), target.to_string()));
        Ok(())
    }

    /// Insert a parameter unless the key already exists. Returns true if inserted.
    pub fn ensure_parameter(&mut self, name: &str, build: impl FnOnce() -> Value) -> bool {
        ensure(&mut self.doc.components.parameters, name, build)
    }

    /// Insert a request body under a key that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::DuplicateComponent` if the key is taken.
    pub fn insert_request_body(
        &mut self,
        name: impl Into<String>,
        body: Value,
    ) -> Result<(), GenerateError> {
        insert_unique(
            &mut self.doc.components.request_bodies,
            "request body",
            name.into(),
            body,
        )
    }

    /// Insert a request body unless the key already exists. Returns true if inserted.
    pub fn ensure_request_body(&mut self, name: &str, build: impl FnOnce() -> Value) -> bool {
        ensure(&mut self.doc.components.request_bodies, name, build)
    }

    /// Attach an operation to a path item, creating the item if needed.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::DuplicateOperation` if the path already has
    /// an operation for `method`.
    pub fn insert_operation(
        &mut self,
        path: &str,
        method: &str,
        operation: Value,
    ) -> Result<(), GenerateError> {
        let item = self
            .doc
            .paths
            .entry(path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        // Path items are only ever created as objects above.
        let Value::Object(item) = item else {
            return Err(GenerateError::DuplicateOperation {
                path: path.to_string(),
                method: method.to_string(),
            });
        };

        if item.contains_key(method) {
            return Err(GenerateError::DuplicateOperation {
                path: path.to_string(),
                method: method.to_string(),
            });
        }
        item.insert(method.to_string(), operation);
        Ok(())
    }

    /// Register a document-level tag; repeated names are ignored.
    pub fn add_tag(&mut self, name: &str, description: String) {
        if self.doc.tags.iter().all(|t| t.name != name) {
            self.doc.tags.push(Tag {
                name: name.to_string(),
                description,
            });
        }
    }

    /// Hand off the finished document.
    pub fn finish(self) -> Document {
        self.doc
    }
}

// --- Internal implementation ---

fn insert_unique(
    map: &mut Map<String, Value>,
    section: &'static str,
    name: String,
    value: Value,
) -> Result<(), GenerateError> {
    if map.contains_key(&name) {
        return Err(GenerateError::DuplicateComponent { section, name });
    }
    map.insert(name, value);
    Ok(())
}

fn ensure(map: &mut Map<String, Value>, name: &str, build: impl FnOnce() -> Value) -> bool {
    if map.contains_key(name) {
        return false;
    }
    map.insert(name.to_string(), build());
    true
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "status": { "type": "string" },
            "code": { "type": "string" },
            "title": { "type": "string" },
            "detail": { "type": "string" },
            "source": {
                "type": "object",
                "properties": {
                    "pointer": { "type": "string" },
                    "parameter": { "type": "string" }
                }
            }
        }
    })
}

fn page_parameter(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": "integer", "minimum": 1 }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Configuration {
        Configuration {
            title: "Pet Store".into(),
            description: "Pets and owners".into(),
            version: "1.0.0".into(),
            external_docs_url: Some("https://docs.example.com".into()),
            ..Configuration::default()
        }
    }

    #[test]
    fn skeleton_without_pagination() {
        let doc = DocumentBuilder::new(&config(), "https://api.example.com", Features::default())
            .finish();

        assert_eq!(doc.openapi(), OPENAPI_VERSION);
        assert_eq!(doc.info().title, "Pet Store");
        assert_eq!(doc.servers()[0].url, "https://api.example.com");
        assert!(doc.schemas().contains_key(ERRORS_SCHEMA));
        assert!(!doc.schemas().contains_key(META_SCHEMA));
        assert!(!doc.schemas().contains_key(PAGINATION_LINKS_SCHEMA));
        assert!(doc.components().parameters().is_empty());
        assert!(doc
            .components()
            .security_schemes()
            .contains_key(SECURITY_SCHEME));
    }

    #[test]
    fn skeleton_with_pagination() {
        let features = Features { pagination: true };
        let doc = DocumentBuilder::new(&config(), "https://api.example.com", features).finish();

        assert!(doc.schemas().contains_key(META_SCHEMA));
        assert!(doc.schemas().contains_key(PAGINATION_LINKS_SCHEMA));
        assert_eq!(
            doc.components().parameters()[PAGE_NUMBER_PARAMETER]["name"],
            "page[number]"
        );
    }

    #[test]
    fn empty_external_docs_url_is_omitted() {
        let mut config = config();
        config.external_docs_url = Some(String::new());
        let doc = DocumentBuilder::new(&config, "http://localhost", Features::default()).finish();
        assert!(doc.external_docs().is_none());
    }

    #[test]
    fn insert_schema_rejects_duplicates() {
        let mut builder = DocumentBuilder::new(&config(), "http://localhost", Features::default());
        builder.insert_schema("PetId", json!({})).unwrap();
        let err = builder.insert_schema("PetId", json!({})).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::DuplicateComponent { section: "schema", name } if name == "PetId"
        ));
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let mut builder = DocumentBuilder::new(&config(), "http://localhost", Features::default());
        assert!(builder.ensure_schema("PetPetRelationship", || json!({ "first": true })));
        assert!(!builder.ensure_schema("PetPetRelationship", || json!({ "first": false })));
        let doc = builder.finish();
        assert_eq!(doc.schemas()["PetPetRelationship"]["first"], true);
    }

    #[test]
    fn insert_operation_groups_methods_by_path() {
        let mut builder = DocumentBuilder::new(&config(), "http://localhost", Features::default());
        builder.insert_operation("/pets", "get", json!({})).unwrap();
        builder.insert_operation("/pets", "post", json!({})).unwrap();
        assert!(matches!(
            builder.insert_operation("/pets", "get", json!({})),
            Err(GenerateError::DuplicateOperation { .. })
        ));

        let doc = builder.finish();
        let item = doc.paths()["/pets"].as_object().unwrap();
        assert_eq!(item.keys().collect::<Vec<_>>(), vec!["get", "post"]);
    }

    #[test]
    fn fragment_escape_percent_encodes() {
        assert_eq!(fragment_escape("first name"), "first%20name");
        assert_eq!(fragment_escape("a/b~c"), "a~1b~0c");
        assert_eq!(fragment_escape("50%"), "50%25");
        assert_eq!(fragment_escape("#tag"), "%23tag");
        assert_eq!(fragment_escape("naïve"), "na%C3%AFve");
        assert_eq!(fragment_escape("dateOfBirth"), "dateOfBirth");
    }

    #[test]
    fn relationship_keys_belong_to_one_pair() {
        let mut builder = DocumentBuilder::new(&config(), "http://localhost", Features::default());
        builder
            .claim_relationship("PetOwnerAddressRelationship", "pet", "ownerAddress")
            .unwrap();
        builder
            .claim_relationship("PetOwnerAddressRelationship", "pet", "ownerAddress")
            .unwrap();

        let err = builder
            .claim_relationship("PetOwnerAddressRelationship", "petOwner", "address")
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::DuplicateComponent { section: "relationship schema", name }
                if name == "PetOwnerAddressRelationship"
        ));
    }

    #[test]
    fn relationship_key_cannot_shadow_existing_schema() {
        let mut builder = DocumentBuilder::new(&config(), "http://localhost", Features::default());
        builder
            .insert_schema("PetOwnerRelationshipResult", json!({}))
            .unwrap();
        assert!(builder
            .claim_relationship("PetOwnerRelationship", "pet", "owner")
            .is_err());
    }

    #[test]
    fn pointer_escape_special_characters() {
        assert_eq!(pointer_escape("a/b~c"), "a~1b~0c");
    }
}
