//! Document assembly: runs the schema and endpoint builders over every resource.

use crate::config::Configuration;
use crate::document::{Document, DocumentBuilder, Features};
use crate::endpoints;
use crate::error::GenerateError;
use crate::names::ResourceNames;
use crate::schemas;

/// Read-only inputs shared by every builder during one generation pass.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub config: &'a Configuration,
    /// Server URL, also used to build relationship link examples.
    pub base_url: &'a str,
    pub features: Features,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a Configuration, base_url: &'a str) -> Self {
        Self {
            config,
            base_url,
            features: Features::scan(config),
        }
    }
}

/// Generate an OpenAPI document for a configuration.
///
/// The configuration is expected to be loaded and defaulted already (see
/// [`crate::load_config`]). Output is deterministic: the same inputs always
/// yield the same document, with keys in configuration order.
///
/// # Errors
///
/// Returns `GenerateError` if an operation token is malformed or unknown, or
/// if two resources claim the same component key or path. Nothing is
/// returned on failure.
pub fn generate(config: &Configuration, base_url: &str) -> Result<Document, GenerateError> {
    let ctx = Context::new(config, base_url);
    let mut doc = DocumentBuilder::new(config, base_url, ctx.features);

    for (name, def) in &config.resources {
        let _span = tracing::debug_span!("resource", name = %name).entered();
        let res = ResourceNames::new(name, def);

        doc.add_tag(&res.plural, format!("Operations on {} resources", res.name));
        schemas::build_resource_schemas(&mut doc, &ctx, &res, def)?;
        endpoints::build_resource_endpoints(&mut doc, &ctx, &res, def)?;
    }

    let document = doc.finish();
    tracing::info!(
        resources = config.resources.len(),
        paths = document.paths().len(),
        schemas = document.schemas().len(),
        "generated document"
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(resources: serde_json::Value) -> Configuration {
        serde_json::from_value(json!({
            "title": "Pets",
            "version": "1.0.0",
            "resources": resources
        }))
        .unwrap()
    }

    #[test]
    fn tags_follow_resource_order() {
        let config = config(json!({
            "pet": { "operations": ["get"] },
            "owner": { "plural": "owners", "operations": ["get"] }
        }));
        let doc = generate(&config, "http://localhost").unwrap();
        let tags: Vec<&str> = doc.tags().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tags, vec!["pets", "owners"]);
    }

    #[test]
    fn colliding_prefixes_fail() {
        let config = config(json!({
            "pet": { "plural": "pets" },
            "Pet": { "plural": "animals" }
        }));
        let err = generate(&config, "http://localhost").unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateComponent { name, .. } if name == "PetId"));
    }

    #[test]
    fn colliding_relationship_keys_fail() {
        let config = config(json!({
            "pet": {
                "plural": "pets",
                "operations": ["getById"],
                "relationships": {
                    "home": { "relationshipType": "toOne", "type": "ownerAddress" }
                }
            },
            "petOwner": {
                "plural": "petOwners",
                "operations": ["getById"],
                "relationships": {
                    "address": { "relationshipType": "toOne", "type": "address" }
                }
            }
        }));
        let err = generate(&config, "http://localhost").unwrap_err();
        assert!(matches!(
            err,
            GenerateError::DuplicateComponent { name, .. } if name == "PetOwnerAddressRelationship"
        ));
    }

    #[test]
    fn repeated_relationship_pair_is_shared() {
        let config = config(json!({
            "pet": {
                "plural": "pets",
                "operations": ["getById"],
                "relationships": {
                    "keeper": { "relationshipType": "toOne", "type": "owner" },
                    "vet": { "relationshipType": "toOne", "type": "owner" },
                    "visitors": { "relationshipType": "toMany", "type": "owner" }
                }
            },
            "owner": { "plural": "owners", "operations": ["getById"] }
        }));
        let doc = generate(&config, "http://localhost").unwrap();
        for key in [
            "PetOwnerRelationship",
            "PetOwnerRelationshipResult",
            "PetOwnerRelationshipSet",
            "PetOwnerRelationshipSetResult",
        ] {
            assert!(doc.schemas().contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn shared_plural_fails() {
        let config = config(json!({
            "pet": { "plural": "animals", "operations": ["get"] },
            "cat": { "plural": "animals", "operations": ["get"] }
        }));
        assert!(matches!(
            generate(&config, "http://localhost"),
            Err(GenerateError::DuplicateOperation { path, .. }) if path == "/animals"
        ));
    }

    #[test]
    fn invalid_token_aborts() {
        let config = config(json!({ "pet": { "operations": ["get", "List"] } }));
        assert!(matches!(
            generate(&config, "http://localhost"),
            Err(GenerateError::InvalidOperation { token }) if token == "List"
        ));
    }

    #[test]
    fn unknown_token_aborts() {
        let config = config(json!({ "pet": { "operations": ["list"] } }));
        assert!(matches!(
            generate(&config, "http://localhost"),
            Err(GenerateError::UnexpectedOperation { token }) if token == "list"
        ));
    }
}
