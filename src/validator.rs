//! Configuration validation.
//!
//! Two layers: the raw document is checked against the embedded JSON
//! meta-schema (`schemas/config.schema.json`), which is fatal, then the typed
//! configuration is checked for attribute names that do not exist, which
//! only produces warnings. Generation skips unknown names on its own.

use serde_json::Value;

use crate::config::Configuration;
use crate::document::pointer_escape;
use crate::error::{ConfigError, SchemaError};

/// Meta-schema every configuration must satisfy.
const META_SCHEMA: &str = include_str!("../schemas/config.schema.json");

/// Validate a raw configuration against the meta-schema.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` listing every violation, or
/// `ConfigError::InvalidMetaSchema` if the embedded meta-schema cannot be compiled.
pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let schema: Value =
        serde_json::from_str(META_SCHEMA).map_err(|e| ConfigError::InvalidMetaSchema {
            message: e.to_string(),
        })?;

    let validator =
        jsonschema::validator_for(&schema).map_err(|e| ConfigError::InvalidMetaSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(config)
        .map(|e| {
            let path = e.instance_path.to_string();
            SchemaError {
                path: if path.is_empty() { "/".to_string() } else { path },
                message: e.to_string(),
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid { errors })
    }
}

/// List attribute names that a resource references but never defines.
///
/// These are warnings: generation drops unknown names from projections and
/// types unknown filters as strings. Relationship targets that are not
/// configured resources are only logged.
pub fn check_references(config: &Configuration) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    for (name, def) in &config.resources {
        let base = format!("/resources/{}", pointer_escape(name));

        for (field, selection) in [
            ("getAttributes", &def.get_attributes),
            ("postAttributes", &def.post_attributes),
            ("patchAttributes", &def.patch_attributes),
            ("requiredPostAttributes", &def.required_post_attributes),
        ] {
            for (i, attribute) in selection.listed().iter().enumerate() {
                if !def.attributes.contains_key(attribute) {
                    errors.push(SchemaError {
                        path: format!("{}/{}/{}", base, field, i),
                        message: format!("unknown attribute \"{}\"", attribute),
                    });
                }
            }
        }

        for attribute in def.filter_params.keys() {
            if !def.attributes.contains_key(attribute) {
                errors.push(SchemaError {
                    path: format!("{}/filterParams/{}", base, pointer_escape(attribute)),
                    message: format!("cannot filter on unknown attribute \"{}\"", attribute),
                });
            }
        }

        for (relationship, target) in def
            .relationships
            .iter()
            .map(|(rel, r)| (rel, &r.target))
            .filter(|(_, target)| !config.resources.contains_key(target.as_str()))
        {
            tracing::warn!(
                resource = %name,
                %relationship,
                %target,
                "relationship points at a resource that is not configured"
            );
        }
    }

    errors
}
