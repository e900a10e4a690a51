//! Naming rules shared by the schema and endpoint builders.
//!
//! Every component key, path parameter and operationId in a generated
//! document comes from the functions in this module, so two resources with
//! distinct names never produce colliding keys.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `pet` | [`schema_prefix`] | `Pet` |
//! | `pet` | [`id_parameter_name`] | `petId` |
//! | `patchById` | [`operation_method`] | `patch` |
//! | `patchById`, `owner` | [`operation_id`] | `patchOwnerById` |
//! | `get`, `pet` (plural `pets`) | [`operation_id`] | `getPets` |

use crate::config::ResourceDef;
use crate::error::GenerateError;

/// An operation token split into its verb and the camel-case words after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationWords<'a> {
    /// Leading run of lowercase ASCII letters.
    pub verb: &'a str,
    /// Remaining words, each starting at an uppercase letter.
    pub suffix: Vec<&'a str>,
}

/// Split an operation token into `{verb, suffix}`.
///
/// `patchById` splits into `patch` and `[By, Id]`; `get` has no suffix.
///
/// # Errors
///
/// Returns `GenerateError::InvalidOperation` if the token does not start with
/// a lowercase letter.
pub fn split_operation(token: &str) -> Result<OperationWords<'_>, GenerateError> {
    let verb_end = token
        .find(|c: char| !c.is_ascii_lowercase())
        .unwrap_or(token.len());
    if verb_end == 0 {
        return Err(GenerateError::InvalidOperation {
            token: token.to_string(),
        });
    }

    Ok(OperationWords {
        verb: &token[..verb_end],
        suffix: camel_words(&token[verb_end..]),
    })
}

/// The HTTP verb of an operation token (`getById` -> `get`).
///
/// # Errors
///
/// Returns `GenerateError::InvalidOperation` if the token has no leading verb.
pub fn operation_method(token: &str) -> Result<&str, GenerateError> {
    split_operation(token).map(|words| words.verb)
}

/// Synthesize the operationId for a resource operation.
///
/// The collection read joins the verb with the plural (`getPets`); every
/// other token gets the resource name inserted after its verb
/// (`patchById` -> `patchPetById`).
///
/// # Errors
///
/// Returns `GenerateError::InvalidOperation` if the token has no leading verb.
pub fn operation_id(
    token: &str,
    resource_name: &str,
    resource: &ResourceDef,
) -> Result<String, GenerateError> {
    let words = split_operation(token)?;

    if words.verb == "get" && words.suffix.is_empty() {
        let plural = plural(resource_name, resource);
        return Ok(camel_join(&[words.verb, plural.as_str()]));
    }

    let mut parts = Vec::with_capacity(words.suffix.len() + 2);
    parts.push(words.verb);
    parts.push(resource_name);
    parts.extend(words.suffix);
    Ok(camel_join(&parts))
}

/// OperationId for a relationship sub-endpoint, e.g. `postPetSiblingsRelationship`.
pub fn relationship_operation_id(method: &str, resource_name: &str, relationship: &str) -> String {
    camel_join(&[method, resource_name, relationship, "Relationship"])
}

/// Namespacing prefix for every component belonging to a resource.
pub fn schema_prefix(resource_name: &str) -> String {
    capitalize(resource_name)
}

/// Path parameter name and parameter component key for a resource id.
pub fn id_parameter_name(resource_name: &str) -> String {
    format!("{}Id", resource_name)
}

/// Plural form of a resource, falling back to `<name>s`.
pub fn plural(resource_name: &str, resource: &ResourceDef) -> String {
    if resource.plural.is_empty() {
        fallback_plural(resource_name)
    } else {
        resource.plural.clone()
    }
}

/// Best-effort plural for a name with no resource definition.
pub fn fallback_plural(resource_name: &str) -> String {
    format!("{}s", resource_name)
}

/// Join words into one camelCase identifier.
pub fn camel_join<S: AsRef<str>>(words: &[S]) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        let word = word.as_ref();
        if i == 0 {
            out.push_str(&decapitalize(word));
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// Names derived once per resource and shared by all builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames<'a> {
    pub name: &'a str,
    pub prefix: String,
    pub plural: String,
    pub id_param: String,
}

impl<'a> ResourceNames<'a> {
    pub fn new(name: &'a str, resource: &ResourceDef) -> Self {
        Self {
            name,
            prefix: schema_prefix(name),
            plural: plural(name, resource),
            id_param: id_parameter_name(name),
        }
    }

    /// Component key for this resource, e.g. `schema("Result")` -> `PetResult`.
    pub fn schema(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }

    /// `/<plural>/{<name>Id}`
    pub fn item_path(&self) -> String {
        format!("/{}/{{{}}}", self.plural, self.id_param)
    }
}

// --- Internal implementation ---

fn camel_words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if i > start && c.is_uppercase() {
            words.push(&s[start..i]);
            start = i;
        }
    }
    if start < s.len() {
        words.push(&s[start..]);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
