//! Configuration model: the declarative description of the resources to document.

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::GenerateError;

/// Operation tokens accepted in a resource's `operations` list.
pub const OPERATIONS: &[&str] = &["get", "getById", "post", "patchById", "deleteById"];

/// Keyword selecting every attribute of a resource.
pub const ALL_ATTRIBUTES: &str = "all";

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub external_docs_url: Option<String>,
    #[serde(default)]
    pub resources: IndexMap<String, ResourceDef>,
}

/// Definition of a single resource type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDef {
    /// Plural form used in paths and tags. Empty means `<name>s`.
    #[serde(default)]
    pub plural: String,
    #[serde(default = "default_true")]
    pub self_links: bool,
    #[serde(default)]
    pub paginate: bool,
    /// Operation tokens, deduplicated, in declaration order.
    #[serde(default)]
    pub operations: IndexSet<String>,
    #[serde(default)]
    pub filter_params: IndexMap<String, Vec<FilterOperator>>,
    #[serde(default)]
    pub get_attributes: AttributeSelection,
    #[serde(default)]
    pub post_attributes: AttributeSelection,
    #[serde(default)]
    pub patch_attributes: AttributeSelection,
    #[serde(default = "AttributeSelection::none")]
    pub required_post_attributes: AttributeSelection,
    /// Attribute name to JSON schema fragment.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub relationships: IndexMap<String, Relationship>,
    /// Reserved for nested paths; carried but never synthesized.
    #[serde(default)]
    pub sub_resources: Map<String, Value>,
}

impl Default for ResourceDef {
    fn default() -> Self {
        Self {
            plural: String::new(),
            self_links: true,
            paginate: false,
            operations: IndexSet::new(),
            filter_params: IndexMap::new(),
            get_attributes: AttributeSelection::All,
            post_attributes: AttributeSelection::All,
            patch_attributes: AttributeSelection::All,
            required_post_attributes: AttributeSelection::none(),
            attributes: Map::new(),
            relationships: IndexMap::new(),
            sub_resources: Map::new(),
        }
    }
}

impl ResourceDef {
    /// Returns true if `operation` is among the declared operations.
    pub fn declares(&self, operation: Operation) -> bool {
        self.operations.contains(operation.token())
    }
}

fn default_true() -> bool {
    true
}

/// Either every attribute (`"all"`) or an explicit list of attribute names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawSelection")]
pub enum AttributeSelection {
    #[default]
    All,
    Only(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelection {
    Keyword(String),
    List(Vec<String>),
}

impl TryFrom<RawSelection> for AttributeSelection {
    type Error = String;

    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        match raw {
            RawSelection::Keyword(s) if s == ALL_ATTRIBUTES => Ok(AttributeSelection::All),
            RawSelection::Keyword(s) => Err(format!(
                "expected \"{}\" or a list of attribute names, got \"{}\"",
                ALL_ATTRIBUTES, s
            )),
            RawSelection::List(names) => Ok(AttributeSelection::Only(names)),
        }
    }
}

impl AttributeSelection {
    /// An explicit empty selection.
    pub fn none() -> Self {
        AttributeSelection::Only(Vec::new())
    }

    /// Resolve the selection against an attribute map.
    ///
    /// Names absent from `attributes` are dropped, duplicates keep their
    /// first position.
    pub fn resolve<'a>(&'a self, attributes: &'a Map<String, Value>) -> Vec<&'a str> {
        match self {
            AttributeSelection::All => attributes.keys().map(String::as_str).collect(),
            AttributeSelection::Only(names) => {
                let mut resolved: Vec<&str> = Vec::with_capacity(names.len());
                for name in names {
                    if attributes.contains_key(name) && !resolved.contains(&name.as_str()) {
                        resolved.push(name);
                    }
                }
                resolved
            }
        }
    }

    /// Names listed explicitly; empty for `All`.
    pub fn listed(&self) -> &[String] {
        match self {
            AttributeSelection::All => &[],
            AttributeSelection::Only(names) => names,
        }
    }
}

/// Filter operators accepted by collection reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    OneOf,
    NoneOf,
    HasSome,
    HasAll,
    HasNone,
    Fuzzy,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::OneOf => "oneOf",
            FilterOperator::NoneOf => "noneOf",
            FilterOperator::HasSome => "hasSome",
            FilterOperator::HasAll => "hasAll",
            FilterOperator::HasNone => "hasNone",
            FilterOperator::Fuzzy => "fuzzy",
        }
    }
}

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    ToOne,
    ToMany,
}

/// A named link from one resource to another.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub relationship_type: RelationshipKind,
    /// Name of the related resource.
    #[serde(rename = "type")]
    pub target: String,
}

impl Relationship {
    pub fn is_to_many(&self) -> bool {
        self.relationship_type == RelationshipKind::ToMany
    }
}

/// One of the five operations a resource can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    GetById,
    Post,
    PatchById,
    DeleteById,
}

impl Operation {
    /// Parse an operation token.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::UnexpectedOperation` for tokens outside
    /// [`OPERATIONS`].
    pub fn parse(token: &str) -> Result<Self, GenerateError> {
        match token {
            "get" => Ok(Operation::Get),
            "getById" => Ok(Operation::GetById),
            "post" => Ok(Operation::Post),
            "patchById" => Ok(Operation::PatchById),
            "deleteById" => Ok(Operation::DeleteById),
            other => Err(GenerateError::UnexpectedOperation {
                token: other.to_string(),
            }),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::GetById => "getById",
            Operation::Post => "post",
            Operation::PatchById => "patchById",
            Operation::DeleteById => "deleteById",
        }
    }

    /// True for operations addressing a single resource by id.
    pub fn is_id_scoped(&self) -> bool {
        matches!(
            self,
            Operation::GetById | Operation::PatchById | Operation::DeleteById
        )
    }
}
