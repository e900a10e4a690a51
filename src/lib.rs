//! JSON:API OpenAPI Generator
//!
//! Generates an OpenAPI 3.0 document for a JSON:API service from a
//! declarative list of resources.
//!
//! Each resource names its attributes, relationships and the operations it
//! supports. The generator derives every component schema, parameter,
//! request body and path item from that description, with `$ref` links
//! between them.
//!
//! # Example
//!
//! ```
//! use jsonapi_openapi::{generate, load_config_str, ConfigFormat};
//!
//! let config = load_config_str(
//!     r#"
//! title: Pet Store
//! version: 1.0.0
//! resources:
//!   pet:
//!     plural: pets
//!     operations: [get, getById, post]
//!     attributes:
//!       name: { type: string }
//! "#,
//!     ConfigFormat::Yaml,
//! )
//! .unwrap();
//!
//! let document = generate(&config, "https://api.example.com").unwrap();
//!
//! assert!(document.paths().contains_key("/pets"));
//! assert!(document.paths().contains_key("/pets/{petId}"));
//! assert!(document.schemas().contains_key("PetPostBody"));
//! ```
//!
//! # Generated components
//!
//! | Resource feature | Components |
//! |------------------|------------|
//! | every resource | `<P>Id`, `<P>Type`, `<P>Attributes`, `<P>GetResource`, `<P>Result`, `<P>SetResult` |
//! | `post` | `<P>PostResource`, `<P>PostBody` (schema and request body) |
//! | `patchById` | `<P>PatchResource`, `<P>PatchBody` (schema and request body) |
//! | to-one relationship | `<P><T>Relationship`, `<P><T>RelationshipResult` |
//! | to-many relationship | `<P><T>RelationshipSet`, `<P><T>RelationshipSetResult` |
//! | `paginate` (any resource) | `Meta`, `PaginationLinks`, `PageNumber`, `PageSize` |
//!
//! `<P>` is the capitalized resource name and `<T>` the capitalized
//! relationship target.

mod config;
mod document;
mod endpoints;
mod error;
mod generate;
mod loader;
mod names;
mod output;
mod relationships;
mod schemas;
mod validator;

pub use config::{
    AttributeSelection, Configuration, FilterOperator, Operation, Relationship,
    RelationshipKind, ResourceDef, ALL_ATTRIBUTES, OPERATIONS,
};
pub use document::{Components, Document, ExternalDocs, Features, Info, Server, Tag};
pub use endpoints::{filter_parameter_name, path};
pub use error::{ConfigError, GenerateError, OutputError, SchemaError};
pub use generate::generate;
pub use loader::{
    config_from_value, is_url, load_config, load_config_auto, load_config_str, ConfigFormat,
};
pub use names::{
    camel_join, id_parameter_name, operation_id, operation_method, plural, schema_prefix,
    split_operation, OperationWords,
};
pub use output::{render, write_document, OutputFormat};
pub use validator::{check_references, validate_config};

#[cfg(feature = "remote")]
pub use loader::load_config_url;
