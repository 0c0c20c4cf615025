//! Error types shared by the schema, configuration and tool layers

use std::path::PathBuf;
use thiserror::Error;

/// Load-time errors: the ontology or configuration cannot be used.
///
/// Raised before any storage call is attempted.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{context} is missing '{field}'")]
    MissingField { context: String, field: &'static str },

    #[error("{context} has unsupported type '{type_name}' (expected string, integer, float or date)")]
    UnsupportedType { context: String, type_name: String },

    #[error("Entity class '{0}' has no primary key property")]
    MissingPrimaryKey(String),

    #[error("Entity class '{class}' declares more than one primary key: {keys:?}")]
    MultiplePrimaryKeys { class: String, keys: Vec<String> },

    #[error("'{owner}' declares property '{property}' more than once")]
    DuplicateProperty { owner: String, property: String },

    #[error("Relationship '{relationship}' has no {role} class")]
    MissingEndpoint { relationship: String, role: &'static str },

    #[error("Relationship '{relationship}' refers to undefined {role} class '{class}'")]
    UndefinedClass {
        relationship: String,
        role: &'static str,
        class: String,
    },

    #[error("Operation '{0}' is generated more than once")]
    DuplicateOperation(String),

    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),
}

pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// Caller-supplied data does not fit the schema. The write is aborted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Property {missing} not found in properties of {relationship}, you need to change the world model")]
    SchemaMismatch { relationship: String, missing: String },

    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("Argument '{argument}' must be {expected}, got {found}")]
    InvalidType {
        argument: String,
        expected: &'static str,
        found: String,
    },

    #[error("'{owner}' has no property '{property}'")]
    UnknownProperty { owner: String, property: String },

    #[error("Argument '{argument}' is not a YYYY-MM-DD date: {value}")]
    InvalidDate { argument: String, value: String },

    #[error("Arguments of '{0}' must be a JSON object")]
    NotAnObject(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;
