//! Typed schema field descriptors

use crate::error::{ConfigurationError, ValidationError, ValidationResult};
use crate::graph::{PropertyValue, DATE_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Declared type of a schema property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Float,
    Date,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Integer => "integer",
            PropertyType::Float => "float",
            PropertyType::Date => "date",
        }
    }

    /// JSON-Schema type used in generated parameter schemas
    pub fn json_type(&self) -> &'static str {
        match self {
            PropertyType::String | PropertyType::Date => "string",
            PropertyType::Integer => "integer",
            PropertyType::Float => "number",
        }
    }

    /// Coerce a JSON argument into a value of this type.
    ///
    /// Numeric strings are accepted for numeric types and scalars are accepted
    /// for string types (rendered as text). Anything else is a validation error.
    pub fn coerce(&self, argument: &str, value: &Value) -> ValidationResult<PropertyValue> {
        let invalid = || ValidationError::InvalidType {
            argument: argument.to_string(),
            expected: self.expected(),
            found: json_kind(value).to_string(),
        };

        match (self, value) {
            (PropertyType::String, Value::String(s)) => Ok(PropertyValue::String(s.clone())),
            (PropertyType::String, Value::Number(n)) => Ok(PropertyValue::String(n.to_string())),
            (PropertyType::String, Value::Bool(b)) => Ok(PropertyValue::String(b.to_string())),

            (PropertyType::Integer, Value::Number(n)) => n.as_i64().map(PropertyValue::Integer).ok_or_else(invalid),
            (PropertyType::Integer, Value::String(s)) => {
                s.trim().parse::<i64>().map(PropertyValue::Integer).map_err(|_| invalid())
            }

            // Non-finite floats have no JSON form
            (PropertyType::Float, Value::Number(n)) => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(PropertyValue::Float)
                .ok_or_else(invalid),
            (PropertyType::Float, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(PropertyValue::Float)
                .ok_or_else(invalid),

            (PropertyType::Date, Value::String(s)) => parse_date(s.trim())
                .map(PropertyValue::Date)
                .ok_or_else(|| ValidationError::InvalidDate {
                    argument: argument.to_string(),
                    value: s.clone(),
                }),

            _ => Err(invalid()),
        }
    }

    /// Re-type a stored value against this declaration.
    ///
    /// Backends without a native date type hand dates back as ISO strings;
    /// those (and numbers stored as text) are converted back. Values that do not
    /// convert are returned unchanged.
    pub fn conform(&self, value: PropertyValue) -> PropertyValue {
        match (self, value) {
            (PropertyType::Date, PropertyValue::String(s)) => match parse_date(&s) {
                Some(date) => PropertyValue::Date(date),
                None => PropertyValue::String(s),
            },
            (PropertyType::Float, PropertyValue::Integer(i)) => PropertyValue::Float(i as f64),
            (PropertyType::Integer, PropertyValue::String(s)) => match s.parse::<i64>() {
                Ok(i) => PropertyValue::Integer(i),
                Err(_) => PropertyValue::String(s),
            },
            (PropertyType::Float, PropertyValue::String(s)) => match s.parse::<f64>() {
                Ok(f) if f.is_finite() => PropertyValue::Float(f),
                _ => PropertyValue::String(s),
            },
            (_, value) => value,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            PropertyType::String => "a string",
            PropertyType::Integer => "an integer",
            PropertyType::Float => "a number",
            PropertyType::Date => "a YYYY-MM-DD date string",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(PropertyType::String),
            "integer" => Ok(PropertyType::Integer),
            "float" => Ok(PropertyType::Float),
            "date" => Ok(PropertyType::Date),
            other => Err(other.to_string()),
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A field of an entity or relationship class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub property_type: PropertyType,
    pub description: String,
    pub primary_key: bool,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        property_type: PropertyType,
        description: impl Into<String>,
        primary_key: bool,
    ) -> Self {
        Self {
            name: name.into(),
            property_type,
            description: description.into(),
            primary_key,
        }
    }

    /// Parse a property declaration, reporting problems against `owner`
    pub(crate) fn from_parts(
        owner: &str,
        name: Option<String>,
        type_name: Option<String>,
        description: Option<String>,
        primary_key: bool,
    ) -> Result<Self, ConfigurationError> {
        let name = name.ok_or_else(|| ConfigurationError::MissingField {
            context: format!("A property of '{}'", owner),
            field: "name",
        })?;
        let context = format!("Property '{}.{}'", owner, name);
        let type_name = type_name.ok_or_else(|| ConfigurationError::MissingField {
            context: context.clone(),
            field: "type",
        })?;
        let property_type = type_name
            .parse::<PropertyType>()
            .map_err(|type_name| ConfigurationError::UnsupportedType {
                context: context.clone(),
                type_name,
            })?;
        let description = description.ok_or(ConfigurationError::MissingField {
            context,
            field: "description",
        })?;

        Ok(Self::new(name, property_type, description, primary_key))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.property_type, self.description)?;
        if self.primary_key {
            write!(f, " - Primary Key")?;
        }
        Ok(())
    }
}
