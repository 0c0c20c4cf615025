//! Parameter schemas of generated operations

use crate::error::{ValidationError, ValidationResult};
use crate::graph::PropertyValue;
use crate::ontology::{Property, PropertyType};
use serde_json::{json, Map, Value};

/// Shape of one argument
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    /// A single typed value
    Scalar(PropertyType),
    /// A nested object with its own parameters
    Object(ParameterSchema),
}

/// One named argument of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
}

/// Argument list of an operation, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    parameters: Vec<Parameter>,
}

impl ParameterSchema {
    /// Operation without arguments
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a scalar argument
    pub fn scalar(
        mut self,
        name: impl Into<String>,
        property_type: PropertyType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            kind: ParameterKind::Scalar(property_type),
            description: description.into(),
            required,
        });
        self
    }

    /// Add a nested object argument
    pub fn object(
        mut self,
        name: impl Into<String>,
        schema: ParameterSchema,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            kind: ParameterKind::Object(schema),
            description: description.into(),
            required,
        });
        self
    }

    /// One scalar argument per schema property, all required
    pub fn from_properties(properties: &[Property]) -> Self {
        properties.iter().fold(Self::empty(), |schema, p| {
            schema.scalar(p.name.clone(), p.property_type, p.description.clone(), true)
        })
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Names of the required arguments
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().filter(|p| p.required).map(|p| p.name.as_str())
    }

    /// Render as a JSON-Schema object
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for parameter in &self.parameters {
            let mut entry = match &parameter.kind {
                ParameterKind::Scalar(property_type) => {
                    let mut entry = json!({ "type": property_type.json_type() });
                    if *property_type == PropertyType::Date {
                        entry["format"] = json!("date");
                    }
                    entry
                }
                ParameterKind::Object(schema) => schema.to_json_schema(),
            };
            entry["description"] = json!(parameter.description);
            properties.insert(parameter.name.clone(), entry);
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required().collect::<Vec<_>>(),
        })
    }
}

/// Borrow the argument object of a call to `operation`.
///
/// `null` is read as an empty object so that argument-less operations can be
/// called without arguments.
pub(crate) fn argument_object<'a>(operation: &str, args: &'a Value) -> ValidationResult<Option<&'a Map<String, Value>>> {
    match args {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        _ => Err(ValidationError::NotAnObject(operation.to_string())),
    }
}

/// Read a required scalar argument and coerce it to `property_type`
pub(crate) fn required_argument(
    args: Option<&Map<String, Value>>,
    name: &str,
    property_type: PropertyType,
) -> ValidationResult<PropertyValue> {
    match args.and_then(|map| map.get(name)) {
        Some(Value::Null) | None => Err(ValidationError::MissingArgument(name.to_string())),
        Some(value) => property_type.coerce(name, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_shape() {
        let nested = ParameterSchema::empty()
            .scalar("role", PropertyType::String, "Job title", true)
            .scalar("since", PropertyType::Date, "Start date", true);
        let schema = ParameterSchema::empty()
            .scalar("from_Person_name", PropertyType::String, "The name of the FROM entity (Person)", true)
            .scalar("to_Company_id", PropertyType::Integer, "The id of the TO entity (Company)", true)
            .object("properties", nested, "Relationship properties", false);

        let rendered = schema.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["to_Company_id"]["type"], "integer");
        assert_eq!(rendered["properties"]["properties"]["type"], "object");
        assert_eq!(rendered["properties"]["properties"]["properties"]["since"]["format"], "date");
        assert_eq!(rendered["properties"]["properties"]["required"], json!(["role", "since"]));
        assert_eq!(rendered["required"], json!(["from_Person_name", "to_Company_id"]));
    }

    #[test]
    fn test_empty_schema() {
        let rendered = ParameterSchema::empty().to_json_schema();
        assert_eq!(rendered, json!({"type": "object", "properties": {}, "required": []}));
    }

    #[test]
    fn test_from_properties_uses_json_types() {
        let schema = ParameterSchema::from_properties(&[
            Property::new("name", PropertyType::String, "Name", true),
            Property::new("revenue", PropertyType::Float, "Revenue", false),
        ]);
        let rendered = schema.to_json_schema();
        assert_eq!(rendered["properties"]["revenue"]["type"], "number");
        assert_eq!(rendered["properties"]["revenue"]["description"], "Revenue");
        assert_eq!(schema.required().count(), 2);
    }

    #[test]
    fn test_argument_helpers() {
        assert!(matches!(
            argument_object("op", &json!([1])),
            Err(ValidationError::NotAnObject(_))
        ));
        assert!(argument_object("op", &Value::Null).unwrap().is_none());

        let args = json!({"id": "7", "empty": null});
        let map = argument_object("op", &args).unwrap();
        assert_eq!(
            required_argument(map, "id", PropertyType::Integer).unwrap(),
            PropertyValue::Integer(7)
        );
        assert_eq!(
            required_argument(map, "empty", PropertyType::String),
            Err(ValidationError::MissingArgument("empty".to_string()))
        );
        assert_eq!(
            required_argument(None, "id", PropertyType::String),
            Err(ValidationError::MissingArgument("id".to_string()))
        );
    }
}
