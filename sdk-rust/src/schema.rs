//! Typed description of the structured output a caller demands from a model.
//!
//! An [`OutputContract`] is rendered into a single function tool whose
//! parameters are a JSON Schema object. Callers then force the model to call
//! exactly that tool, which turns free-form model output into arguments that
//! can be decoded deterministically.

use crate::{JSONSchema, Tool, ToolChoiceOption, ToolChoiceTool};
use serde_json::{json, Map, Value};

/// Semantic type of a single contract field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    String,
    Number,
    Boolean,
    Array(Box<SchemaKind>),
}

impl SchemaKind {
    #[must_use]
    pub fn array_of(item: Self) -> Self {
        Self::Array(Box::new(item))
    }

    fn to_json_schema(&self, description: Option<&str>) -> JSONSchema {
        let mut schema = match self {
            Self::String => json!({ "type": "string" }),
            Self::Number => json!({ "type": "number" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Array(item) => json!({
                "type": "array",
                "items": item.to_json_schema(None),
            }),
        };
        if let (Some(description), Some(object)) = (description, schema.as_object_mut()) {
            object.insert(
                "description".to_string(),
                Value::String(description.to_string()),
            );
        }
        schema
    }
}

/// A named, typed argument of an [`OutputContract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub kind: SchemaKind,
    pub description: String,
    pub required: bool,
}

impl SchemaField {
    pub fn required(
        name: impl Into<String>,
        kind: SchemaKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        kind: SchemaKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// The single operation a model must invoke to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputContract {
    pub name: String,
    pub description: String,
    pub fields: Vec<SchemaField>,
}

impl OutputContract {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    /// Render the fields as a JSON Schema object.
    #[must_use]
    pub fn parameters(&self) -> JSONSchema {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.clone(),
                field.kind.to_json_schema(Some(&field.description)),
            );
        }

        let required: Vec<Value> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| Value::String(field.name.clone()))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    #[must_use]
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters(),
        }
    }

    /// Tool choice that forces the model to call this contract's tool.
    #[must_use]
    pub fn tool_choice(&self) -> ToolChoiceOption {
        ToolChoiceOption::Tool(ToolChoiceTool {
            tool_name: self.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles_contract() -> OutputContract {
        OutputContract::new("get_styles", "List styles.")
            .field(SchemaField::required(
                "coffees",
                SchemaKind::array_of(SchemaKind::String),
                "Style names.",
            ))
            .field(SchemaField::required(
                "failed",
                SchemaKind::Boolean,
                "Whether the task failed.",
            ))
            .field(SchemaField::optional("note", SchemaKind::String, "Free text."))
    }

    #[test]
    fn parameters_render_object_schema() {
        let schema = styles_contract().parameters();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["coffees"]["type"], "array");
        assert_eq!(schema["properties"]["coffees"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["coffees"]["description"], "Style names.");
        assert_eq!(schema["properties"]["failed"]["type"], "boolean");
        assert_eq!(schema["required"], json!(["coffees", "failed"]));
    }

    #[test]
    fn tool_and_choice_share_contract_name() {
        let contract = styles_contract();
        let tool = contract.to_tool();

        assert_eq!(tool.name, "get_styles");
        assert_eq!(tool.description, "List styles.");
        assert_eq!(
            contract.tool_choice(),
            ToolChoiceOption::Tool(ToolChoiceTool {
                tool_name: "get_styles".to_string()
            })
        );
    }
}
