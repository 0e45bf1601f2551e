//! Tool schemas advertised to the agent.

use serde::{Deserialize, Serialize};

/// Parameter every tool accepts to pick the output rendering
pub const FORMAT_PARAM: &str = "format";

/// Credential a tool needs before any backend call is made
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// No credential required (backend API rules still apply)
    #[default]
    Public,
    /// Any authenticated credential
    Authenticated,
    /// Superuser credential
    Admin,
}

/// Schema for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// What the tool does, shown to the agent
    pub description: String,
    /// Parameter properties, as JSON Schema
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Required parameter names
    pub required: Vec<String>,
    /// Credential needed before the call
    pub access: Access,
}

impl ToolSchema {
    /// Create a new tool schema
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
            access: Access::Public,
        }
    }

    /// Add an optional parameter
    #[must_use]
    pub fn with_param(mut self, name: &str, schema: serde_json::Value) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    /// Add a required parameter
    #[must_use]
    pub fn with_required(mut self, name: &str, schema: serde_json::Value) -> Self {
        self.properties.insert(name.to_string(), schema);
        self.required.push(name.to_string());
        self
    }

    /// Set the required credential
    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// JSON Schema of the input object, including the `format` parameter
    #[must_use]
    pub fn input_schema(&self) -> serde_json::Value {
        let mut properties = self.properties.clone();
        properties.insert(
            FORMAT_PARAM.to_string(),
            serde_json::json!({
                "type": "string",
                "enum": ["compact", "json"],
                "default": "compact",
                "description": "Output format: compact (TOML, fewer tokens) or json"
            }),
        );
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
        })
    }

    /// Descriptor for `tools/list`
    #[must_use]
    pub fn descriptor(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

/// JSON Schema fragments for parameters
pub mod param {
    use serde_json::{Value, json};

    /// String parameter
    #[must_use]
    pub fn string(description: &str) -> Value {
        json!({ "type": "string", "description": description })
    }

    /// Integer parameter with bounds
    #[must_use]
    pub fn integer(description: &str, minimum: u32, maximum: Option<u32>) -> Value {
        let mut schema = json!({ "type": "integer", "description": description, "minimum": minimum });
        if let Some(max) = maximum {
            schema["maximum"] = json!(max);
        }
        schema
    }

    /// Object parameter
    #[must_use]
    pub fn object(description: &str) -> Value {
        json!({ "type": "object", "description": description })
    }

    /// Array parameter
    #[must_use]
    pub fn array(description: &str) -> Value {
        json!({ "type": "array", "description": description, "items": { "type": "object" } })
    }
}
