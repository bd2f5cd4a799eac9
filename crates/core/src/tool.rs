//! Tool trait and the typed dispatch table that guards it.
//!
//! Tools are the read-only/computational capabilities agents call through the
//! completion service: weather lookups, itinerary builders, budget estimates.
//! Each tool declares a [`ToolSpec`]; the [`ToolRegistry`] validates arguments
//! against it before the implementation ever runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content (sent back to the LLM)
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// A successful result carrying structured data, pretty-printed as output.
    pub fn structured(data: serde_json::Value) -> Self {
        Self {
            success: true,
            output: serde_json::to_string_pretty(&data).unwrap_or_default(),
            data: Some(data),
        }
    }
}

/// Primitive parameter types a tool can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    StringList,
}

impl ParamType {
    fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| v.is_string())),
        }
    }

    fn json_schema(&self) -> serde_json::Value {
        match self {
            ParamType::String => serde_json::json!({ "type": "string" }),
            ParamType::Integer => serde_json::json!({ "type": "integer" }),
            ParamType::Number => serde_json::json!({ "type": "number" }),
            ParamType::Boolean => serde_json::json!({ "type": "boolean" }),
            ParamType::StringList => {
                serde_json::json!({ "type": "array", "items": { "type": "string" } })
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::StringList => "list of strings",
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    pub description: String,
}

/// A tool's name, description and parameter schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Declare a required parameter.
    pub fn required(self, name: &str, param_type: ParamType, description: &str) -> Self {
        self.param(name, param_type, true, description)
    }

    /// Declare an optional parameter.
    pub fn optional(self, name: &str, param_type: ParamType, description: &str) -> Self {
        self.param(name, param_type, false, description)
    }

    fn param(mut self, name: &str, param_type: ParamType, required: bool, description: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            param_type,
            required,
            description: description.to_string(),
        });
        self
    }

    /// Check the spec itself: non-empty name, unique parameter names.
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.name.trim().is_empty() {
            return Err(ToolError::InvalidSpec {
                tool_name: self.name.clone(),
                reason: "tool name must not be empty".into(),
            });
        }
        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(ToolError::InvalidSpec {
                    tool_name: self.name.clone(),
                    reason: format!("duplicate parameter '{}'", param.name),
                });
            }
        }
        Ok(())
    }

    /// Check call arguments against the declared schema.
    pub fn check_arguments(&self, arguments: &serde_json::Value) -> Result<(), ToolError> {
        let invalid = |reason: String| ToolError::InvalidArguments {
            tool_name: self.name.clone(),
            reason,
        };

        let object = arguments
            .as_object()
            .ok_or_else(|| invalid("arguments must be a JSON object".into()))?;

        for param in &self.params {
            match object.get(&param.name) {
                None | Some(serde_json::Value::Null) if param.required => {
                    return Err(invalid(format!("missing required field '{}'", param.name)));
                }
                None | Some(serde_json::Value::Null) => {}
                Some(value) if !param.param_type.matches(value) => {
                    return Err(invalid(format!(
                        "field '{}' must be a {}",
                        param.name,
                        param.param_type.label()
                    )));
                }
                Some(_) => {}
            }
        }

        if let Some(unknown) = object
            .keys()
            .find(|key| !self.params.iter().any(|p| &p.name == *key))
        {
            return Err(invalid(format!("unknown field '{unknown}'")));
        }

        Ok(())
    }

    /// Render the spec as a provider-facing definition (JSON Schema).
    pub fn to_definition(&self) -> ToolDefinition {
        let mut properties = serde_json::Map::new();
        for param in &self.params {
            let mut schema = param.param_type.json_schema();
            schema["description"] = serde_json::Value::String(param.description.clone());
            properties.insert(param.name.clone(), schema);
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// The core Tool trait.
///
/// Implementations are pure with respect to the core: they may consult
/// external data internally, but never mutate session state.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's schema. Read once, at registration.
    fn spec(&self) -> ToolSpec;

    /// Execute the tool with already-validated arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError>;
}

struct RegisteredTool {
    spec: ToolSpec,
    tool: Box<dyn Tool>,
}

/// A typed dispatch table of tools.
///
/// Built once at startup and shared behind an `Arc` afterwards; nothing can
/// be registered once it is shared.
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Fails if the name is taken or the spec is malformed.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let spec = tool.spec();
        spec.validate()?;
        if self.tools.contains_key(&spec.name) {
            return Err(ToolError::Duplicate(spec.name));
        }
        self.tools.insert(spec.name.clone(), RegisteredTool { spec, tool });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions for a subset of tools, in the order given. Unknown names
    /// are skipped.
    pub fn definitions_for<S: AsRef<str>>(&self, names: &[S]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|n| self.tools.get(n.as_ref()))
            .map(|t| t.spec.to_definition())
            .collect()
    }

    /// Validate and invoke a tool by name. The result is returned unchanged.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))?;
        entry.spec.check_arguments(&arguments)?;
        entry.tool.execute(arguments).await
    }

    /// Invoke on behalf of `agent`, which may only call tools in `allowed`.
    ///
    /// Out-of-scope calls fail with [`ToolError::ScopeViolation`] before the
    /// registry is even consulted.
    pub async fn invoke_scoped<S: AsRef<str>>(
        &self,
        agent: &str,
        allowed: &[S],
        call: &ToolCall,
    ) -> std::result::Result<ToolResult, ToolError> {
        if !allowed.iter().any(|a| a.as_ref() == call.name) {
            return Err(ToolError::ScopeViolation {
                agent: agent.to_string(),
                tool_name: call.name.clone(),
            });
        }
        self.invoke(&call.name, call.arguments.clone()).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
