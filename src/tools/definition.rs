use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FOOD_SEARCH_TOOL: &str = "search_pet_food_recommendations";
pub const SUPPLEMENT_SEARCH_TOOL: &str = "search_pet_supplement_recommendations";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    pub ok: bool,
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// The JSON payload attached to the tool turn: the raw output on success,
    /// an `{"error": ...}` object on failure.
    pub fn payload(&self) -> Value {
        if self.ok {
            self.output.clone()
        } else {
            serde_json::json!({
                "error": self.error.clone().unwrap_or_else(|| "tool failed".to_string())
            })
        }
    }
}

/// The static tool registry: two product-search tools, identical across all
/// calls.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: FOOD_SEARCH_TOOL.to_string(),
            description: "根据关键词搜索宠物主粮商品，返回商品名称、卖点和价格等信息。"
                .to_string(),
            parameters: search_parameters_schema(),
        },
        ToolDefinition {
            name: SUPPLEMENT_SEARCH_TOOL.to_string(),
            description: "根据关键词搜索宠物营养补充剂和保健品商品，返回商品名称、卖点和价格等信息。"
                .to_string(),
            parameters: search_parameters_schema(),
        },
    ]
}

fn search_parameters_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "搜索关键词，例如 \"高纤维 老年猫 猫粮\""
            },
            "page_number": {
                "type": "integer",
                "description": "页码，从 1 开始",
                "minimum": 1
            },
            "page_size": {
                "type": "integer",
                "description": "每页返回的商品数量",
                "minimum": 1
            }
        },
        "required": ["query"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_both_search_tools() {
        let defs = definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![FOOD_SEARCH_TOOL, SUPPLEMENT_SEARCH_TOOL]);
        for def in &defs {
            assert_eq!(def.parameters["required"][0], "query");
        }
    }

    #[test]
    fn failed_result_payload_is_error_object() {
        let result = ToolResult {
            tool_call_id: "call_1".to_string(),
            name: FOOD_SEARCH_TOOL.to_string(),
            ok: false,
            output: serde_json::json!({}),
            error: Some("connection refused".to_string()),
        };
        assert_eq!(
            result.payload(),
            serde_json::json!({ "error": "connection refused" })
        );
    }
}
