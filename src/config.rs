use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub bearer_token: String,
    pub user_id: String,
    #[serde(default = "default_search_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model_id() -> String {
    "glm-4.5v".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_search_timeout_secs() -> u64 {
    30
}

fn default_max_tool_calls() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: AgentConfig = serde_json::from_str(
            r#"{
                "llm": { "api_key": "sk-test" },
                "search": {
                    "endpoint": "https://search.example.com/api/search",
                    "bearer_token": "tok",
                    "user_id": "u-1"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.llm.model_id, "glm-4.5v");
        assert_eq!(cfg.llm.temperature, 0.7);
        assert_eq!(cfg.llm.max_tokens, 4096);
        assert_eq!(cfg.max_tool_calls, 8);
        assert_eq!(cfg.search.request_timeout_secs, 30);
    }
}
