use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::error::AgentError;
use crate::tools::definition::{ToolCall, ToolResult, FOOD_SEARCH_TOOL, SUPPLEMENT_SEARCH_TOOL};
use crate::tools::search::{Dataset, ProductSearch};

const DEFAULT_PAGE_NUMBER: u64 = 1;
const DEFAULT_PAGE_SIZE: u64 = 10;

/// Resolves tool invocations against the product-search backend.
///
/// `execute` never fails: argument and search errors are folded into an
/// `ok: false` result so the orchestrator can hand the model an inline error
/// payload instead of aborting the turn.
#[derive(Clone)]
pub struct ToolExecutor {
    search: Arc<dyn ProductSearch>,
}

impl ToolExecutor {
    pub fn new(search: Arc<dyn ProductSearch>) -> Self {
        Self { search }
    }

    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let outcome = self.run(&call.name, &call.arguments).await;

        match outcome {
            Ok(output) => ToolResult {
                tool_call_id: call.id.clone(),
                name: call.name.clone(),
                ok: true,
                output,
                error: None,
            },
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool invocation failed");
                ToolResult {
                    tool_call_id: call.id.clone(),
                    name: call.name.clone(),
                    ok: false,
                    output: serde_json::json!({}),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn run(&self, tool_name: &str, args: &Value) -> Result<Value, AgentError> {
        let dataset = match tool_name {
            FOOD_SEARCH_TOOL => Dataset::Food,
            SUPPLEMENT_SEARCH_TOOL => Dataset::Supplement,
            other => {
                return Err(AgentError::Argument(format!("unknown tool '{other}'")));
            }
        };

        let query = as_str(args, "query")
            .ok_or_else(|| AgentError::Argument("missing required 'query'".to_string()))?;
        let page_number = as_u64(args, "page_number").unwrap_or(DEFAULT_PAGE_NUMBER);
        let page_size = as_u64(args, "page_size").unwrap_or(DEFAULT_PAGE_SIZE);

        self.search
            .search(dataset, &query, page_number, page_size)
            .await
    }
}

fn as_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn as_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(|v| v.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSearch {
        calls: Mutex<Vec<(Dataset, String, u64, u64)>>,
        fail: bool,
    }

    #[async_trait]
    impl ProductSearch for RecordingSearch {
        async fn search(
            &self,
            dataset: Dataset,
            query: &str,
            page_number: u64,
            page_size: u64,
        ) -> Result<Value, AgentError> {
            self.calls
                .lock()
                .unwrap()
                .push((dataset, query.to_string(), page_number, page_size));
            if self.fail {
                Err(AgentError::Search("connection refused".to_string()))
            } else {
                Ok(serde_json::json!({ "items": [], "total": 0 }))
            }
        }
    }

    fn call(name: &str, args: Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: args,
        }
    }

    #[tokio::test]
    async fn paging_defaults_apply() {
        let search = Arc::new(RecordingSearch::default());
        let executor = ToolExecutor::new(search.clone());

        let result = executor
            .execute(&call(
                FOOD_SEARCH_TOOL,
                serde_json::json!({ "query": "high fiber senior cat food" }),
            ))
            .await;

        assert!(result.ok);
        let calls = search.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            (
                Dataset::Food,
                "high fiber senior cat food".to_string(),
                1,
                10
            )
        );
    }

    #[tokio::test]
    async fn explicit_paging_passes_through() {
        let search = Arc::new(RecordingSearch::default());
        let executor = ToolExecutor::new(search.clone());

        executor
            .execute(&call(
                SUPPLEMENT_SEARCH_TOOL,
                serde_json::json!({ "query": "鱼油", "page_number": 3, "page_size": 5 }),
            ))
            .await;

        let calls = search.calls.lock().unwrap();
        assert_eq!(calls[0], (Dataset::Supplement, "鱼油".to_string(), 3, 5));
    }

    #[tokio::test]
    async fn missing_query_degrades_to_error_result() {
        let search = Arc::new(RecordingSearch::default());
        let executor = ToolExecutor::new(search.clone());

        let result = executor
            .execute(&call(FOOD_SEARCH_TOOL, serde_json::json!({})))
            .await;

        assert!(!result.ok);
        assert!(result.error.as_deref().unwrap().contains("query"));
        assert!(search.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_degrades_to_error_result() {
        let executor = ToolExecutor::new(Arc::new(RecordingSearch::default()));

        let result = executor
            .execute(&call("search_toys", serde_json::json!({ "query": "ball" })))
            .await;

        assert!(!result.ok);
        assert!(result.error.as_deref().unwrap().contains("search_toys"));
    }

    #[tokio::test]
    async fn search_failure_is_folded_not_propagated() {
        let search = Arc::new(RecordingSearch {
            fail: true,
            ..Default::default()
        });
        let executor = ToolExecutor::new(search);

        let result = executor
            .execute(&call(FOOD_SEARCH_TOOL, serde_json::json!({ "query": "猫粮" })))
            .await;

        assert!(!result.ok);
        assert_eq!(
            result.payload(),
            serde_json::json!({ "error": "search backend error: connection refused" })
        );
    }
}
