use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::agent::prompt::assemble;
use crate::agent::ConversationAgent;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::llm::openai_compatible::OpenAiCompatibleProvider;
use crate::llm::provider::{ChatProvider, Message, MessageContent, MessageRole};
use crate::models::profile::PetProfile;
use crate::tools::definition::{definitions, ToolCall, ToolDefinition, ToolResult};
use crate::tools::executor::ToolExecutor;
use crate::tools::search::{HttpProductSearch, ProductSearch};

const PERSONA: &str = "#角色
你是一个专业的宠物营养师，你会针对如下的内容为用户提供建议:
- 宠物的饮食和营养需求
- 主粮推荐和饮食规划
- 体重管理
- 营养补充，保健品
- 过敏等注意事项
请始终结合宠物的档案信息进行综合考虑和回答。
你的说话风格应当像一个真人客服，简短明了，不乱添加表情或特殊符号。";

/// Returned to the end user when the model backend fails the whole turn.
const FALLBACK_REPLY: &str = "抱歉，系统暂时出了点小问题，请稍后再试一下。";

/// The turn state machine: one dispatch round that may request tools, then at
/// most one resolve round. A third round of tool calls is never processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnPhase {
    Dispatch,
    Resolve,
}

pub struct NutritionistAgent {
    llm: Arc<dyn ChatProvider>,
    executor: ToolExecutor,
    tools: Vec<ToolDefinition>,
    persona: String,
    temperature: f64,
    max_tokens: u32,
    max_tool_calls: usize,
}

impl NutritionistAgent {
    pub fn new(cfg: &AgentConfig) -> Result<Self, AgentError> {
        let llm = Arc::new(OpenAiCompatibleProvider::new(&cfg.llm)?);
        let search = Arc::new(HttpProductSearch::new(&cfg.search)?);
        Ok(Self::with_backends(llm, search, cfg))
    }

    /// Wire the agent onto explicit backends; used by tests and by callers
    /// that manage their own clients.
    pub fn with_backends(
        llm: Arc<dyn ChatProvider>,
        search: Arc<dyn ProductSearch>,
        cfg: &AgentConfig,
    ) -> Self {
        Self {
            llm,
            executor: ToolExecutor::new(search),
            tools: definitions(),
            persona: PERSONA.to_string(),
            temperature: cfg.llm.temperature,
            max_tokens: cfg.llm.max_tokens,
            max_tool_calls: cfg.max_tool_calls,
        }
    }

    /// `respond`, with a fatal upstream failure converted into a generic
    /// apologetic reply instead of an error surfaced to the end user.
    pub async fn respond_with_fallback(
        &self,
        transcript: &[Message],
        profile: &PetProfile,
    ) -> String {
        match self.respond(transcript, profile).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "turn failed, sending fallback reply");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Execute the requested tool calls in emission order, bounded by
    /// `max_tool_calls`. Calls past the cap are not executed but still get a
    /// correlated error result so every emitted id is answered.
    async fn resolve_tool_calls(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for (idx, call) in calls.iter().enumerate() {
            if idx >= self.max_tool_calls {
                warn!(tool = %call.name, cap = self.max_tool_calls, "tool call over cap, skipping");
                results.push(ToolResult {
                    tool_call_id: call.id.clone(),
                    name: call.name.clone(),
                    ok: false,
                    output: serde_json::json!({}),
                    error: Some(format!(
                        "tool call limit of {} reached",
                        self.max_tool_calls
                    )),
                });
                continue;
            }
            results.push(self.executor.execute(call).await);
        }
        results
    }
}

#[async_trait]
impl ConversationAgent for NutritionistAgent {
    fn system_prompt(&self) -> &str {
        &self.persona
    }

    async fn respond(
        &self,
        transcript: &[Message],
        profile: &PetProfile,
    ) -> Result<String, AgentError> {
        let mut messages = assemble(transcript, &self.persona, profile);
        let mut phase = TurnPhase::Dispatch;

        loop {
            let response = self
                .llm
                .chat_with_tools(
                    messages.clone(),
                    &self.tools,
                    self.temperature,
                    self.max_tokens,
                )
                .await?;

            match phase {
                // Tool calls take precedence over any accompanying text.
                TurnPhase::Dispatch if !response.tool_calls.is_empty() => {
                    debug!(count = response.tool_calls.len(), "resolving tool calls");
                    messages.push(Message {
                        role: MessageRole::Assistant,
                        content: MessageContent::Text(response.content),
                        tool_call_id: None,
                        tool_calls: Some(response.tool_calls.clone()),
                    });

                    for result in self.resolve_tool_calls(&response.tool_calls).await {
                        let payload = serde_json::to_string(&result.payload())
                            .unwrap_or_else(|_| r#"{"error":"unserializable result"}"#.to_string());
                        messages.push(Message::tool(result.tool_call_id.clone(), payload));
                    }

                    phase = TurnPhase::Resolve;
                }
                // Direct answer, or the single-hop resolve round: return the
                // text verbatim either way.
                TurnPhase::Dispatch | TurnPhase::Resolve => {
                    return Ok(response.content);
                }
            }
        }
    }
}
