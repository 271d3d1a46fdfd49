use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::llm::provider::{Message, MessageContent, MessageRole};

/// One stored conversation turn, timestamped at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTurn {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
}

/// Volatile transcript storage keyed by conversation id.
///
/// Owned by the relay layer and handed to it explicitly; the agent core
/// itself stays stateless between calls. Everything here is lost when the
/// process exits.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Vec<StoredTurn>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(
        &self,
        conversation: Uuid,
        role: MessageRole,
        content: impl Into<MessageContent>,
    ) -> StoredTurn {
        let turn = StoredTurn {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .entry(conversation)
            .or_default()
            .push(turn.clone());
        turn
    }

    pub async fn history(&self, conversation: Uuid) -> Vec<StoredTurn> {
        self.sessions
            .read()
            .await
            .get(&conversation)
            .cloned()
            .unwrap_or_default()
    }

    /// The conversation as plain chat messages, ready for `respond`.
    pub async fn transcript(&self, conversation: Uuid) -> Vec<Message> {
        self.history(conversation)
            .await
            .into_iter()
            .map(|turn| Message {
                role: turn.role,
                content: turn.content,
                tool_call_id: None,
                tool_calls: None,
            })
            .collect()
    }

    pub async fn clear(&self, conversation: Uuid) {
        self.sessions.write().await.remove(&conversation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_preserves_append_order() {
        let store = SessionStore::new();
        let conv = Uuid::new_v4();

        store.append(conv, MessageRole::User, "你好").await;
        store.append(conv, MessageRole::Assistant, "你好宝子").await;

        let history = store.history(conv).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert!(history[0].timestamp <= history[1].timestamp);
    }

    #[tokio::test]
    async fn conversations_are_isolated() {
        let store = SessionStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.append(a, MessageRole::User, "a 的消息").await;

        assert_eq!(store.history(a).await.len(), 1);
        assert!(store.history(b).await.is_empty());

        store.clear(a).await;
        assert!(store.history(a).await.is_empty());
    }

    #[tokio::test]
    async fn transcript_maps_to_plain_messages() {
        let store = SessionStore::new();
        let conv = Uuid::new_v4();
        store.append(conv, MessageRole::User, "lucky 怎么样").await;

        let transcript = store.transcript(conv).await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].content.as_text(), "lucky 怎么样");
        assert!(transcript[0].tool_call_id.is_none());
    }
}
