//! Pet-nutrition advisory agent core.
//!
//! Given a linear conversation transcript and a static pet profile, the
//! [`NutritionistAgent`] produces the next assistant utterance by calling an
//! OpenAI-compatible chat backend, resolving at most one round of
//! product-search tool calls before the final answer.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod session;
pub mod tools;

pub use agent::nutritionist::NutritionistAgent;
pub use agent::ConversationAgent;
pub use config::{AgentConfig, LlmConfig, SearchConfig};
pub use error::AgentError;
pub use llm::provider::{ChatProvider, ContentPart, Message, MessageContent, MessageRole};
pub use models::profile::PetProfile;
pub use session::SessionStore;
pub use tools::search::{Dataset, ProductSearch};
