pub mod nutritionist;
pub mod prompt;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::provider::Message;
use crate::models::profile::PetProfile;

/// Capability contract for a conversational agent persona.
#[async_trait]
pub trait ConversationAgent: Send + Sync {
    fn system_prompt(&self) -> &str;

    /// Produce the next assistant utterance for the given transcript and
    /// subject profile, invoking tools as needed.
    async fn respond(
        &self,
        transcript: &[Message],
        profile: &PetProfile,
    ) -> Result<String, AgentError>;
}
