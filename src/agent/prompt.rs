use crate::llm::provider::{ContentPart, Message, MessageContent, MessageRole};
use crate::models::profile::PetProfile;

/// Appended when the transcript would otherwise end on the assistant's own
/// turn, to satisfy the strict user/assistant alternation chat backends
/// require.
const CONTINUE_INSTRUCTION: &str =
    "请根据宠物档案信息和对话历史，以「营养师」的视角继续发言，直接输出你的回复，不要生成多余内容。";

const PROFILE_HEADER: &str = "#宠物档案信息";

/// Build the full message sequence for one model call: a leading system turn
/// (persona + profile block) followed by the transcript with image payloads
/// normalized. Pure; the caller's transcript is never mutated.
pub fn assemble(transcript: &[Message], persona: &str, profile: &PetProfile) -> Vec<Message> {
    let mut system = String::from(persona);
    system.push('\n');
    system.push_str(PROFILE_HEADER);
    system.push('\n');
    system.push_str(&profile.render());

    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(Message::system(system));

    for turn in transcript {
        messages.push(normalize_turn(turn));
    }

    if matches!(transcript.last(), Some(m) if m.role == MessageRole::Assistant) {
        messages.push(Message::user(CONTINUE_INSTRUCTION));
    }

    messages
}

fn normalize_turn(turn: &Message) -> Message {
    let content = match &turn.content {
        MessageContent::Text(s) => MessageContent::Text(s.clone()),
        MessageContent::Parts(parts) => MessageContent::Parts(
            parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text { text } => ContentPart::Text { text: text.clone() },
                    ContentPart::Image { data } => ContentPart::Image {
                        data: strip_data_url_prefix(data),
                    },
                })
                .collect(),
        ),
    };

    Message {
        role: turn.role,
        content,
        tool_call_id: turn.tool_call_id.clone(),
        tool_calls: turn.tool_calls.clone(),
    }
}

/// Front-ends sometimes hand over `data:image/png;base64,...` URLs; the model
/// wants only the trailing base64 payload.
fn strip_data_url_prefix(data: &str) -> String {
    if data.starts_with("data:") {
        if let Some(idx) = data.find(',') {
            return data[idx + 1..].to_string();
        }
    }
    data.to_string()
}
