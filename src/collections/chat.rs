use tracing::warn;

use super::models::{ChatMessage, ChatRole};
use crate::gateway::TextGenerator;
use crate::persistence::StateContainer;

/// Prefix of an assistant message that reports a failed call.
pub const ERROR_MARKER: &str = "❌ ";

/// Append `text` as a user message, ask the gateway and append its reply.
///
/// A gateway failure becomes an assistant message starting with
/// [`ERROR_MARKER`]. Blank input is ignored.
pub async fn ask(
    container: &mut StateContainer,
    generator: &dyn TextGenerator,
    text: &str,
) -> Option<ChatMessage> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    container.mutate(|s| s.add_chat_message(ChatRole::User, text));

    let reply = match generator.generate(text).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "chat request failed");
            format!("{ERROR_MARKER}{e}")
        }
    };
    Some(container.mutate(|s| s.add_chat_message(ChatRole::Assistant, reply)))
}
