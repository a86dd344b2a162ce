//! History windowing.
//!
//! Flattens the chat surface transcript into the turns the model sees.

use copilot_core::{ChatTurn, ModelMessage, Role, UiMessage, UiRole};

/// Default number of trailing turns kept for the model.
pub const DEFAULT_HISTORY_WINDOW: usize = 12;

/// Text of the most recent user message that has any.
pub fn latest_user_text(messages: &[UiMessage]) -> String {
    messages
        .iter()
        .rev()
        .filter(|m| m.role == UiRole::User)
        .map(UiMessage::text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// The trailing `window` user/assistant messages as chat turns.
pub fn build_history(messages: &[UiMessage], window: usize) -> Vec<ChatTurn> {
    let recent: Vec<&UiMessage> = messages
        .iter()
        .filter(|m| matches!(m.role, UiRole::User | UiRole::Assistant))
        .collect();
    let skip = recent.len().saturating_sub(window);

    recent[skip..]
        .iter()
        .map(|message| {
            let role = match message.role {
                UiRole::Assistant => Role::Assistant,
                _ => Role::User,
            };
            ChatTurn {
                role,
                content: message.text(),
                label: message.metadata_str("label"),
                mode: message.metadata_str("mode"),
                timestamp: message.metadata_str("timestamp"),
            }
        })
        .collect()
}

/// Model messages preceding the new user turn.
///
/// A trailing user turn is dropped since the caller re-adds it as the new turn;
/// turns without content are skipped.
pub fn contextual_messages(history: &[ChatTurn]) -> Vec<ModelMessage> {
    let mut turns = history;
    if let Some((last, rest)) = turns.split_last() {
        if last.role == Role::User {
            turns = rest;
        }
    }
    turns
        .iter()
        .filter(|turn| !turn.content.is_empty())
        .map(|turn| ModelMessage::text(turn.role, turn.content.clone()))
        .collect()
}
