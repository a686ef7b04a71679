//! Character-based token estimation.
//!
//! One token is taken as ~4 characters of English text, which lands
//! within roughly 10% of real BPE tokenizers. That is precise enough
//! for history trimming, where the budget is a safety margin against
//! the backend's context window rather than an exact bill.

use crate::message::Message;

const CHARS_PER_TOKEN: usize = 4;

/// Per-message allowance for the role name and wire-format delimiters.
const MESSAGE_OVERHEAD: usize = 4;

/// Estimated token count of `text`, rounding up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(CHARS_PER_TOKEN)
}

/// Estimated cost of one message as the backend sees it.
pub fn estimate_message_tokens(message: &Message) -> usize {
    MESSAGE_OVERHEAD + estimate_tokens(&message.content)
}

/// Estimated cost of a message list.
pub fn estimate_messages_tokens(messages: &[Message]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_estimates_round_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("test"), 1);
        assert_eq!(estimate_tokens("hello"), 2);
        assert_eq!(estimate_tokens(&"a".repeat(100)), 25);
    }

    #[test]
    fn message_cost_includes_overhead() {
        // 4 chars of content -> 1 token, plus the per-message 4.
        assert_eq!(estimate_message_tokens(&Message::user("test")), 5);
    }

    #[test]
    fn list_cost_is_the_sum() {
        let messages = vec![Message::user("hello"), Message::assistant("world")];
        assert_eq!(estimate_messages_tokens(&messages), 12);
        assert_eq!(estimate_messages_tokens(&[]), 0);
    }
}
