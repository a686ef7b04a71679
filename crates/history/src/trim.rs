//! History trimming under a token budget.
//!
//! Strategy: keep the most recent messages, include the system message
//! unconditionally, start the kept window at a user turn, and never
//! split a user/assistant pair. Token counts come from the caller so
//! the measurement matches whatever backend will receive the messages.

use oxpecker_core::error::HistoryError;
use oxpecker_core::message::{Message, Role};

/// Trim `messages` to fit `max_tokens`.
///
/// `messages[0]` must be the session's system message; it is always
/// kept. The surviving window is the largest suffix that starts on a
/// user turn and fits the budget together with the system message.
/// Trimming is idempotent: re-trimming the output with the same budget
/// returns it unchanged.
///
/// Returns `BudgetTooSmall` if the system message alone exceeds the
/// budget — there is no valid window at all in that case.
pub fn trim<F>(
    messages: &[Message],
    max_tokens: usize,
    count_tokens: F,
) -> Result<Vec<Message>, HistoryError>
where
    F: Fn(&[Message]) -> usize,
{
    let Some((system, rest)) = messages.split_first() else {
        return Ok(Vec::new());
    };

    if count_tokens(std::slice::from_ref(system)) > max_tokens {
        return Err(HistoryError::BudgetTooSmall { budget: max_tokens });
    }

    // Candidate window starts: every user turn after the system
    // message, earliest first. The first one that fits wins, keeping
    // the largest suffix.
    for (offset, message) in rest.iter().enumerate() {
        if message.role != Role::User {
            continue;
        }

        let mut candidate = Vec::with_capacity(1 + rest.len() - offset);
        candidate.push(system.clone());
        candidate.extend_from_slice(&rest[offset..]);

        if count_tokens(&candidate) <= max_tokens {
            return Ok(candidate);
        }
    }

    // Nothing fits alongside the system message.
    Ok(vec![system.clone()])
}
