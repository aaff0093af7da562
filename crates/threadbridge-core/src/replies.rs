// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned replies sent in place of assistant output.

/// Sent when a finished run left no assistant message.
pub const NO_REPLY_FALLBACK: &str = "Sorry, I didn't catch that. Could you do me a solid and send your message again? Thanks so much!";

/// Sent when the reply would exceed the platform's message length limit.
pub const TOO_LONG_FALLBACK: &str = "Hmm, my response is too long for Discord. Could you try breaking your message into smaller parts? I have a great memory so just ask me to take things one paragraph at a time!";

/// Sent when a run never reached a terminal status in time.
pub const GAVE_UP_FALLBACK: &str = "Sorry, I'm taking too long to think this one through. Could you send your message again in a moment?";

/// Discord's per-message character limit.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Length in characters of the longest canned reply.
///
/// Any configured reply limit must be at least this long, otherwise a
/// fallback could itself be rejected as too long.
pub fn longest_fallback_chars() -> usize {
    [NO_REPLY_FALLBACK, TOO_LONG_FALLBACK, GAVE_UP_FALLBACK]
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fallback_fits_the_discord_limit() {
        assert!(longest_fallback_chars() <= DISCORD_MESSAGE_LIMIT);
        assert_eq!(
            longest_fallback_chars(),
            TOO_LONG_FALLBACK.chars().count()
        );
    }
}
