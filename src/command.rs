//! Chat command parsing for the producer side of the queue.
//!
//! Extracts a generation prompt from `!anime ...` messages. The prompt may
//! be given bare (`!anime robot cat doing ballet`) or double-quoted
//! (`!anime "fire sword"`), with `\"` as an escaped quote inside.
//! `!queue` asks for the current queue status.

/// Command prefix, matched case-insensitively.
pub const COMMAND_PREFIX: &str = "!anime";

pub const STATUS_COMMAND: &str = "!queue";

/// Whether the message is a queue status request.
pub fn is_status_command(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(STATUS_COMMAND)
}

/// Extract the prompt from a chat message.
///
/// Returns `None` when the message is not a generation command or the
/// prompt is empty.
pub fn parse_generate_command(message: &str) -> Option<String> {
    let stripped = message.trim();
    let head = stripped.get(..COMMAND_PREFIX.len())?;
    if !head.eq_ignore_ascii_case(COMMAND_PREFIX) {
        return None;
    }

    let remainder = stripped[COMMAND_PREFIX.len()..].trim();
    if remainder.is_empty() {
        return None;
    }

    match remainder.strip_prefix('"') {
        Some(quoted) => parse_quoted(quoted),
        None => Some(remainder.to_string()),
    }
}

/// `body` is everything after the opening quote.
fn parse_quoted(body: &str) -> Option<String> {
    let mut prev = '"';
    for (idx, ch) in body.char_indices() {
        if ch == '"' && prev != '\\' {
            let inner = body[..idx].replace("\\\"", "\"");
            return non_empty(inner);
        }
        prev = ch;
    }
    // Unterminated quote: take the rest as a bare prompt.
    non_empty(body.trim().to_string())
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// One line of chat as read by the CLI: `submitter: message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine<'a> {
    pub submitter: &'a str,
    pub text: &'a str,
}

impl<'a> ChatLine<'a> {
    /// Split `line` at the first colon. Lines without a submitter are ignored.
    pub fn parse(line: &'a str) -> Option<Self> {
        let (submitter, text) = line.split_once(':')?;
        let submitter = submitter.trim();
        if submitter.is_empty() {
            return None;
        }
        Some(Self { submitter, text: text.trim() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_prompt() {
        assert_eq!(
            parse_generate_command("!anime robot cat doing ballet").as_deref(),
            Some("robot cat doing ballet")
        );
    }

    #[test]
    fn quoted_prompt() {
        assert_eq!(parse_generate_command("!anime \"fire sword\"").as_deref(), Some("fire sword"));
    }

    #[test]
    fn quoted_prompt_ignores_trailing_text() {
        assert_eq!(
            parse_generate_command("!anime \"fire sword\" please").as_deref(),
            Some("fire sword")
        );
    }

    #[test]
    fn escaped_quotes_are_unescaped() {
        assert_eq!(
            parse_generate_command(r#"!anime "a \"big\" cat""#).as_deref(),
            Some(r#"a "big" cat"#)
        );
    }

    #[test]
    fn unterminated_quote_falls_back_to_bare() {
        assert_eq!(parse_generate_command("!anime \"fire sword ").as_deref(), Some("fire sword"));
    }

    #[test]
    fn prefix_is_case_insensitive() {
        assert_eq!(parse_generate_command("  !ANIME  neon city ").as_deref(), Some("neon city"));
    }

    #[test]
    fn non_commands_and_empty_prompts() {
        assert_eq!(parse_generate_command("hey everyone!"), None);
        assert_eq!(parse_generate_command("!anime"), None);
        assert_eq!(parse_generate_command("!anime    "), None);
        assert_eq!(parse_generate_command("!anime \"\""), None);
        assert_eq!(parse_generate_command("!anim"), None);
    }

    #[test]
    fn multibyte_message_does_not_panic() {
        assert_eq!(parse_generate_command("日本語のメッセージ"), None);
        assert_eq!(parse_generate_command("!anime \"猫\"").as_deref(), Some("猫"));
    }

    #[test]
    fn status_command() {
        assert!(is_status_command(" !Queue "));
        assert!(!is_status_command("!queue now"));
    }

    #[test]
    fn chat_line_splits_at_first_colon() {
        let line = ChatLine::parse("alice: !anime a: b").unwrap();
        assert_eq!(line.submitter, "alice");
        assert_eq!(line.text, "!anime a: b");
        assert_eq!(ChatLine::parse("no colon here"), None);
        assert_eq!(ChatLine::parse(" : text"), None);
    }
}
