//! Conversation titles derived from the first user message.

pub const MAX_TITLE_CHARS: usize = 80;

/// Prompt sent to the model to name a conversation.
pub fn title_prompt(seed: &str) -> String {
    format!(
        "Generate a short, descriptive title (at most five words) for a conversation \
that starts with the message below. Reply with the title only, without quotes \
or punctuation at the end.\n\nMessage:\n{}",
        seed.trim()
    )
}

/// Normalizes raw model output into a single-line title.
///
/// Returns `None` when nothing usable is left.
pub fn clean_title(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|line| !line.is_empty())?;

    let mut title = line.trim_matches(|c: char| matches!(c, '#' | '*' | '_')).trim();
    for prefix in ["Title:", "title:", "TITLE:"] {
        if let Some(rest) = title.strip_prefix(prefix) {
            title = rest;
        }
    }

    loop {
        let trimmed = title
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '_' | '`' | '“' | '”'))
            .trim_end_matches(['.', '!', ':', ';', ','])
            .trim();
        if trimmed == title {
            break;
        }
        title = trimmed;
    }

    if title.is_empty() {
        return None;
    }

    Some(truncate_title(title))
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    title
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_seed() {
        let prompt = title_prompt("  How do lifetimes work?  ");
        assert!(prompt.ends_with("How do lifetimes work?"));
        assert!(prompt.contains("five words"));
    }

    #[test]
    fn strips_quotes_and_prefixes() {
        assert_eq!(clean_title("\"Greeting\"").as_deref(), Some("Greeting"));
        assert_eq!(
            clean_title("Title: Rust Lifetimes Explained.").as_deref(),
            Some("Rust Lifetimes Explained")
        );
        assert_eq!(clean_title("## **Trip Planning**").as_deref(), Some("Trip Planning"));
    }

    #[test]
    fn strips_nested_decoration() {
        assert_eq!(clean_title("Title: \"Greeting\".").as_deref(), Some("Greeting"));
        assert_eq!(clean_title("**Title:** Greeting").as_deref(), Some("Greeting"));
        assert_eq!(clean_title("*\"Rust Traits!\"*").as_deref(), Some("Rust Traits"));
    }

    #[test]
    fn keeps_first_non_empty_line() {
        assert_eq!(
            clean_title("\n\n  Weekend Recipes\nHere is why I chose it").as_deref(),
            Some("Weekend Recipes")
        );
    }

    #[test]
    fn empty_output_is_none() {
        assert_eq!(clean_title(""), None);
        assert_eq!(clean_title("   \n  "), None);
        assert_eq!(clean_title("\"\""), None);
    }

    #[test]
    fn long_titles_are_truncated() {
        let long = "word ".repeat(40);
        let title = clean_title(&long).unwrap();
        assert!(title.chars().count() <= MAX_TITLE_CHARS);
        assert!(!title.ends_with(' '));
    }
}
