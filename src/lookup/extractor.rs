//! Pulls the target user reference out of a request

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@([A-Z0-9]+)(?:\|[^>]*)?>").expect("valid regex"));

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([a-zA-Z0-9._-]+)").expect("valid regex"));

static POSSESSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)['’]s\b").expect("valid regex"));

/// Words that carry the request rather than the name
const REQUEST_VOCABULARY: &[&str] = &[
    "a", "address", "an", "and", "can", "could", "do", "does", "email", "for", "get", "give",
    "her", "his", "i", "id", "is", "know", "mail", "me", "need", "of", "please", "plz", "pls",
    "send", "share", "someone", "tell", "the", "their", "to", "us", "what", "whats",
    "would", "you",
];

/// A reference to the user whose email is wanted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Structured mention token carrying a user ID
    Mention(String),
    /// `@handle` typed as plain text
    UsernameText(String),
    /// Free-text piece of a real name
    NameFragment(String),
}

impl Identifier {
    /// How the identifier is echoed back in replies
    pub fn display(&self) -> String {
        match self {
            Self::Mention(id) => format!("<@{id}>"),
            Self::UsernameText(name) => format!("@{name}"),
            Self::NameFragment(fragment) => format!("\"{fragment}\""),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    name_fragments: bool,
}

impl Extractor {
    pub fn new(name_fragments: bool) -> Self {
        Self { name_fragments }
    }

    /// Mention first, then `@username`, then (if enabled) a name fragment
    pub fn extract(&self, text: &str) -> Option<Identifier> {
        if let Some(caps) = MENTION.captures(text) {
            return Some(Identifier::Mention(caps[1].to_string()));
        }

        if let Some(caps) = USERNAME.captures(text) {
            return Some(Identifier::UsernameText(caps[1].to_string()));
        }

        if self.name_fragments {
            return name_fragment(text).map(Identifier::NameFragment);
        }

        None
    }
}

/// Lowercased alphabetic remainder of the message
///
/// Beyond stripping non-letters, a possessive `'s` is dropped and words from
/// [`REQUEST_VOCABULARY`] are removed, so "what is rahul's email" yields
/// `rahul` rather than the whole sentence.
fn name_fragment(text: &str) -> Option<String> {
    let stripped: String = POSSESSIVE
        .replace_all(text, "$1")
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let fragment = stripped
        .split_whitespace()
        .filter(|w| !REQUEST_VOCABULARY.contains(w))
        .collect::<Vec<_>>()
        .join(" ");

    (!fragment.is_empty()).then_some(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_wins() {
        let e = Extractor::new(true);
        assert_eq!(
            e.extract("What is his email id <@U123> or @jane?"),
            Some(Identifier::Mention("U123".to_string()))
        );
        assert_eq!(
            e.extract("email of <@U0ABC9|jane.doe> please"),
            Some(Identifier::Mention("U0ABC9".to_string()))
        );
    }

    #[test]
    fn test_mention_id_is_exact_capture() {
        for text in [
            "<@W42XY> email",
            "need the email <@W42XY>!!",
            "tell me <@W42XY>'s email",
        ] {
            assert_eq!(
                Extractor::default().extract(text),
                Some(Identifier::Mention("W42XY".to_string()))
            );
        }
    }

    #[test]
    fn test_username_token() {
        let e = Extractor::default();
        assert_eq!(
            e.extract("what is @Jane.Doe's email"),
            Some(Identifier::UsernameText("Jane.Doe".to_string()))
        );
        assert_eq!(
            e.extract("@unknownuser email please"),
            Some(Identifier::UsernameText("unknownuser".to_string()))
        );
    }

    #[test]
    fn test_username_with_space_is_truncated() {
        // "@Jane Doe" yields the token "Jane", never "Jane Doe"
        assert_eq!(
            Extractor::default().extract("email of @Jane Doe"),
            Some(Identifier::UsernameText("Jane".to_string()))
        );
    }

    #[test]
    fn test_nothing_without_fragments() {
        assert_eq!(Extractor::default().extract("what is his email id"), None);
    }

    #[test]
    fn test_name_fragment() {
        let e = Extractor::new(true);
        assert_eq!(
            e.extract("What is Rahul Shah's email id?"),
            Some(Identifier::NameFragment("rahul shah".to_string()))
        );
        assert_eq!(
            e.extract("give me the email of priya"),
            Some(Identifier::NameFragment("priya".to_string()))
        );
        assert_eq!(e.extract("what is his email id?"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Identifier::Mention("U1".to_string()).display(), "<@U1>");
        assert_eq!(Identifier::UsernameText("jane".to_string()).to_string(), "@jane");
        assert_eq!(
            Identifier::NameFragment("priya".to_string()).display(),
            "\"priya\""
        );
    }
}
