//! Email-request classification policies
//!
//! Two heuristic generations are available and exactly one is active at a
//! time:
//!
//! - [`KeywordClassifier`] fires on any email keyword. High recall, low
//!   precision: "what is my email" and "I emailed you" both match.
//! - [`ContextClassifier`] requires a request verb, an email term and a
//!   third-person marker, so the sender asking about their own address is
//!   ignored. It also understands a handful of transliterated Gujarati
//!   phrasings, which match on their own.

use crate::error::EmailBotError;
use crate::lookup::InboundMessage;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

const EMAIL_KEYWORDS: [&str; 4] = ["email id", "mail id", "email", "e-mail"];

const GUJARATI_SUFFIX: &str = r"(aapo|aapjo|apo|apjo|aapso|moklo|mokljo|mokalo)";

static REQUEST_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(what|give|tell|send|need|know|get)\b").expect("valid regex")
});

static EMAIL_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mail\s*id|email\s*id|email").expect("valid regex"));

static THIRD_PERSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<@[A-Z0-9]+(\|[^>]*)?>|\b(his|her|their|someone)\b").expect("valid regex")
});

static POSSESSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)['’]s\b").expect("valid regex"));

/// Words whose `'s` is a contraction, never a possessive
const CONTRACTIONS: [&str; 14] = [
    "what", "that", "it", "let", "here", "there", "who", "where", "how", "when", "why", "he",
    "she", "this",
];

static GUJARATI_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?i)\btamari\s+e?-?mail\s+{GUJARATI_SUFFIX}\b"),
        format!(r"(?i)\btamaru\s+e?-?mail\s+{GUJARATI_SUFFIX}\b"),
        format!(r"(?i)\btamari\s+e?-?mail\s*id\s+{GUJARATI_SUFFIX}\b"),
        format!(r"(?i)\btamaru\s+e?-?mail\s*id\s+{GUJARATI_SUFFIX}\b"),
        r"(?i)\bsir\b.*\btamari\b.*mail".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Decides whether a message asks for someone's email address
pub trait Classifier: Send + Sync {
    fn is_email_request(&self, text: &str) -> bool;

    /// Policy name for logs
    fn name(&self) -> &'static str;
}

/// Generation A: plain keyword containment
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl Classifier for KeywordClassifier {
    fn is_email_request(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        EMAIL_KEYWORDS.iter().any(|k| lowered.contains(k))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Generation B: request verb + email term + third-person marker, or a Gujarati phrase
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextClassifier;

impl ContextClassifier {
    fn is_third_person_request(text: &str) -> bool {
        REQUEST_VERB.is_match(text)
            && EMAIL_TERM.is_match(text)
            && (THIRD_PERSON.is_match(text) || Self::has_possessive(text))
    }

    /// `rahul's`, but not `what's` or `let's`
    fn has_possessive(text: &str) -> bool {
        POSSESSIVE.captures_iter(text).any(|caps| {
            let word = caps[1].to_lowercase();
            !CONTRACTIONS.contains(&word.as_str())
        })
    }

    fn is_gujarati_request(text: &str) -> bool {
        GUJARATI_PATTERNS.iter().any(|p| p.is_match(text))
    }
}

impl Classifier for ContextClassifier {
    fn is_email_request(&self, text: &str) -> bool {
        Self::is_third_person_request(text) || Self::is_gujarati_request(text)
    }

    fn name(&self) -> &'static str {
        "context"
    }
}

/// Which classifier generation is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierPolicy {
    Keyword,
    #[default]
    Context,
}

impl ClassifierPolicy {
    pub fn build(self) -> Box<dyn Classifier> {
        match self {
            Self::Keyword => Box::new(KeywordClassifier),
            Self::Context => Box::new(ContextClassifier),
        }
    }
}

impl FromStr for ClassifierPolicy {
    type Err = EmailBotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" | "a" => Ok(Self::Keyword),
            "context" | "b" => Ok(Self::Context),
            other => Err(EmailBotError::Config(format!(
                "Unknown classifier policy: {other}"
            ))),
        }
    }
}

/// Rejects messages the bot must never answer
#[derive(Debug, Clone, Copy)]
pub struct MessageFilter {
    ignore_subtypes: bool,
}

impl MessageFilter {
    pub fn new(ignore_subtypes: bool) -> Self {
        Self { ignore_subtypes }
    }

    pub fn accepts(&self, message: &InboundMessage) -> bool {
        if message.sender_is_bot || message.subtype.as_deref() == Some("bot_message") {
            return false;
        }

        !(self.ignore_subtypes && message.has_subtype())
    }
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_matches_substrings() {
        let c = KeywordClassifier;
        assert!(c.is_email_request("What is the Email ID of jane?"));
        assert!(c.is_email_request("mail id please"));
        assert!(c.is_email_request("I emailed you yesterday"));
        assert!(c.is_email_request("her e-mail?"));
        assert!(!c.is_email_request("what is her phone number"));
    }

    #[test]
    fn test_keyword_accepts_first_person() {
        assert!(KeywordClassifier.is_email_request("my email please"));
    }

    #[test]
    fn test_context_mention_request() {
        assert!(ContextClassifier.is_email_request("What is his email id <@U123>"));
        assert!(ContextClassifier.is_email_request("can you give me <@U123> mail id"));
    }

    #[test]
    fn test_context_pronouns_and_possessive() {
        let c = ContextClassifier;
        assert!(c.is_email_request("can you tell me her email"));
        assert!(c.is_email_request("I need their email id"));
        assert!(c.is_email_request("does someone know the email of @jane"));
        assert!(c.is_email_request("what's Jane's email?"));
    }

    #[test]
    fn test_context_rejects_first_person() {
        let c = ContextClassifier;
        assert!(!c.is_email_request("my email please"));
        assert!(!c.is_email_request("what is my email"));
        assert!(!c.is_email_request("what's my email id?"));
        assert!(!c.is_email_request("can you tell me what's my email"));
        assert!(!c.is_email_request("let's get my email"));
        assert!(!c.is_email_request("It’s my email, what is it?"));
    }

    #[test]
    fn test_context_contraction_with_third_person() {
        let c = ContextClassifier;
        assert!(c.is_email_request("what's his email"));
        assert!(c.is_email_request("what's Rahul's email id"));
    }

    #[test]
    fn test_context_requires_verb_and_email_term() {
        let c = ContextClassifier;
        // no request verb
        assert!(!c.is_email_request("his email <@U123>"));
        // no email term
        assert!(!c.is_email_request("what is his phone <@U123>"));
        // verb only as a substring
        assert!(!c.is_email_request("together with her email"));
    }

    #[test]
    fn test_context_gujarati_phrases() {
        let c = ContextClassifier;
        assert!(c.is_email_request("tamari email aapjo"));
        assert!(c.is_email_request("Tamaru mail aapo"));
        assert!(c.is_email_request("tamari mail id apjo"));
        assert!(c.is_email_request("tamaru email id moklo"));
        assert!(c.is_email_request("sir, tamari office mail joie che"));
        assert!(!c.is_email_request("tamari email"));
    }

    #[test]
    fn test_policy_parse_and_build() {
        assert_eq!("keyword".parse::<ClassifierPolicy>().unwrap(), ClassifierPolicy::Keyword);
        assert_eq!(" Context ".parse::<ClassifierPolicy>().unwrap(), ClassifierPolicy::Context);
        assert!("both".parse::<ClassifierPolicy>().is_err());

        assert_eq!(ClassifierPolicy::Keyword.build().name(), "keyword");
        assert_eq!(ClassifierPolicy::default().build().name(), "context");
    }

    #[test]
    fn test_filter_rejects_bots() {
        let filter = MessageFilter::new(false);
        let bot = InboundMessage {
            sender_is_bot: true,
            ..InboundMessage::from_user("what is his email <@U1>")
        };
        let bot_subtype = InboundMessage {
            subtype: Some("bot_message".to_string()),
            ..InboundMessage::from_user("what is his email <@U1>")
        };

        assert!(!filter.accepts(&bot));
        assert!(!filter.accepts(&bot_subtype));
        assert!(filter.accepts(&InboundMessage::from_user("hi")));
    }

    #[test]
    fn test_filter_subtype_policy() {
        let edited = InboundMessage {
            subtype: Some("message_changed".to_string()),
            ..InboundMessage::from_user("what is his email <@U1>")
        };

        assert!(!MessageFilter::new(true).accepts(&edited));
        assert!(MessageFilter::new(false).accepts(&edited));
    }
}
