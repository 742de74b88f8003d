//! Reply rendering in Slack mrkdwn

use crate::directory::UserRecord;
use crate::lookup::Identifier;
use std::fmt;

/// Every answer the bot can give to an email request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Resolved user with an email on file
    Email {
        display_name: String,
        username: String,
        email: String,
    },
    /// Resolved user without an email on file
    NoEmail {
        display_name: String,
        username: String,
    },
    /// Nobody in the directory matched the identifier
    NotFound { identifier: String },
    /// The request named nobody the bot could recognize
    Clarify,
    /// The directory could not be reached
    Failure,
}

impl Reply {
    /// Reply for a resolution outcome
    pub fn for_user(user: Option<&UserRecord>, identifier: &Identifier) -> Self {
        let Some(user) = user else {
            return Self::NotFound {
                identifier: identifier.display(),
            };
        };

        let display_name = user.best_name().to_string();
        let username = user.name.clone();

        match user.email.as_deref().filter(|e| !e.is_empty()) {
            Some(email) => Self::Email {
                display_name,
                username,
                email: email.to_string(),
            },
            None => Self::NoEmail {
                display_name,
                username,
            },
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Email { .. } => "email",
            Self::NoEmail { .. } => "no_email",
            Self::NotFound { .. } => "not_found",
            Self::Clarify => "clarify",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email {
                display_name,
                username,
                email,
            } => write!(f, "📧 *{display_name}* (@{username})\nEmail: `{email}`"),
            Self::NoEmail {
                display_name,
                username,
            } => write!(f, "❌ No email found for {display_name} (@{username})"),
            Self::NotFound { identifier } => {
                write!(f, "❌ User {identifier} not found in this workspace.")
            }
            Self::Clarify => f.write_str(
                "❓ Please mention a user (e.g., `@username`) or use a proper Slack mention to get their email.",
            ),
            Self::Failure => f.write_str(
                "⚠️ Something went wrong while retrieving the email. Please try again.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane(email: Option<&str>) -> UserRecord {
        UserRecord {
            id: "U123".to_string(),
            name: "jane.doe".to_string(),
            real_name: Some("Jane Doe".to_string()),
            email: email.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_email_reply() {
        let reply = Reply::for_user(
            Some(&jane(Some("jane@example.com"))),
            &Identifier::Mention("U123".to_string()),
        );

        assert_eq!(
            reply.to_string(),
            "📧 *Jane Doe* (@jane.doe)\nEmail: `jane@example.com`"
        );
    }

    #[test]
    fn test_no_email_reply() {
        let id = Identifier::UsernameText("jane.doe".to_string());

        for user in [jane(None), jane(Some(""))] {
            let reply = Reply::for_user(Some(&user), &id);
            assert_eq!(reply.kind(), "no_email");
            assert_eq!(reply.to_string(), "❌ No email found for Jane Doe (@jane.doe)");
        }
    }

    #[test]
    fn test_not_found_echoes_identifier() {
        let reply = Reply::for_user(None, &Identifier::UsernameText("unknownuser".to_string()));
        assert_eq!(
            reply.to_string(),
            "❌ User @unknownuser not found in this workspace."
        );

        let reply = Reply::for_user(None, &Identifier::Mention("U999".to_string()));
        assert_eq!(reply.to_string(), "❌ User <@U999> not found in this workspace.");
    }

    #[test]
    fn test_fixed_replies() {
        assert!(Reply::Clarify.to_string().contains("`@username`"));
        assert_eq!(
            Reply::Failure.to_string(),
            "⚠️ Something went wrong while retrieving the email. Please try again."
        );
    }
}
