use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailBotError {
    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("Directory call timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EmailBotError>;
