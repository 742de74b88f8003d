/// The parts of an incoming chat message the lookup pipeline looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    pub sender_is_bot: bool,
    pub subtype: Option<String>,
}

impl InboundMessage {
    /// A plain message from a human sender
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender_is_bot: false,
            subtype: None,
        }
    }

    pub fn has_subtype(&self) -> bool {
        self.subtype.as_deref().is_some_and(|s| !s.is_empty())
    }
}
