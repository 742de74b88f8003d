//! Directory record types

/// A workspace member as seen by the lookup pipeline
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserRecord {
    /// User ID (e.g., U09JDBT2MCM)
    pub id: String,

    /// Username/handle (e.g., "john.doe")
    pub name: String,

    /// Display name (what shows in Slack)
    pub display_name: Option<String>,

    /// Real name (e.g., "John Doe")
    pub real_name: Option<String>,

    /// Email (if available)
    pub email: Option<String>,

    /// Has the account been deactivated?
    pub is_deleted: bool,

    /// Is this a bot?
    pub is_bot: bool,
}

impl UserRecord {
    /// Get best available name for display, skipping empty profile fields
    pub fn best_name(&self) -> &str {
        non_empty(self.display_name.as_deref())
            .or(non_empty(self.real_name.as_deref()))
            .unwrap_or(&self.name)
    }

    /// Active human member
    pub fn is_active_human(&self) -> bool {
        !self.is_deleted && !self.is_bot
    }

    /// Case-insensitive exact match against username, display name or real name
    pub fn matches_name(&self, lowercased: &str) -> bool {
        self.name.to_lowercase() == lowercased
            || self
                .display_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase() == lowercased)
            || self
                .real_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase() == lowercased)
    }

    /// Substring match of a lowercased fragment against the real name
    pub fn real_name_contains(&self, fragment: &str) -> bool {
        self.real_name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(fragment))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
