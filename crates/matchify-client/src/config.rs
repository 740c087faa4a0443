//! Session configuration and local identity.

use std::time::Duration;

use matchify_core::DEFAULT_QUIET_INTERVAL;
use matchify_proto::Category;

/// Base URL of the pairing server when none is configured.
pub const DEFAULT_BASE_URL: &str = "ws://localhost:8080/chat";

/// Local user identity.
///
/// Supplied by whatever authenticated the user. The session only reads it: the
/// id tags outbound frames and tells local messages apart from the peer's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    /// Stable user id, sent as `from` on every frame.
    pub user_id: String,
    /// Display name.
    pub username: String,
}

impl LocalIdentity {
    /// Create an identity.
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), username: username.into() }
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL; the category path is appended to it
    pub base_url: String,
    /// Local typing inactivity before "stopped typing" is sent
    pub quiet_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), quiet_interval: DEFAULT_QUIET_INTERVAL }
    }
}

impl SessionConfig {
    /// Socket endpoint for a category.
    pub fn endpoint(&self, category: Category) -> String {
        category.endpoint(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint() {
        let config = SessionConfig::default();
        assert_eq!(config.endpoint(Category::Artists), "ws://localhost:8080/chat/artist");
        assert_eq!(config.quiet_interval, Duration::from_millis(500));
    }
}
