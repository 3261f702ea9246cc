//! Storage keys for per-user notification windows.

use std::fmt;

/// Prefix shared by every notification key.
pub const KEY_PREFIX: &str = "notifications:";

/// Key under which a user's notification window is stored.
///
/// Always `"notifications:" + user_id`. The user id is opaque and is not
/// normalized, so `"Alice"` and `"alice"` are different keys.
///
/// # Example
/// ```
/// use notification_throttle::NotificationKey;
///
/// let key = NotificationKey::for_user("u1");
/// assert_eq!(key.as_str(), "notifications:u1");
/// assert_eq!(key.user_id(), "u1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationKey(String);

impl NotificationKey {
    /// Build the key for a user id.
    pub fn for_user(user_id: &str) -> Self {
        let mut key = String::with_capacity(KEY_PREFIX.len() + user_id.len());
        key.push_str(KEY_PREFIX);
        key.push_str(user_id);
        Self(key)
    }

    /// The full key, prefix included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The user id this key was derived from.
    pub fn user_id(&self) -> &str {
        &self.0[KEY_PREFIX.len()..]
    }
}

impl fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NotificationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
