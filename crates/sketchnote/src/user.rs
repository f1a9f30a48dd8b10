//! Users, profiles and friends.
//!
//! A user is identified by an opaque id and a unique lowercased email. The
//! profile adds a display name and an optional unique username. Friendship
//! is mutual: adding a friend links both users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shortest username accepted.
pub const MIN_USERNAME_LEN: usize = 3;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque user id.
    pub id: String,
    /// Lowercased email address.
    pub email: String,
    /// Name shown to friends; may be empty.
    pub display_name: String,
    /// Unique handle, once the user has picked one.
    pub username: Option<String>,
    /// When the user was registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The display name, falling back to the email when none is set.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

/// A friend together with whether they can see a given notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendAccess {
    /// The friend.
    pub friend: User,
    /// Whether the notebook is already shared with the friend's email.
    pub has_access: bool,
}

/// Trim a username and check its length.
///
/// # Errors
///
/// Returns an invalid-input error if the trimmed username is shorter than
/// [`MIN_USERNAME_LEN`] characters or contains whitespace.
pub fn validate_username(username: &str) -> Result<&str> {
    let username = username.trim();
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(Error::invalid_input(format!(
            "username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(Error::invalid_input("username must not contain spaces"));
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display_name: &str) -> User {
        User {
            id: "ada".to_string(),
            email: "ada@example.com".to_string(),
            display_name: display_name.to_string(),
            username: None,
            created_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn test_label_prefers_display_name() {
        assert_eq!(user("Ada L.").label(), "Ada L.");
        assert_eq!(user("  ").label(), "ada@example.com");
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("  ada ").unwrap(), "ada");
        assert!(validate_username("ad").unwrap_err().is_invalid_input());
        assert!(validate_username("a d a").is_err());
        assert_eq!(validate_username("äöü").unwrap(), "äöü");
    }
}
