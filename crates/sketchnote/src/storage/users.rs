//! Users, profiles and friendships.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::{now, parse_timestamp, Storage};
use crate::error::{Error, Result};
use crate::notebook::{is_valid_email, normalize_email};
use crate::user::{validate_username, FriendAccess, User};

const USER_COLUMNS: &str = "id, email, display_name, username, created_at";

impl Storage {
    /// Register a user, or refresh the email of one already registered.
    ///
    /// The email is lowercased and must not belong to another user.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the id is blank, the email is
    /// malformed or taken, or an error if the database operation fails.
    pub fn register_user(&self, id: &str, email: &str) -> Result<User> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::invalid_input("user id must not be empty"));
        }
        if !is_valid_email(email) {
            return Err(Error::invalid_input(format!(
                "not a valid email address: {}",
                email.trim()
            )));
        }
        let email = normalize_email(email);

        let tx = self.conn.unchecked_transaction()?;
        let holder: Option<String> = tx
            .query_row(
                "SELECT id FROM users WHERE email = ?1 AND id <> ?2",
                params![email, id],
                |row| row.get(0),
            )
            .optional()?;
        if holder.is_some() {
            return Err(Error::invalid_input(format!(
                "{email} is already registered to another user"
            )));
        }
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
            params![id, email, now()],
        )?;
        if inserted == 0 {
            tx.execute("UPDATE users SET email = ?1 WHERE id = ?2", params![email, id])?;
        } else {
            info!("Registered user {} <{}>", id, email);
        }
        tx.commit()?;

        self.require_user(id)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = self
            .conn
            .query_row(&sql, [id.trim()], row_to_user)
            .optional()?;
        Ok(user)
    }

    fn require_user(&self, id: &str) -> Result<User> {
        self.get_user(id)?
            .ok_or_else(|| Error::user_not_found(id.trim()))
    }

    /// Find users by exact email (case-insensitive), leaving out `excluding`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_users_by_email(&self, email: &str, excluding: &str) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND id <> ?2 ORDER BY id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let users = stmt
            .query_map(params![normalize_email(email), excluding.trim()], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Update a user's display name and/or username.
    ///
    /// `None` leaves a field unchanged. Usernames are trimmed, must be at
    /// least three characters, and must not be held by another user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist, the username is rejected,
    /// or the database operation fails.
    pub fn update_profile(
        &self,
        id: &str,
        display_name: Option<&str>,
        username: Option<&str>,
    ) -> Result<User> {
        let id = id.trim();
        let username = username.map(validate_username).transpose()?;
        let display_name = display_name.map(str::trim);

        let tx = self.conn.unchecked_transaction()?;
        if let Some(username) = username {
            let holder: Option<String> = tx
                .query_row(
                    "SELECT id FROM users WHERE username = ?1 AND id <> ?2",
                    params![username, id],
                    |row| row.get(0),
                )
                .optional()?;
            if holder.is_some() {
                return Err(Error::invalid_input(format!(
                    "username '{username}' is already taken"
                )));
            }
        }
        let affected = tx.execute(
            r"
            UPDATE users SET display_name = COALESCE(?1, display_name),
                             username = COALESCE(?2, username)
            WHERE id = ?3
            ",
            params![display_name, username, id],
        )?;
        if affected == 0 {
            return Err(Error::user_not_found(id));
        }
        tx.commit()?;

        debug!("Updated profile of {}", id);
        self.require_user(id)
    }

    /// Make two users friends of each other.
    ///
    /// Returns `true` if the friendship is new.
    ///
    /// # Errors
    ///
    /// Returns an error if either user does not exist, a user befriends
    /// themselves, or the database operation fails.
    pub fn add_friend(&self, user_id: &str, friend_id: &str) -> Result<bool> {
        let (user_id, friend_id) = (user_id.trim(), friend_id.trim());
        if user_id == friend_id {
            return Err(Error::invalid_input("cannot add yourself as a friend"));
        }
        self.require_user(user_id)?;
        self.require_user(friend_id)?;

        let stamp = now();
        let tx = self.conn.unchecked_transaction()?;
        let mut added = 0;
        for (a, b) in [(user_id, friend_id), (friend_id, user_id)] {
            added += tx.execute(
                "INSERT OR IGNORE INTO friendships (user_id, friend_id, created_at) \
                 VALUES (?1, ?2, ?3)",
                params![a, b, stamp],
            )?;
        }
        tx.commit()?;

        if added > 0 {
            debug!("{} and {} are now friends", user_id, friend_id);
        }
        Ok(added > 0)
    }

    /// List a user's friends by display name, then email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_friends(&self, user_id: &str) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id IN \
             (SELECT friend_id FROM friendships WHERE user_id = ?1) \
             ORDER BY display_name COLLATE NOCASE, email"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let friends = stmt
            .query_map([user_id.trim()], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(friends)
    }

    /// List a user's friends, marking those a notebook is already shared with.
    ///
    /// # Errors
    ///
    /// Returns an error if the notebook does not exist or the database
    /// operation fails.
    pub fn friend_access(&self, user_id: &str, notebook_id: i64) -> Result<Vec<FriendAccess>> {
        let notebook = self.require_notebook(notebook_id)?;
        let friends = self.list_friends(user_id)?;
        Ok(friends
            .into_iter()
            .map(|friend| FriendAccess {
                has_access: notebook.shared_with.contains(&friend.email),
                friend,
            })
            .collect())
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let created_at: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        username: row.get(3)?,
        created_at: parse_timestamp(&created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_with_users() -> Storage {
        let storage = Storage::open_in_memory().expect("failed to create test storage");
        storage.register_user("ada", "Ada@Example.com").unwrap();
        storage.register_user("grace", "grace@example.com").unwrap();
        storage.register_user("alan", "alan@example.com").unwrap();
        storage
    }

    #[test]
    fn test_register_user_lowercases_email() {
        let storage = storage_with_users();
        let ada = storage.get_user("ada").unwrap().unwrap();
        assert_eq!(ada.email, "ada@example.com");
        assert_eq!(ada.display_name, "");
        assert!(ada.username.is_none());
    }

    #[test]
    fn test_register_user_is_idempotent() {
        let storage = storage_with_users();
        storage.update_profile("ada", Some("Ada"), None).unwrap();
        let again = storage.register_user("ada", "ada@example.com").unwrap();
        assert_eq!(again.display_name, "Ada");

        let moved = storage.register_user("ada", "countess@example.com").unwrap();
        assert_eq!(moved.email, "countess@example.com");
    }

    #[test]
    fn test_register_user_rejects_taken_email() {
        let storage = storage_with_users();
        let err = storage.register_user("mallory", "GRACE@example.com").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(storage.get_user("mallory").unwrap().is_none());

        assert!(storage.register_user("x", "nope").unwrap_err().is_invalid_input());
        assert!(storage.register_user(" ", "x@example.com").is_err());
    }

    #[test]
    fn test_find_users_by_email_excludes_self() {
        let storage = storage_with_users();
        let found = storage.find_users_by_email(" GRACE@example.com ", "ada").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "grace");

        assert!(storage.find_users_by_email("ada@example.com", "ada").unwrap().is_empty());
        assert!(storage.find_users_by_email("nobody@example.com", "ada").unwrap().is_empty());
    }

    #[test]
    fn test_update_profile() {
        let storage = storage_with_users();
        let ada = storage
            .update_profile("ada", Some("  Ada Lovelace "), Some(" countess "))
            .unwrap();
        assert_eq!(ada.display_name, "Ada Lovelace");
        assert_eq!(ada.username.as_deref(), Some("countess"));

        let ada = storage.update_profile("ada", Some("Ada"), None).unwrap();
        assert_eq!(ada.username.as_deref(), Some("countess"));
    }

    #[test]
    fn test_username_rules() {
        let storage = storage_with_users();
        assert!(storage
            .update_profile("ada", None, Some("ab"))
            .unwrap_err()
            .is_invalid_input());

        storage.update_profile("ada", None, Some("countess")).unwrap();
        let err = storage.update_profile("grace", None, Some("countess")).unwrap_err();
        assert!(err.to_string().contains("already taken"));

        storage.update_profile("ada", Some("Ada"), Some("countess")).unwrap();
    }

    #[test]
    fn test_update_profile_missing_user() {
        let storage = storage_with_users();
        let err = storage.update_profile("nobody", Some("x"), None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_add_friend_is_mutual() {
        let storage = storage_with_users();
        assert!(storage.add_friend("ada", "grace").unwrap());
        assert!(!storage.add_friend("grace", "ada").unwrap());

        let ada_friends: Vec<String> = storage
            .list_friends("ada")
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ada_friends, vec!["grace".to_string()]);
        assert_eq!(storage.list_friends("grace").unwrap()[0].id, "ada");
        assert!(storage.list_friends("alan").unwrap().is_empty());
    }

    #[test]
    fn test_add_friend_rejects_self_and_strangers() {
        let storage = storage_with_users();
        assert!(storage.add_friend("ada", "ada").unwrap_err().is_invalid_input());
        assert!(storage.add_friend("ada", "nobody").unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_friends_ordered_by_name() {
        let storage = storage_with_users();
        storage.update_profile("grace", Some("Grace"), None).unwrap();
        storage.update_profile("alan", Some("alan"), None).unwrap();
        storage.add_friend("ada", "grace").unwrap();
        storage.add_friend("ada", "alan").unwrap();

        let names: Vec<String> = storage
            .list_friends("ada")
            .unwrap()
            .iter()
            .map(|u| u.label().to_string())
            .collect();
        assert_eq!(names, vec!["alan".to_string(), "Grace".to_string()]);
    }

    #[test]
    fn test_friend_access_marks_shared_friends() {
        let storage = storage_with_users();
        storage.add_friend("ada", "grace").unwrap();
        storage.add_friend("ada", "alan").unwrap();
        let notebook = storage.create_notebook("ada", None).unwrap();
        storage.share_notebook(notebook.id, "Grace@example.com").unwrap();

        let access = storage.friend_access("ada", notebook.id).unwrap();
        assert_eq!(access.len(), 2);
        for entry in &access {
            assert_eq!(entry.has_access, entry.friend.id == "grace");
        }

        assert!(storage.friend_access("ada", 999).unwrap_err().is_not_found());
    }
}
