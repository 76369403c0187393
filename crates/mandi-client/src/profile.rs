//! # Profile
//!
//! Viewing and editing the signed-in user's own record.

use std::sync::Arc;

use mandi_core::validation::{validate_email, validate_phone, validate_required};
use mandi_core::User;
use tracing::info;

use crate::api::ProfileUpdate;
use crate::error::ClientResult;
use crate::session::SessionHolder;

pub struct Profile {
    session: Arc<SessionHolder>,
}

impl Profile {
    pub fn new(session: Arc<SessionHolder>) -> Self {
        Profile { session }
    }

    /// Fetches the profile and refreshes the stored user record.
    pub async fn get(&self) -> ClientResult<User> {
        self.session.refresh_user().await
    }

    /// Sends the fields that differ from the current record.
    ///
    /// Returns the current record without a request when nothing changed.
    pub async fn update(&self, changes: &ProfileUpdate) -> ClientResult<User> {
        let current = match self.session.current_user().await {
            Some(user) => user,
            None => self.get().await?,
        };

        let changes = changed_fields(&current, changes)?;
        if changes.is_empty() {
            return Ok(current);
        }

        let sent = changes.clone();
        let user = self
            .session
            .with_token(|api, token| async move { api.update_profile(&token, &sent).await })
            .await?;

        self.session.set_user(user.clone()).await?;
        info!(user_id = user.id, ?changes, "Profile updated");
        Ok(user)
    }
}

/// Keeps only validated fields whose value differs from `current`.
fn changed_fields(current: &User, changes: &ProfileUpdate) -> ClientResult<ProfileUpdate> {
    let name = match &changes.name {
        Some(v) => Some(validate_required("name", v)?),
        None => None,
    };
    let email = match &changes.email {
        Some(v) => Some(validate_email(v)?),
        None => None,
    };
    let location = match &changes.location {
        Some(v) => Some(validate_required("location", v)?),
        None => None,
    };
    let contact_number = match &changes.contact_number {
        Some(v) => Some(validate_phone(v)?),
        None => None,
    };

    Ok(ProfileUpdate {
        name: name.filter(|v| *v != current.name),
        email: email.filter(|v| *v != current.email),
        location: location.filter(|v| current.location.as_deref() != Some(v.as_str())),
        contact_number: contact_number
            .filter(|v| current.contact_number.as_deref() != Some(v.as_str())),
    })
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandi_core::Role;

    fn user() -> User {
        User {
            id: 7,
            name: "Asha Patil".to_string(),
            email: "asha@example.com".to_string(),
            location: Some("Pune".to_string()),
            contact_number: Some("9876543210".to_string()),
            role: Role::Customer,
        }
    }

    #[test]
    fn test_changed_fields_drops_unchanged() {
        let changes = ProfileUpdate {
            name: Some(" Asha Patil ".to_string()),
            location: Some("Nashik".to_string()),
            ..Default::default()
        };

        let diff = changed_fields(&user(), &changes).unwrap();
        assert_eq!(diff.name, None);
        assert_eq!(diff.location.as_deref(), Some("Nashik"));
        assert!(diff.email.is_none());
    }

    #[test]
    fn test_changed_fields_validates() {
        let changes = ProfileUpdate {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(changed_fields(&user(), &changes).is_err());
    }
}
