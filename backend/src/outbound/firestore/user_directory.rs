//! Document-store-backed user directory.
//!
//! One `users/{uid}` document per identity: `user_fullname`, `user_role`,
//! and the reward counters. A missing document or field is a normal state.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::client::{FieldIncrement, FirestoreClient, FirestoreError};
use super::dto::Document;
use crate::domain::ports::{DirectoryError, NewUserProfile, UserDirectory, UserProfile};
use crate::domain::user::UserId;

const USERS_COLLECTION: &str = "users";

/// Directory adapter over the `users` collection.
pub struct FirestoreUserDirectory {
    client: Arc<FirestoreClient>,
}

impl FirestoreUserDirectory {
    /// Build the adapter over a shared client.
    #[must_use]
    pub fn new(client: Arc<FirestoreClient>) -> Self {
        Self { client }
    }
}

fn map_error(err: FirestoreError) -> DirectoryError {
    match err {
        FirestoreError::Transport { message } | FirestoreError::Status { message } => {
            DirectoryError::transport(message)
        }
        FirestoreError::PermissionDenied { message } => DirectoryError::permission_denied(message),
        FirestoreError::Decode { message } => DirectoryError::decode(message),
    }
}

fn decode_profile(document: Document) -> UserProfile {
    let plain = document.into_json_map();
    let string_of = |key: &str| {
        plain
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .filter(|s| !s.is_empty())
    };
    let int_of = |key: &str| plain.get(key).and_then(Value::as_i64).unwrap_or(0);
    UserProfile {
        full_name: string_of("user_fullname"),
        role: string_of("user_role"),
        reward_points: int_of("rewardPoints"),
        reports_submitted: int_of("totalReportsSubmitted"),
    }
}

#[async_trait]
impl UserDirectory for FirestoreUserDirectory {
    async fn create_profile(
        &self,
        user_id: &UserId,
        profile: NewUserProfile,
    ) -> Result<(), DirectoryError> {
        let mut plain = Map::new();
        if let Some(full_name) = profile.full_name {
            plain.insert("user_fullname".to_owned(), json!(full_name));
        }
        if let Some(email) = profile.email {
            plain.insert("email".to_owned(), json!(email));
        }
        plain.insert("rewardPoints".to_owned(), json!(0));
        plain.insert("totalReportsSubmitted".to_owned(), json!(0));

        self.client
            .patch_document(
                USERS_COLLECTION,
                user_id.as_ref(),
                Document::fields_from_json(plain),
            )
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DirectoryError> {
        let document = self
            .client
            .get_document(USERS_COLLECTION, user_id.as_ref())
            .await
            .map_err(map_error)?;
        Ok(document.map(decode_profile))
    }

    async fn award_report_points(
        &self,
        user_id: &UserId,
        points: u32,
    ) -> Result<(), DirectoryError> {
        self.client
            .commit_increments(
                USERS_COLLECTION,
                user_id.as_ref(),
                vec![
                    FieldIncrement {
                        field_path: "rewardPoints".to_owned(),
                        amount: i64::from(points),
                    },
                    FieldIncrement {
                        field_path: "totalReportsSubmitted".to_owned(),
                        amount: 1,
                    },
                ],
            )
            .await
            .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for profile decoding.
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_full_profile() {
        let document: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/users/u1",
            "fields": {
                "user_fullname": { "stringValue": "Nurul Huda" },
                "user_role": { "stringValue": "admin" },
                "rewardPoints": { "integerValue": "42" },
                "totalReportsSubmitted": { "integerValue": "7" }
            }
        }))
        .expect("document decodes");

        let profile = decode_profile(document);
        assert_eq!(profile.full_name.as_deref(), Some("Nurul Huda"));
        assert_eq!(profile.role.as_deref(), Some("admin"));
        assert_eq!(profile.reward_points, 42);
        assert_eq!(profile.reports_submitted, 7);
    }

    #[test]
    fn empty_fields_read_as_absent() {
        let document: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/users/u1",
            "fields": {
                "user_role": { "stringValue": "" }
            }
        }))
        .expect("document decodes");

        let profile = decode_profile(document);
        assert!(profile.role.is_none());
        assert!(profile.full_name.is_none());
        assert_eq!(profile.reward_points, 0);
    }
}
