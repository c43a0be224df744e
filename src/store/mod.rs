use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// Failure tags reported by the persistence layer. Handlers translate these
/// into `ApiError` exactly once, at the point where context is known.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("malformed identifier: {0}")]
    Cast(String),
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Parses a path segment into an id, tagging failure the same way the store
/// tags a malformed identifier in a query.
pub fn parse_object_id(raw: &str) -> Result<Uuid, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Cast(format!("not a valid id: {raw}")))
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub about: String,
    pub avatar: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub about: String,
    pub avatar: String,
    pub email: String,
    pub password_hash: String,
}

/// A shared picture card. `owner` is set at creation and never changes;
/// `likes` behaves as a set of user ids.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    pub owner: Uuid,
    pub likes: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCard {
    pub name: String,
    pub link: String,
    pub owner: Uuid,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    /// Atomic single-row update returning the updated record, `Ok(None)`
    /// when no user has this id.
    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        about: &str,
    ) -> Result<Option<User>, StoreError>;
    async fn update_avatar(&self, id: Uuid, avatar: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait CardStore: Send + Sync {
    /// Newest first.
    async fn find_all(&self) -> Result<Vec<Card>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, StoreError>;
    async fn create(&self, new: NewCard) -> Result<Card, StoreError>;
    /// Set-insert: a second like by the same user leaves the card unchanged.
    async fn add_like(&self, id: Uuid, user: Uuid) -> Result<Option<Card>, StoreError>;
    /// Set-remove: removing an absent like leaves the card unchanged.
    async fn remove_like(&self, id: Uuid, user: Uuid) -> Result<Option<Card>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_object_id_accepts_uuid() {
        let id = Uuid::new_v4();
        let parsed = parse_object_id(&id.to_string()).expect("valid id parses");
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_object_id_tags_garbage_as_cast() {
        let err = parse_object_id("not-an-id").unwrap_err();
        assert!(matches!(err, StoreError::Cast(_)));
    }

    #[test]
    fn user_serialization_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Марина".into(),
            about: "Студентка".into(),
            avatar: "http://a".into(),
            email: "m@example.com".into(),
            password_hash: "argon2-hash".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&user).expect("serialize");
        assert_eq!(json["email"], "m@example.com");
        assert!(json.get("password_hash").is_none());
    }
}
