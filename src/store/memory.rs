use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Card, CardStore, NewCard, NewUser, StoreError, User, UserStore};

/// In-memory store backing unit tests. Mirrors the constraints the real
/// schema enforces so validation and duplicate tagging behave the same.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    cards: RwLock<HashMap<Uuid, Card>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_length(field: &str, value: &str) -> Result<(), StoreError> {
    let len = value.chars().count();
    if !(2..=30).contains(&len) {
        return Err(StoreError::Validation(format!(
            "{field} must be 2..=30 characters"
        )));
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        check_length("name", &new.name)?;
        check_length("about", &new.about)?;
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate(format!(
                "email already registered: {}",
                new.email
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            about: new.about,
            avatar: new.avatar,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        about: &str,
    ) -> Result<Option<User>, StoreError> {
        check_length("name", name)?;
        check_length("about", about)?;
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.name = name.to_string();
            user.about = about.to_string();
            user.clone()
        }))
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.avatar = avatar.to_string();
            user.clone()
        }))
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Card>, StoreError> {
        let mut cards: Vec<Card> = self.cards.read().await.values().cloned().collect();
        cards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cards)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, StoreError> {
        Ok(self.cards.read().await.get(&id).cloned())
    }

    async fn create(&self, new: NewCard) -> Result<Card, StoreError> {
        check_length("name", &new.name)?;
        if new.link.is_empty() {
            return Err(StoreError::Validation("link must not be empty".into()));
        }
        let card = Card {
            id: Uuid::new_v4(),
            name: new.name,
            link: new.link,
            owner: new.owner,
            likes: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.cards.write().await.insert(card.id, card.clone());
        Ok(card)
    }

    async fn add_like(&self, id: Uuid, user: Uuid) -> Result<Option<Card>, StoreError> {
        let mut cards = self.cards.write().await;
        Ok(cards.get_mut(&id).map(|card| {
            if !card.likes.contains(&user) {
                card.likes.push(user);
            }
            card.clone()
        }))
    }

    async fn remove_like(&self, id: Uuid, user: Uuid) -> Result<Option<Card>, StoreError> {
        let mut cards = self.cards.write().await;
        Ok(cards.get_mut(&id).map(|card| {
            card.likes.retain(|liker| *liker != user);
            card.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        if self.cards.write().await.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
