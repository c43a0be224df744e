use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Card, CardStore, NewCard, NewUser, StoreError, User, UserStore};

const USER_COLUMNS: &str = "id, name, about, avatar, email, password_hash, created_at";
const CARD_COLUMNS: &str = "id, name, link, owner, likes, created_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Tags constraint violations so handlers can tell a duplicate email or a
/// failed check apart from an infrastructure failure.
fn translate(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        match db.code().as_deref() {
            Some("23505") => return StoreError::Duplicate(db.message().to_string()),
            Some("23514") | Some("23502") => {
                return StoreError::Validation(db.message().to_string())
            }
            _ => {}
        }
    }
    StoreError::Other(err.into())
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users"))
            .fetch_all(&self.pool)
            .await
            .map_err(translate)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(translate)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, about, avatar, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.about)
        .bind(&new.avatar)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(translate)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        about: &str,
    ) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET name = $2, about = $3
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(about)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET avatar = $2
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }
}

#[async_trait]
impl CardStore for PgStore {
    async fn find_all(&self) -> Result<Vec<Card>, StoreError> {
        sqlx::query_as::<_, Card>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(translate)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, StoreError> {
        sqlx::query_as::<_, Card>(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(translate)
    }

    async fn create(&self, new: NewCard) -> Result<Card, StoreError> {
        sqlx::query_as::<_, Card>(&format!(
            r#"
            INSERT INTO cards (name, link, owner)
            VALUES ($1, $2, $3)
            RETURNING {CARD_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.link)
        .bind(new.owner)
        .fetch_one(&self.pool)
        .await
        .map_err(translate)
    }

    async fn add_like(&self, id: Uuid, user: Uuid) -> Result<Option<Card>, StoreError> {
        // Single-statement read-modify-write keeps the set semantics atomic.
        sqlx::query_as::<_, Card>(&format!(
            r#"
            UPDATE cards
            SET likes = CASE
                WHEN likes @> ARRAY[$2]::uuid[] THEN likes
                ELSE array_append(likes, $2)
            END
            WHERE id = $1
            RETURNING {CARD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn remove_like(&self, id: Uuid, user: Uuid) -> Result<Option<Card>, StoreError> {
        sqlx::query_as::<_, Card>(&format!(
            r#"
            UPDATE cards
            SET likes = array_remove(likes, $2)
            WHERE id = $1
            RETURNING {CARD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(translate)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
