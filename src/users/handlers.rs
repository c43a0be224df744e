use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{UpdateAvatarRequest, UpdateProfileRequest, UserResponse};
use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    state::AppState,
    store::{parse_object_id, StoreError, User},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users))
        .route("/users/me", get(get_me).patch(update_profile))
        .route("/users/me/avatar", patch(update_avatar))
        .route("/users/:user_id", get(get_profile))
}

#[instrument(skip(state))]
async fn get_users(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.find_all().await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Нет пользователя с таким id".into()))?;
    Ok(Json(UserResponse { data: user }))
}

#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id =
        parse_object_id(&user_id).map_err(|_| ApiError::BadRequest("Невалидный id".into()))?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Нет пользователя с таким id".into()))?;
    Ok(Json(UserResponse { data: user }))
}

#[instrument(skip(state, payload))]
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users
        .update_profile(user_id, &payload.name, &payload.about)
        .await
        .map_err(|e| match e {
            StoreError::Validation(_) | StoreError::Cast(_) => {
                ApiError::BadRequest("Невалидные данные".into())
            }
            other => other.into(),
        })?
        .ok_or_else(|| ApiError::NotFound("Нет пользователя с таким id".into()))?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateAvatarRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users
        .update_avatar(user_id, &payload.avatar)
        .await?
        .ok_or_else(|| ApiError::NotFound("Нет пользователя с таким id".into()))?;
    info!(user_id = %user.id, "avatar updated");
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewUser;
    use axum::http::StatusCode;
    use uuid::Uuid;

    async fn seed_user(state: &AppState, email: &str) -> User {
        state
            .users
            .create(NewUser {
                name: "Марина".into(),
                about: "Студентка".into(),
                avatar: "http://a".into(),
                email: email.into(),
                password_hash: "hash".into(),
            })
            .await
            .expect("seed user")
    }

    #[tokio::test]
    async fn get_me_returns_own_record() {
        let state = AppState::in_memory();
        let user = seed_user(&state, "me@example.com").await;

        let Json(response) = get_me(State(state), AuthUser(user.id)).await.expect("ok");
        assert_eq!(response.data.id, user.id);
        assert_eq!(response.data.email, "me@example.com");
    }

    #[tokio::test]
    async fn get_me_with_vanished_identity_is_not_found() {
        let state = AppState::in_memory();
        let err = get_me(State(state), AuthUser(Uuid::new_v4()))
            .await
            .err()
            .expect("rejected");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Нет пользователя с таким id");
    }

    #[tokio::test]
    async fn get_profile_rejects_malformed_id() {
        let state = AppState::in_memory();
        let user = seed_user(&state, "viewer@example.com").await;

        let err = get_profile(
            State(state),
            AuthUser(user.id),
            Path("not-an-id".to_string()),
        )
        .await
        .err()
        .expect("rejected");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Невалидный id");
    }

    #[tokio::test]
    async fn update_profile_roundtrip() {
        let state = AppState::in_memory();
        let user = seed_user(&state, "edit@example.com").await;

        let Json(updated) = update_profile(
            State(state.clone()),
            AuthUser(user.id),
            Json(UpdateProfileRequest {
                name: "Новое имя".into(),
                about: "Новое о себе".into(),
            }),
        )
        .await
        .expect("ok");
        assert_eq!(updated.name, "Новое имя");
        assert_eq!(updated.about, "Новое о себе");
    }

    #[tokio::test]
    async fn update_profile_rejects_invalid_data() {
        let state = AppState::in_memory();
        let user = seed_user(&state, "short@example.com").await;

        let err = update_profile(
            State(state),
            AuthUser(user.id),
            Json(UpdateProfileRequest {
                name: "x".into(),
                about: "y".into(),
            }),
        )
        .await
        .err()
        .expect("rejected");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Невалидные данные");
    }

    #[tokio::test]
    async fn update_avatar_for_unknown_identity_is_not_found() {
        let state = AppState::in_memory();
        let err = update_avatar(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(UpdateAvatarRequest {
                avatar: "http://new".into(),
            }),
        )
        .await
        .err()
        .expect("rejected");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
