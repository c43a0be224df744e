use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CardResponse, CreateCardRequest, DeletedResponse};
use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    state::AppState,
    store::{parse_object_id, Card, NewCard, StoreError},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cards", get(get_cards).post(create_card))
        .route("/cards/:card_id", delete(delete_card))
        .route("/cards/:card_id/likes", put(like_card).delete(dislike_card))
}

#[instrument(skip(state))]
async fn get_cards(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = state.cards.find_all().await?;
    Ok(Json(cards))
}

#[instrument(skip(state, payload))]
async fn create_card(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateCardRequest>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = state
        .cards
        .create(NewCard {
            name: payload.name,
            link: payload.link,
            owner: user_id,
        })
        .await
        .map_err(|e| match e {
            StoreError::Validation(_) | StoreError::Cast(_) => {
                ApiError::BadRequest("Данные не прошли валидацию".into())
            }
            other => other.into(),
        })?;
    info!(card_id = %card.id, owner = %card.owner, "card created");
    Ok(Json(CardResponse { data: card }))
}

/// Existence is checked before ownership: deleting a card that does not
/// exist answers 404 even to a non-owner.
#[instrument(skip(state))]
async fn delete_card(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(card_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let card_id = parse_object_id(&card_id)?;

    let card = state
        .cards
        .find_by_id(card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Карточка с таким id не найдена".into()))?;

    authorize_delete(&card, user_id)?;

    state.cards.delete(card.id).await?;
    info!(card_id = %card.id, "card deleted");
    Ok(Json(DeletedResponse {
        message: "Карточка удалена".into(),
    }))
}

/// Only the owner may remove a card; likes are open to everyone.
fn authorize_delete(card: &Card, acting: Uuid) -> Result<(), ApiError> {
    if card.owner != acting {
        warn!(card_id = %card.id, owner = %card.owner, %acting, "delete denied");
        return Err(ApiError::Forbidden("Нельзя удалить чужую карточку".into()));
    }
    Ok(())
}

#[instrument(skip(state))]
async fn like_card(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(card_id): Path<String>,
) -> Result<Json<Card>, ApiError> {
    let card_id = parse_object_id(&card_id)?;
    let card = state
        .cards
        .add_like(card_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Карточка с таким id не найдена".into()))?;
    Ok(Json(card))
}

#[instrument(skip(state))]
async fn dislike_card(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(card_id): Path<String>,
) -> Result<Json<Card>, ApiError> {
    let card_id = parse_object_id(&card_id)?;
    let card = state
        .cards
        .remove_like(card_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Карточка с таким id не найдена".into()))?;
    Ok(Json(card))
}
