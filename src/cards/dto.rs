use serde::{Deserialize, Serialize};

use crate::store::Card;

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    pub name: String,
    pub link: String,
}

/// Envelope for the creation response: `{"data": card}`.
#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub data: Card,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}
