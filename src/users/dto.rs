use serde::{Deserialize, Serialize};

use crate::store::User;

/// Envelope used by the single-user reads: `{"data": user}`.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub data: User,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub about: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAvatarRequest {
    pub avatar: String,
}
