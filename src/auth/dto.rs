use serde::{Deserialize, Serialize};

/// Request body for registration. Profile fields are optional and fall back
/// to the stock profile.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub about: Option<String>,
    pub avatar: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration acknowledgement; only the email goes back.
#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub mail: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub jwt: String,
}
