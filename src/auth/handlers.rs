use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{LoginRequest, LoginResponse, RegisterRequest, RegisteredResponse},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{
    error::ApiError,
    state::AppState,
    store::{NewUser, StoreError, User, UserStore},
};

const DEFAULT_NAME: &str = "Жак-Ив Кусто";
const DEFAULT_ABOUT: &str = "Исследователь";
const DEFAULT_AVATAR: &str =
    "https://pictures.s3.yandex.net/resources/jacques-cousteau_1604399756.png";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(register))
        .route("/signin", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisteredResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!("malformed email at signup");
        return Err(ApiError::BadRequest("Данные не прошли валидацию".into()));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e.to_string())
    })?;

    let user = state
        .users
        .create(NewUser {
            name: payload.name.unwrap_or_else(|| DEFAULT_NAME.into()),
            about: payload.about.unwrap_or_else(|| DEFAULT_ABOUT.into()),
            avatar: payload.avatar.unwrap_or_else(|| DEFAULT_AVATAR.into()),
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => {
                ApiError::Conflict("Такой емейл уже зарегистрирован".into())
            }
            other => other.into(),
        })?;

    info!(user_id = %user.id, "user registered");
    Ok(Json(RegisteredResponse { mail: user.email }))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let user = verify_credentials(state.users.as_ref(), &email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e.to_string())
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse { jwt: token }))
}

/// An unknown email and a wrong password collapse into one rejection so the
/// response never reveals whether the account exists.
pub(crate) async fn verify_credentials(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let rejected = || ApiError::Unauthorized("Не удалось авторизироваться".into());

    let user = match users.find_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("login with unknown email");
            return Err(rejected());
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::Internal(e.to_string()));
        }
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => Ok(user),
        Ok(false) => {
            warn!(user_id = %user.id, "login with wrong password");
            Err(rejected())
        }
        Err(e) => {
            error!(error = %e, "verify_password failed");
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn register_body(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: None,
            about: None,
            avatar: None,
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@@example"));
        assert!(!is_valid_email("no spaces@example.com"));
    }

    #[tokio::test]
    async fn register_then_login_returns_token_for_that_user() {
        let state = AppState::in_memory();

        let Json(registered) = register(
            State(state.clone()),
            Json(register_body("Kusto@Example.com", "sea-and-ships")),
        )
        .await
        .expect("register");
        assert_eq!(registered.mail, "kusto@example.com");

        let Json(response) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "kusto@example.com".into(),
                password: "sea-and-ships".into(),
            }),
        )
        .await
        .expect("login");

        let keys = JwtKeys::from_ref(&state);
        let claims = keys.verify(&response.jwt).expect("token verifies");
        let user = state
            .users
            .find_by_email("kusto@example.com")
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let state = AppState::in_memory();
        register(
            State(state.clone()),
            Json(register_body("one@example.com", "right-password")),
        )
        .await
        .expect("register");

        let wrong_password = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "one@example.com".into(),
                password: "wrong-password".into(),
            }),
        )
        .await
        .err()
        .expect("rejected");

        let unknown_email = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "two@example.com".into(),
                password: "right-password".into(),
            }),
        )
        .await
        .err()
        .expect("rejected");

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let state = AppState::in_memory();
        register(
            State(state.clone()),
            Json(register_body("dup@example.com", "first")),
        )
        .await
        .expect("first register");

        let err = register(
            State(state.clone()),
            Json(register_body("dup@example.com", "second")),
        )
        .await
        .err()
        .expect("rejected");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Такой емейл уже зарегистрирован");
    }

    #[tokio::test]
    async fn malformed_email_is_a_bad_request() {
        let state = AppState::in_memory();
        let err = register(State(state), Json(register_body("not-an-email", "pw")))
            .await
            .err()
            .expect("rejected");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
