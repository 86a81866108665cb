use axum::{extract::FromRef, extract::State, Json};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::dto::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UpdateAccountRequest,
    UpdateAccountResponse,
};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;
use crate::store::{NewUser, UserProfile};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

// The account routes answer 200 with an `error` field instead of using
// the error-status taxonomy; the mobile clients key off that field.

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(mut body): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    body.user_email = body.user_email.trim().to_lowercase();

    if !is_valid_email(&body.user_email) {
        warn!(email = %body.user_email, "invalid email");
        return Ok(Json(RegisterResponse {
            error: "Invalid email".into(),
        }));
    }

    if state
        .store
        .login_or_email_taken(&body.user_login, &body.user_email)
        .await?
    {
        warn!(login = %body.user_login, "account already exists");
        return Ok(Json(RegisterResponse {
            error: "Account Already Exists".into(),
        }));
    }

    let password_hash = hash_password(&body.user_password)?;
    let user = state
        .store
        .create_user(NewUser {
            first_name: body.user_first_name,
            last_name: body.user_last_name,
            email: body.user_email,
            login: body.user_login,
            password_hash,
        })
        .await?;

    info!(user_id = user.id, login = %user.login, "user registered");
    Ok(Json(RegisterResponse {
        error: String::new(),
    }))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let rejected = LoginResponse {
        access_token: None,
        user_id: None,
        user_first_name: None,
        user_last_name: None,
        error: "Login/Password incorrect".into(),
    };

    let Some(user) = state.store.find_user_by_login(&body.user_login).await? else {
        warn!(login = %body.user_login, "login unknown user");
        return Ok(Json(rejected));
    };

    if !verify_password(&body.user_password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Ok(Json(rejected));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.first_name, &user.last_name)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse {
        access_token: Some(token),
        user_id: Some(user.id),
        user_first_name: Some(user.first_name),
        user_last_name: Some(user.last_name),
        error: String::new(),
    }))
}

#[instrument(skip(state, body))]
pub async fn update_account(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateAccountRequest>,
) -> Result<Json<UpdateAccountResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    if let Err(err) = keys.verify(&body.user_jwt) {
        if JwtKeys::is_expired(&err) {
            return Ok(Json(UpdateAccountResponse {
                error: "The JWT is no longer valid".into(),
                user_jwt: String::new(),
            }));
        }
        warn!(error = %err, "update_account invalid token");
        return Ok(Json(UpdateAccountResponse {
            error: "Invalid token".into(),
            user_jwt: String::new(),
        }));
    }

    let updated = state
        .store
        .update_user(
            body.user_id,
            UserProfile {
                first_name: body.user_first_name,
                last_name: body.user_last_name,
                email: body.user_email.trim().to_lowercase(),
                login: body.user_login,
            },
        )
        .await?;

    let error = if updated {
        info!(user_id = body.user_id, "account updated");
        String::new()
    } else {
        "User not found".to_string()
    };

    let user_jwt = keys.refresh(&body.user_jwt)?;
    Ok(Json(UpdateAccountResponse { error, user_jwt }))
}
