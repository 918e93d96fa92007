//! Session authentication.
//!
//! A successful register or login creates a row in `sessions` and hands
//! its token to the browser in the `token` cookie. [`AuthUser`] resolves
//! that cookie (or an `Authorization: Bearer` header) back to a user for
//! every protected handler.

use actix_web::{
    FromRequest, HttpRequest, HttpResponse,
    cookie::{Cookie, SameSite, time::Duration as CookieDuration},
    dev::Payload,
    http::header,
    web,
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use futures::future::LocalBoxFuture;
use lead_forge_database::{DbError, users};
use lead_forge_database_models::{NewUser, UserRow};
use lead_forge_server_models::{ApiUser, LoginRequest, MessageOnly, MessageResponse, RegisterRequest};

use crate::{AppState, error::ApiError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// The user behind the current request's session.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserRow);

impl AuthUser {
    /// Owner id for lead queries.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

fn unauthenticated() -> ApiError {
    ApiError::Unauthorized("Not authenticated".to_string())
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = session_token(req);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| ApiError::Internal("AppState is not registered".to_string()))?;
            let token = token.ok_or_else(unauthenticated)?;

            users::find_session_user(state.db.as_ref(), &token, Utc::now())
                .await?
                .map(Self)
                .ok_or_else(unauthenticated)
        })
    }
}

/// Hashes a password into a PHC string.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

/// Checks a password against a stored PHC string. Malformed hashes never
/// verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(CookieDuration::seconds(state.config.session_ttl.num_seconds()))
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

async fn open_session(state: &AppState, user: &UserRow) -> Result<Cookie<'static>, ApiError> {
    let token =
        users::create_session(state.db.as_ref(), &user.id, Utc::now(), state.config.session_ttl)
            .await?;
    Ok(session_cookie(state, token))
}

/// `POST /api/auth/register`
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let registration = body.validate().map_err(ApiError::validation)?;

    let password = registration.password;
    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing was cancelled: {e}")))??;

    let new_user = NewUser {
        email: registration.email,
        first_name: registration.first_name,
        last_name: registration.last_name,
        password_hash,
    };

    let user = match users::insert_user(state.db.as_ref(), &new_user, Utc::now()).await {
        Ok(user) => user,
        Err(DbError::Conflict { .. }) => {
            return Err(ApiError::Conflict("User already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let cookie = open_session(&state, &user).await?;

    Ok(HttpResponse::Created().cookie(cookie).json(MessageResponse {
        message: "Registration successful".to_string(),
        data: ApiUser::from(user),
    }))
}

/// `POST /api/auth/login`
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let (email, password) = body.validate().map_err(ApiError::validation)?;
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = users::find_user_by_email(state.db.as_ref(), &email)
        .await?
        .ok_or_else(invalid)?;

    let hash = user.password_hash.clone();
    let verified = web::block(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password check was cancelled: {e}")))?;
    if !verified {
        log::debug!("Failed login for {email}");
        return Err(invalid());
    }

    users::purge_expired_sessions(state.db.as_ref(), Utc::now()).await?;
    let cookie = open_session(&state, &user).await?;

    Ok(HttpResponse::Ok().cookie(cookie).json(MessageResponse {
        message: "Login successful".to_string(),
        data: ApiUser::from(user),
    }))
}

/// `POST /api/auth/logout`
///
/// Succeeds whether or not a session was present.
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    if let Some(token) = session_token(&req) {
        users::delete_session(state.db.as_ref(), &token).await?;
    }

    Ok(HttpResponse::Ok().cookie(removal_cookie()).json(MessageOnly {
        message: "Logout successful".to_string(),
    }))
}

/// `GET /api/auth/me`
pub async fn me(user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(ApiUser::from(user.0))
}
