use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::models::{LoginPayload, Profile, PublicUser, RegisterPayload, Role};
use crate::utils::{now_timestamp, validate_string_length};

pub async fn session_user_id(session: &Session) -> Result<String, (StatusCode, String)> {
    let user_id: Option<String> = session
        .get(SESSION_USER_ID)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    user_id.ok_or((StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED.to_string()))
}

/// The cheap identity-provider signal: the account-type string stashed in
/// the session at login. May be absent or stale; callers normalize it and
/// fall back to the profile row.
pub async fn session_account_type_hint(session: &Session) -> Option<String> {
    session.get(SESSION_ACCOUNT_TYPE).await.ok().flatten()
}

async fn create_user(
    state: &AppState,
    payload: &RegisterPayload,
    role: Role,
) -> anyhow::Result<PublicUser> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    let id = Uuid::new_v4().to_string();
    let email = payload.email.trim().to_lowercase();

    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, role, \
         account_type, gender, tel_number, id_manager, language, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'en', ?)",
        (
            id.as_str(),
            email.as_str(),
            hash.as_str(),
            payload.first_name.trim(),
            payload.last_name.trim(),
            role.as_str(),
            payload.account_type.as_deref().map(str::trim),
            payload.gender.as_deref(),
            payload.tel_number.as_deref(),
            payload.manager_id.as_deref(),
            now_timestamp(),
        ),
    )
    .await?;

    Ok(PublicUser {
        id,
        email,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        role,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') || email.len() > MAX_EMAIL_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            "A valid email address is required".to_string(),
        ));
    }
    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            ),
        ));
    }
    validate_string_length(&payload.first_name, "First name", MAX_NAME_LENGTH)?;
    validate_string_length(&payload.last_name, "Last name", MAX_NAME_LENGTH)?;

    let role = match payload.role.as_deref() {
        Some(raw) => Role::parse(raw)
            .ok_or((StatusCode::BAD_REQUEST, "Unknown role".to_string()))?,
        None => Role::Admin,
    };
    // Employees only exist under a manager.
    if role == Role::Employee && payload.manager_id.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Employee accounts require a manager".to_string(),
        ));
    }

    let user = create_user(&state, &payload, role).await.map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            (
                StatusCode::CONFLICT,
                "This email is already registered".to_string(),
            )
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

struct Credentials {
    user_id: String,
    password_hash: String,
    account_type: Option<String>,
}

async fn get_credentials_by_email(
    state: &AppState,
    email: &str,
) -> anyhow::Result<Option<Credentials>> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, password_hash, account_type FROM users WHERE email = ?",
            [email],
        )
        .await?;

    if let Some(row) = rows.next().await? {
        Ok(Some(Credentials {
            user_id: row.get(0)?,
            password_hash: row.get(1)?,
            account_type: row.get(2)?,
        }))
    } else {
        Ok(None)
    }
}

fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<(StatusCode, Json<Profile>), (StatusCode, String)> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Email cannot be empty".to_string()));
    }
    if payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Password cannot be empty".to_string(),
        ));
    }

    let credentials = get_credentials_by_email(&state, &email)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((
            StatusCode::UNAUTHORIZED,
            ERR_INVALID_CREDENTIALS.to_string(),
        ))?;

    let is_valid = verify_password(&payload.password, &credentials.password_hash)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if !is_valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            ERR_INVALID_CREDENTIALS.to_string(),
        ));
    }

    session
        .insert(SESSION_USER_ID, &credentials.user_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if let Some(account_type) = &credentials.account_type {
        session
            .insert(SESSION_ACCOUNT_TYPE, account_type)
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    }

    // Sign-in must never see the previous session's cached identity.
    let profile = state
        .profiles
        .load_current_user(&credentials.user_id, true)
        .await
        .ok_or((StatusCode::INTERNAL_SERVER_ERROR, ERR_DATABASE_ACCESS.to_string()))?;

    Ok((StatusCode::OK, Json(profile)))
}

pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<StatusCode, (StatusCode, String)> {
    if let Ok(user_id) = session_user_id(&session).await {
        state.profiles.clear_user_cache(&user_id).await;
    }
    session.clear().await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Profile>), (StatusCode, String)> {
    let user_id = session_user_id(&session).await?;
    let profile = state
        .profiles
        .load_current_user(&user_id, false)
        .await
        .ok_or((StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED.to_string()))?;

    Ok((StatusCode::OK, Json(profile)))
}
