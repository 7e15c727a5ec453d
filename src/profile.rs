//! Cached current-user state and effective-account-type resolution.
//!
//! The cache distinguishes "never checked" from "checked, nothing there":
//! a `CacheSlot::Loaded(None)` is remembered so a failing profile query is
//! not re-issued on every call. Sign-out must clear the slot so a stale
//! identity never leaks into the next session.

use std::collections::HashMap;
use std::future::Future;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_sessions::Session;

use crate::AppState;
use crate::auth::{session_account_type_hint, session_user_id};
use crate::constants::*;
use crate::database::Db;
use crate::errors::ReadError;
use crate::models::{AccountType, Profile, Role, UpdateProfilePayload};
use crate::utils::db_error;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheSlot {
    /// No load attempted yet for this user.
    Unloaded,
    /// A load completed; `None` means no row was found (or the query failed).
    Loaded(Option<Profile>),
}

#[derive(Default)]
pub struct ProfileCache {
    slots: RwLock<HashMap<String, Option<Profile>>>,
}

impl ProfileCache {
    pub async fn slot(&self, user_id: &str) -> CacheSlot {
        match self.slots.read().await.get(user_id) {
            Some(profile) => CacheSlot::Loaded(profile.clone()),
            None => CacheSlot::Unloaded,
        }
    }

    pub async fn store(&self, user_id: &str, profile: Option<Profile>) {
        self.slots
            .write()
            .await
            .insert(user_id.to_string(), profile);
    }

    pub async fn clear(&self, user_id: &str) {
        self.slots.write().await.remove(user_id);
    }

}

/// Seam between the cache logic and the users table, so cache semantics can
/// be pinned down in tests with a counting source.
pub trait ProfileSource {
    fn fetch_profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Profile>, ReadError>> + Send;
}

pub struct DbProfileSource {
    db: Db,
}

impl DbProfileSource {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

pub const PROFILE_COLUMNS: &str = "id, email, first_name, last_name, role, account_type, \
     gender, tel_number, country, currency, language, theme, avatar_url, id_manager, goal";

pub fn extract_profile_from_row(row: &libsql::Row) -> Result<Profile, ReadError> {
    let get_err = |e: libsql::Error| ReadError::Query(format!("invalid profile row: {}", e));

    let role_raw: String = row.get(4).map_err(get_err)?;
    let role = Role::parse(&role_raw)
        .ok_or_else(|| ReadError::Query(format!("unknown role: {}", role_raw)))?;
    let account_type_raw: Option<String> = row.get(5).map_err(get_err)?;

    Ok(Profile {
        id: row.get(0).map_err(get_err)?,
        email: row.get(1).map_err(get_err)?,
        first_name: row.get(2).map_err(get_err)?,
        last_name: row.get(3).map_err(get_err)?,
        role,
        account_type: account_type_raw.as_deref().and_then(AccountType::parse),
        gender: row.get(6).map_err(get_err)?,
        tel_number: row.get(7).map_err(get_err)?,
        country: row.get(8).map_err(get_err)?,
        currency: row.get(9).map_err(get_err)?,
        language: row.get(10).map_err(get_err)?,
        theme: row.get(11).map_err(get_err)?,
        avatar_url: row.get(12).map_err(get_err)?,
        manager_id: row.get(13).map_err(get_err)?,
        goal: row.get(14).map_err(get_err)?,
    })
}

impl ProfileSource for DbProfileSource {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, ReadError> {
        let conn = self.db.read().await;
        let mut rows = conn
            .query(
                &format!("SELECT {} FROM users WHERE id = ?", PROFILE_COLUMNS),
                [user_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(extract_profile_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

pub struct ProfileService<S> {
    source: S,
    cache: ProfileCache,
}

impl<S: ProfileSource> ProfileService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: ProfileCache::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn cached_slot(&self, user_id: &str) -> CacheSlot {
        self.cache.slot(user_id).await
    }

    /// Returns the cached profile unless `force_refresh` is set or the slot
    /// is still `Unloaded`. A failed fetch is cached as `Loaded(None)`.
    pub async fn load_current_user(&self, user_id: &str, force_refresh: bool) -> Option<Profile> {
        if !force_refresh {
            if let CacheSlot::Loaded(profile) = self.cache.slot(user_id).await {
                return profile;
            }
        }

        let fetched = match self.source.fetch_profile(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::error!(user = user_id, error = %err, "profile load failed");
                None
            }
        };
        self.cache.store(user_id, fetched.clone()).await;
        fetched
    }

    pub async fn clear_user_cache(&self, user_id: &str) {
        self.cache.clear(user_id).await;
    }

    /// Resolves the normalized account type without an unnecessary round
    /// trip: cached profile first, then the session metadata hint, then a
    /// full load. The ordering is a latency shortcut, not a correctness
    /// requirement.
    pub async fn effective_account_type(
        &self,
        user_id: &str,
        metadata_hint: Option<&str>,
    ) -> Option<AccountType> {
        if let CacheSlot::Loaded(Some(profile)) = self.cache.slot(user_id).await {
            if let Some(account_type) = profile.account_type {
                return Some(account_type);
            }
        }

        if let Some(hint) = metadata_hint {
            if let Some(account_type) = AccountType::parse(hint) {
                return Some(account_type);
            }
            tracing::debug!(hint, "unrecognized account-type hint, falling back to profile row");
        }

        self.load_current_user(user_id, false)
            .await
            .and_then(|profile| profile.account_type)
    }

    pub async fn is_business_account(
        &self,
        user_id: &str,
        metadata_hint: Option<&str>,
    ) -> bool {
        self.effective_account_type(user_id, metadata_hint).await
            == Some(AccountType::Business)
    }
}

// ---- route guards ----
//
// Boolean gates evaluated per request; failure maps to the HTTP analogue of
// the original redirect (401 without a session/profile, 403 on wrong role).
// Guards force-refresh so a role edit takes effect on the next navigation.

pub async fn auth_guard<S: ProfileSource>(
    profiles: &ProfileService<S>,
    session: &Session,
) -> Result<Profile, (StatusCode, String)> {
    let user_id = session_user_id(session).await?;
    profiles
        .load_current_user(&user_id, true)
        .await
        .ok_or((StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED.to_string()))
}

pub async fn admin_guard<S: ProfileSource>(
    profiles: &ProfileService<S>,
    session: &Session,
) -> Result<Profile, (StatusCode, String)> {
    let profile = auth_guard(profiles, session).await?;
    if profile.role != Role::Admin {
        tracing::warn!(user = %profile.id, "admin guard rejected non-admin");
        return Err((StatusCode::FORBIDDEN, ERR_ADMIN_ONLY.to_string()));
    }
    Ok(profile)
}

pub async fn employee_guard<S: ProfileSource>(
    profiles: &ProfileService<S>,
    session: &Session,
) -> Result<Profile, (StatusCode, String)> {
    let profile = auth_guard(profiles, session).await?;
    if profile.role != Role::Employee {
        tracing::warn!(user = %profile.id, "employee guard rejected non-employee");
        return Err((StatusCode::FORBIDDEN, ERR_EMPLOYEE_ONLY.to_string()));
    }
    Ok(profile)
}

/// Employee management exists for business accounts only; personal accounts
/// have no reports under them.
pub async fn business_guard<S: ProfileSource>(
    profiles: &ProfileService<S>,
    session: &Session,
) -> Result<Profile, (StatusCode, String)> {
    let profile = admin_guard(profiles, session).await?;
    let hint = session_account_type_hint(session).await;
    if !profiles.is_business_account(&profile.id, hint.as_deref()).await {
        tracing::warn!(user = %profile.id, "business guard rejected personal account");
        return Err((StatusCode::FORBIDDEN, ERR_BUSINESS_ONLY.to_string()));
    }
    Ok(profile)
}

// ---- profile endpoints ----

#[derive(Serialize, Debug)]
pub struct AccountTypeResponse {
    pub account_type: Option<AccountType>,
}

pub async fn get_account_type(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<AccountTypeResponse>), (StatusCode, String)> {
    let user_id = session_user_id(&session).await?;
    let hint = session_account_type_hint(&session).await;

    let account_type = state
        .profiles
        .effective_account_type(&user_id, hint.as_deref())
        .await;
    Ok((StatusCode::OK, Json(AccountTypeResponse { account_type })))
}

/// Partial profile edit; absent fields keep their current value. The cached
/// profile is force-refreshed afterwards so the next read sees the edit.
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<(StatusCode, Json<Profile>), (StatusCode, String)> {
    let user_id = session_user_id(&session).await?;

    let conn = state.db.write().await;
    conn.execute(
        "UPDATE users SET \
         first_name = COALESCE(?, first_name), \
         last_name = COALESCE(?, last_name), \
         gender = COALESCE(?, gender), \
         tel_number = COALESCE(?, tel_number), \
         country = COALESCE(?, country), \
         currency = COALESCE(?, currency), \
         language = COALESCE(?, language), \
         theme = COALESCE(?, theme), \
         avatar_url = COALESCE(?, avatar_url) \
         WHERE id = ?",
        (
            payload.first_name.as_deref().map(str::trim),
            payload.last_name.as_deref().map(str::trim),
            payload.gender.as_deref(),
            payload.tel_number.as_deref(),
            payload.country.as_deref(),
            payload.currency.as_deref(),
            payload.language.as_deref(),
            payload.theme.as_deref(),
            payload.avatar_url.as_deref(),
            user_id.as_str(),
        ),
    )
    .await
    .map_err(|_| db_error())?;
    drop(conn);

    let profile = state
        .profiles
        .load_current_user(&user_id, true)
        .await
        .ok_or((StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED.to_string()))?;
    Ok((StatusCode::OK, Json(profile)))
}
