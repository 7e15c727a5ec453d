use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::database::Db;
use crate::errors::ReadError;
use crate::models::{Category, CategoryKind, CreateCategoryPayload};
use crate::profile::auth_guard;
use crate::utils::{db_error, or_empty, validate_string_length};

pub fn extract_category_from_row(row: &libsql::Row) -> Result<Category, ReadError> {
    let get_err = |e: libsql::Error| ReadError::Query(format!("invalid category row: {}", e));

    let kind_raw: String = row.get(3).map_err(get_err)?;
    let kind = CategoryKind::parse(&kind_raw)
        .ok_or_else(|| ReadError::Query(format!("unknown category kind: {}", kind_raw)))?;

    Ok(Category {
        id: row.get(0).map_err(get_err)?,
        name: row.get(1).map_err(get_err)?,
        color: row.get(2).map_err(get_err)?,
        kind,
        user_id: row.get(4).map_err(get_err)?,
    })
}

/// The user's own categories plus the global ones (no owner).
pub async fn fetch_categories(db: &Db, user_id: &str) -> Result<Vec<Category>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, name, color, kind, user_id FROM category \
             WHERE user_id = ? OR user_id IS NULL",
            [user_id],
        )
        .await?;

    let mut categories = Vec::new();
    while let Some(row) = rows.next().await? {
        categories.push(extract_category_from_row(&row)?);
    }
    Ok(categories)
}

pub async fn category_name(db: &Db, category_id: &str) -> Result<Option<String>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query("SELECT name FROM category WHERE id = ?", [category_id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

pub async fn get_categories(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<Category>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;
    let categories = or_empty(
        fetch_categories(&state.db, &user.id).await,
        "categories",
    );
    Ok((StatusCode::OK, Json(categories)))
}

pub async fn create_category(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<(StatusCode, Json<Category>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    validate_string_length(&payload.name, "Category name", MAX_CATEGORY_NAME_LENGTH)?;
    let kind = CategoryKind::parse(&payload.kind).ok_or((
        StatusCode::BAD_REQUEST,
        "Category kind must be income, expense, product or all".to_string(),
    ))?;
    let name = payload.name.trim().to_string();
    let color = payload.color.trim().to_string();
    if color.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Category color cannot be empty".to_string(),
        ));
    }

    let conn = state.db.write().await;

    // A (name, owner) pair must not span conflicting kind scopes; 'all'
    // overlaps every kind.
    let mut existing = conn
        .query(
            "SELECT id FROM category \
             WHERE LOWER(name) = LOWER(?1) \
               AND (user_id = ?2 OR user_id IS NULL) \
               AND (kind = ?3 OR kind = 'all' OR ?3 = 'all')",
            (name.as_str(), user.id.as_str(), kind.as_str()),
        )
        .await
        .map_err(|_| db_error())?;

    if existing.next().await.map_err(|_| db_error())?.is_some() {
        return Err((
            StatusCode::CONFLICT,
            "Category name already exists (case-insensitive)".to_string(),
        ));
    }

    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO category (id, name, color, kind, user_id) VALUES (?, ?, ?, ?, ?)",
        (
            id.as_str(),
            name.as_str(),
            color.as_str(),
            kind.as_str(),
            user.id.as_str(),
        ),
    )
    .await
    .map_err(|_| db_error())?;

    let category = Category {
        id,
        name,
        color,
        kind,
        user_id: Some(user.id),
    };
    Ok((StatusCode::CREATED, Json(category)))
}

/// Only the owner can delete a category; global categories stay.
pub async fn delete_category(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let conn = state.db.write().await;
    let affected = conn
        .execute(
            "DELETE FROM category WHERE id = ? AND user_id = ?",
            (id.as_str(), user.id.as_str()),
        )
        .await
        .map_err(|_| db_error())?;

    if affected == 0 {
        return Err((StatusCode::NOT_FOUND, "Category not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
