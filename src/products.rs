use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::AppState;
use crate::categories::category_name;
use crate::constants::*;
use crate::database::Db;
use crate::errors::ReadError;
use crate::models::{CreateProductPayload, Product, Role};
use crate::profile::{admin_guard, auth_guard};
use crate::utils::{db_error, or_empty, validate_string_length};

pub async fn fetch_products(db: &Db, owner_id: &str) -> Result<Vec<Product>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT p.id, p.name, p.price, p.barcode, p.description, c.name \
             FROM product p \
             LEFT JOIN category c ON c.id = p.id_category \
             WHERE p.user_id = ?",
            [owner_id],
        )
        .await?;

    let mut products = Vec::new();
    while let Some(row) = rows.next().await? {
        let category: Option<String> = row.get(5)?;
        products.push(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
            price: row.get(2)?,
            barcode: row.get(3)?,
            description: row.get(4)?,
        });
    }
    Ok(products)
}

/// Admins see their own catalog; employees see their manager's (the
/// products they sell).
pub async fn get_products(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<Product>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let owner_id = match user.role {
        Role::Admin => user.id.clone(),
        Role::Employee => match user.manager_id.clone() {
            Some(manager_id) => manager_id,
            None => {
                tracing::warn!(user = %user.id, "employee has no manager, no products to list");
                return Ok((StatusCode::OK, Json(Vec::new())));
            }
        },
    };

    let products = or_empty(fetch_products(&state.db, &owner_id).await, "products");
    Ok((StatusCode::OK, Json(products)))
}

pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateProductPayload>,
) -> Result<(StatusCode, Json<Product>), (StatusCode, String)> {
    let user = admin_guard(&state.profiles, &session).await?;

    validate_string_length(&payload.name, "Product name", MAX_PRODUCT_NAME_LENGTH)?;
    validate_string_length(&payload.barcode, "Barcode", MAX_PRODUCT_NAME_LENGTH)?;
    if payload.price <= 0.0 || !payload.price.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Price must be greater than zero".to_string(),
        ));
    }

    let category = match payload.category_id.as_deref() {
        Some(category_id) => Some(
            category_name(&state.db, category_id)
                .await
                .map_err(|_| db_error())?
                .ok_or((
                    StatusCode::BAD_REQUEST,
                    "Category does not exist".to_string(),
                ))?,
        ),
        None => None,
    };

    let id = Uuid::new_v4().to_string();
    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO product (id, name, price, barcode, description, id_category, user_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            payload.name.trim(),
            payload.price,
            payload.barcode.trim(),
            payload.description.as_deref(),
            payload.category_id.as_deref(),
            user.id.as_str(),
        ),
    )
    .await
    .map_err(|_| db_error())?;

    let product = Product {
        id,
        name: payload.name.trim().to_string(),
        category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
        price: payload.price,
        barcode: payload.barcode.trim().to_string(),
        description: payload.description,
    };
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = admin_guard(&state.profiles, &session).await?;

    let conn = state.db.write().await;
    let affected = conn
        .execute(
            "DELETE FROM product WHERE id = ? AND user_id = ?",
            (id.as_str(), user.id.as_str()),
        )
        .await
        .map_err(|_| db_error())?;

    if affected == 0 {
        return Err((StatusCode::NOT_FOUND, "Product not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
