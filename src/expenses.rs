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
use crate::models::{
    CreateNormalExpensePayload, CreateProductExpensePayload, ExpenseKind, ExpenseRecord,
};
use crate::profile::auth_guard;
use crate::utils::{
    db_error, or_empty, validate_amount, validate_date, validate_quantity,
    validate_string_length,
};

pub async fn fetch_normal_expenses(
    db: &Db,
    user_id: &str,
) -> Result<Vec<ExpenseRecord>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT e.id, e.name, e.amount, e.date, e.notes, e.receipt, c.name \
             FROM normal_expenses e \
             LEFT JOIN category c ON c.id = e.category_id \
             WHERE e.user_id = ?",
            [user_id],
        )
        .await?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        let category: Option<String> = row.get(6)?;
        records.push(ExpenseRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
            amount: row.get(2)?,
            quantity: None,
            date: row.get(3)?,
            notes: row.get(4)?,
            receipt: row.get(5)?,
            kind: ExpenseKind::Normal,
        });
    }
    Ok(records)
}

/// Product-purchase expenses; the amount is derived from the product price
/// times the purchased quantity.
pub async fn fetch_product_expenses(
    db: &Db,
    user_id: &str,
) -> Result<Vec<ExpenseRecord>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT e.id, e.quantity, e.date, e.notes, e.receipt, p.name, p.price, c.name \
             FROM product_expenses e \
             LEFT JOIN product p ON p.id = e.product_id \
             LEFT JOIN category c ON c.id = e.category_id \
             WHERE e.user_id = ?",
            [user_id],
        )
        .await?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        let quantity: f64 = row.get(1)?;
        let product_name: Option<String> = row.get(5)?;
        let price: Option<f64> = row.get(6)?;
        let category: Option<String> = row.get(7)?;

        records.push(ExpenseRecord {
            id: row.get(0)?,
            name: product_name.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
            amount: price.unwrap_or(0.0) * quantity,
            quantity: Some(quantity),
            date: row.get(2)?,
            notes: row.get(3)?,
            receipt: row.get(4)?,
            kind: ExpenseKind::Product,
        });
    }
    Ok(records)
}

/// Merged expense list, both shapes fetched concurrently and degraded
/// independently.
pub async fn fetch_expenses(db: &Db, user_id: &str) -> Vec<ExpenseRecord> {
    let (normal, product) = tokio::join!(
        fetch_normal_expenses(db, user_id),
        fetch_product_expenses(db, user_id),
    );
    let mut expenses = or_empty(normal, "normal expenses");
    expenses.extend(or_empty(product, "product expenses"));
    expenses
}

pub async fn get_expenses(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<ExpenseRecord>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;
    let expenses = fetch_expenses(&state.db, &user.id).await;
    Ok((StatusCode::OK, Json(expenses)))
}

pub async fn create_normal_expense(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateNormalExpensePayload>,
) -> Result<(StatusCode, Json<ExpenseRecord>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    validate_string_length(&payload.name, "Expense name", MAX_RECORD_NAME_LENGTH)?;
    validate_amount(payload.amount, "Amount")?;
    validate_date(&payload.date)?;

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
        "INSERT INTO normal_expenses \
         (id, name, amount, date, notes, receipt, category_id, user_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            payload.name.trim(),
            payload.amount,
            payload.date.as_str(),
            payload.notes.as_deref(),
            payload.receipt.as_deref(),
            payload.category_id.as_deref(),
            user.id.as_str(),
        ),
    )
    .await
    .map_err(|_| db_error())?;

    let record = ExpenseRecord {
        id,
        name: payload.name.trim().to_string(),
        category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
        amount: payload.amount,
        quantity: None,
        date: payload.date,
        notes: payload.notes,
        receipt: payload.receipt,
        kind: ExpenseKind::Normal,
    };
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn create_product_expense(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateProductExpensePayload>,
) -> Result<(StatusCode, Json<ExpenseRecord>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    validate_quantity(payload.quantity)?;
    validate_date(&payload.date)?;

    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT name, price FROM product WHERE id = ?",
            [payload.product_id.as_str()],
        )
        .await
        .map_err(|_| db_error())?;
    let row = rows
        .next()
        .await
        .map_err(|_| db_error())?
        .ok_or((StatusCode::BAD_REQUEST, "Product not found".to_string()))?;
    let product_name: String = row.get(0).map_err(|_| db_error())?;
    let price: f64 = row.get(1).map_err(|_| db_error())?;
    drop(rows);
    drop(conn);

    let category = match payload.category_id.as_deref() {
        Some(category_id) => category_name(&state.db, category_id)
            .await
            .map_err(|_| db_error())?,
        None => None,
    };

    let id = Uuid::new_v4().to_string();
    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO product_expenses \
         (id, product_id, quantity, date, notes, receipt, category_id, user_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            payload.product_id.as_str(),
            payload.quantity,
            payload.date.as_str(),
            payload.notes.as_deref(),
            payload.receipt.as_deref(),
            payload.category_id.as_deref(),
            user.id.as_str(),
        ),
    )
    .await
    .map_err(|_| db_error())?;

    let record = ExpenseRecord {
        id,
        name: product_name,
        category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
        amount: price * payload.quantity,
        quantity: Some(payload.quantity),
        date: payload.date,
        notes: payload.notes,
        receipt: payload.receipt,
        kind: ExpenseKind::Product,
    };
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn delete_normal_expense(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let conn = state.db.write().await;
    let affected = conn
        .execute(
            "DELETE FROM normal_expenses WHERE id = ? AND user_id = ?",
            (id.as_str(), user.id.as_str()),
        )
        .await
        .map_err(|_| db_error())?;

    if affected == 0 {
        return Err((StatusCode::NOT_FOUND, "Expense not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_product_expense(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let conn = state.db.write().await;
    let affected = conn
        .execute(
            "DELETE FROM product_expenses WHERE id = ? AND user_id = ?",
            (id.as_str(), user.id.as_str()),
        )
        .await
        .map_err(|_| db_error())?;

    if affected == 0 {
        return Err((StatusCode::NOT_FOUND, "Expense not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
