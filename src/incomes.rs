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
    CreateIncomeSourcePayload, IncomeKind, IncomeRecord, Profile, RecordSalePayload, Role,
};
use crate::profile::{admin_guard, auth_guard};
use crate::utils::{
    day_key, db_error, or_empty, today_utc, validate_amount, validate_date, validate_quantity,
    validate_string_length,
};

pub async fn fetch_income_sources(
    db: &Db,
    user_id: &str,
) -> Result<Vec<IncomeRecord>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT s.id, s.name, s.amount, s.date, s.notes, c.name \
             FROM income_source s \
             LEFT JOIN category c ON c.id = s.id_category \
             WHERE s.user_id = ?",
            [user_id],
        )
        .await?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        let category: Option<String> = row.get(5)?;
        records.push(IncomeRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
            amount: row.get(2)?,
            quantity: None,
            date: row.get(3)?,
            notes: row.get(4)?,
            employee_name: None,
            payment_method: None,
            kind: IncomeKind::Source,
        });
    }
    Ok(records)
}

/// Product-sale income, admin-only: the scope is the admin's own sales plus
/// every sale recorded by their direct reports. A non-admin caller gets an
/// empty list, not an error.
pub async fn fetch_income_products(
    db: &Db,
    user: &Profile,
) -> Result<Vec<IncomeRecord>, ReadError> {
    if user.role != Role::Admin {
        tracing::warn!(user = %user.id, "access denied: only admins can fetch product income");
        return Ok(Vec::new());
    }

    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT ip.id, ip.quantity, ip.date, ip.notes, ip.payment_method, \
                    p.name, p.price, c.name, u.first_name, u.last_name \
             FROM income_product ip \
             LEFT JOIN product p ON p.id = ip.product_id \
             LEFT JOIN category c ON c.id = p.id_category \
             LEFT JOIN users u ON u.id = ip.user_id \
             WHERE ip.user_id = ?1 \
                OR ip.user_id IN (SELECT id FROM users WHERE id_manager = ?1)",
            [user.id.as_str()],
        )
        .await?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        let quantity: f64 = row.get(1)?;
        let product_name: Option<String> = row.get(5)?;
        let price: Option<f64> = row.get(6)?;
        let category: Option<String> = row.get(7)?;
        let first_name: Option<String> = row.get(8)?;
        let last_name: Option<String> = row.get(9)?;

        records.push(IncomeRecord {
            id: row.get(0)?,
            name: product_name.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
            amount: price.unwrap_or(0.0) * quantity,
            quantity: Some(quantity),
            date: row.get(2)?,
            notes: row.get(3)?,
            employee_name: match (first_name, last_name) {
                (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
                _ => Some(UNKNOWN_LABEL.to_string()),
            },
            payment_method: row.get(4)?,
            kind: IncomeKind::Product,
        });
    }
    Ok(records)
}

/// Merged income list: both shapes fetched concurrently, each side degraded
/// to empty on failure.
pub async fn fetch_incomes(db: &Db, user: &Profile) -> Vec<IncomeRecord> {
    let (sources, products) = tokio::join!(
        fetch_income_sources(db, &user.id),
        fetch_income_products(db, user),
    );
    let mut incomes = or_empty(sources, "income sources");
    incomes.extend(or_empty(products, "product income"));
    incomes
}

pub async fn get_incomes(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<IncomeRecord>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;
    let incomes = fetch_incomes(&state.db, &user).await;
    Ok((StatusCode::OK, Json(incomes)))
}

pub async fn create_income_source(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateIncomeSourcePayload>,
) -> Result<(StatusCode, Json<IncomeRecord>), (StatusCode, String)> {
    let user = admin_guard(&state.profiles, &session).await?;

    validate_string_length(&payload.name, "Income name", MAX_RECORD_NAME_LENGTH)?;
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
        "INSERT INTO income_source (id, name, amount, date, notes, id_category, user_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            payload.name.trim(),
            payload.amount,
            payload.date.as_str(),
            payload.notes.as_deref(),
            payload.category_id.as_deref(),
            user.id.as_str(),
        ),
    )
    .await
    .map_err(|_| db_error())?;

    let record = IncomeRecord {
        id,
        name: payload.name.trim().to_string(),
        category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
        amount: payload.amount,
        quantity: None,
        date: payload.date,
        notes: payload.notes,
        employee_name: None,
        payment_method: None,
        kind: IncomeKind::Source,
    };
    Ok((StatusCode::CREATED, Json(record)))
}

/// Employee sale flow: the product row supplies price and name, the amount
/// is derived, and the sale is attributed to the signed-in user.
pub async fn record_sale(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<RecordSalePayload>,
) -> Result<(StatusCode, Json<IncomeRecord>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;
    validate_quantity(payload.quantity)?;

    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT p.name, p.price, c.name FROM product p \
             LEFT JOIN category c ON c.id = p.id_category \
             WHERE p.id = ?",
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
    let category: Option<String> = row.get(2).map_err(|_| db_error())?;
    drop(rows);
    drop(conn);

    let id = Uuid::new_v4().to_string();
    let date = day_key(today_utc());

    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO income_product \
         (id, product_id, quantity, date, scan_type, notes, payment_method, user_id) \
         VALUES (?, ?, ?, ?, NULL, ?, ?, ?)",
        (
            id.as_str(),
            payload.product_id.as_str(),
            payload.quantity,
            date.as_str(),
            payload.notes.as_deref(),
            payload.payment_method.as_deref(),
            user.id.as_str(),
        ),
    )
    .await
    .map_err(|_| db_error())?;

    let record = IncomeRecord {
        id,
        name: format!("Sale: {}", product_name),
        category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
        amount: price * payload.quantity,
        quantity: Some(payload.quantity),
        date,
        notes: payload.notes,
        employee_name: Some(user.full_name()),
        payment_method: payload.payment_method,
        kind: IncomeKind::Product,
    };
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn delete_income_source(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let conn = state.db.write().await;
    let affected = conn
        .execute(
            "DELETE FROM income_source WHERE id = ? AND user_id = ?",
            (id.as_str(), user.id.as_str()),
        )
        .await
        .map_err(|_| db_error())?;

    if affected == 0 {
        return Err((StatusCode::NOT_FOUND, "Income not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_income_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let conn = state.db.write().await;
    let affected = conn
        .execute(
            "DELETE FROM income_product WHERE id = ? AND user_id = ?",
            (id.as_str(), user.id.as_str()),
        )
        .await
        .map_err(|_| db_error())?;

    if affected == 0 {
        return Err((StatusCode::NOT_FOUND, "Sale not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
