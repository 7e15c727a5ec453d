use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tower_sessions::Session;

use crate::AppState;
use crate::database::Db;
use crate::errors::ReadError;
use crate::models::Profile;
use crate::profile::{PROFILE_COLUMNS, business_guard, extract_profile_from_row};
use crate::reports::{self, CategorySlice};
use crate::utils::{day_key, month_start, or_empty, or_none, today_utc};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmployeeOfMonth {
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct EmployeeStats {
    pub total_employees: u32,
    pub active_today: u32,
    pub average_sales: i64,
    pub employee_of_the_month: Option<EmployeeOfMonth>,
}

/// Direct reports of a manager, newest first.
pub async fn fetch_employees(db: &Db, manager_id: &str) -> Result<Vec<Profile>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {} FROM users WHERE id_manager = ? ORDER BY created_at DESC",
                PROFILE_COLUMNS
            ),
            [manager_id],
        )
        .await?;

    let mut employees = Vec::new();
    while let Some(row) = rows.next().await? {
        employees.push(extract_profile_from_row(&row)?);
    }
    Ok(employees)
}

pub async fn count_employees(db: &Db, manager_id: &str) -> Result<u32, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM users WHERE id_manager = ?",
            [manager_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => {
            let count: i64 = row.get(0)?;
            Ok(count as u32)
        }
        None => Ok(0),
    }
}

/// Employees with at least one sale recorded today.
pub async fn count_active_today(db: &Db, manager_id: &str) -> Result<u32, ReadError> {
    let today = day_key(today_utc());
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT COUNT(DISTINCT ip.user_id) FROM income_product ip \
             JOIN users u ON u.id = ip.user_id \
             WHERE u.id_manager = ? AND ip.date >= ?",
            (manager_id, today.as_str()),
        )
        .await?;
    match rows.next().await? {
        Some(row) => {
            let count: i64 = row.get(0)?;
            Ok(count as u32)
        }
        None => Ok(0),
    }
}

/// Average revenue per employee since the start of the current month,
/// rounded to the nearest integer. Zero when there are no employees.
pub async fn average_sales_per_employee(db: &Db, manager_id: &str) -> Result<i64, ReadError> {
    let since = day_key(month_start(today_utc()));
    let conn = db.read().await;

    let mut rows = conn
        .query(
            "SELECT COUNT(DISTINCT u.id), \
                    COALESCE(SUM(ip.quantity * COALESCE(p.price, 0)), 0.0) \
             FROM users u \
             LEFT JOIN income_product ip ON ip.user_id = u.id AND ip.date >= ?1 \
             LEFT JOIN product p ON p.id = ip.product_id \
             WHERE u.id_manager = ?2",
            (since.as_str(), manager_id),
        )
        .await?;

    match rows.next().await? {
        Some(row) => {
            let employees: i64 = row.get(0)?;
            let total: f64 = row.get(1)?;
            if employees == 0 {
                Ok(0)
            } else {
                Ok((total / employees as f64).round() as i64)
            }
        }
        None => Ok(0),
    }
}

/// The direct report with the highest revenue since month start.
pub async fn employee_of_the_month(
    db: &Db,
    manager_id: &str,
) -> Result<Option<EmployeeOfMonth>, ReadError> {
    let since = day_key(month_start(today_utc()));
    let conn = db.read().await;

    let mut rows = conn
        .query(
            "SELECT u.first_name, u.last_name, u.avatar_url, \
                    SUM(ip.quantity * COALESCE(p.price, 0)) AS revenue \
             FROM income_product ip \
             JOIN users u ON u.id = ip.user_id \
             LEFT JOIN product p ON p.id = ip.product_id \
             WHERE u.id_manager = ?1 AND ip.date >= ?2 \
             GROUP BY ip.user_id \
             ORDER BY revenue DESC \
             LIMIT 1",
            (manager_id, since.as_str()),
        )
        .await?;

    match rows.next().await? {
        Some(row) => {
            let first_name: String = row.get(0)?;
            let last_name: String = row.get(1)?;
            Ok(Some(EmployeeOfMonth {
                name: format!("{} {}", first_name, last_name),
                avatar_url: row.get(2)?,
            }))
        }
        None => Ok(None),
    }
}

async fn fetch_gender_rows(db: &Db, manager_id: &str) -> Result<Vec<Option<String>>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT gender FROM users WHERE id_manager = ?",
            [manager_id],
        )
        .await?;

    let mut genders = Vec::new();
    while let Some(row) = rows.next().await? {
        genders.push(row.get(0)?);
    }
    Ok(genders)
}

pub async fn get_employees(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<Profile>>), (StatusCode, String)> {
    let admin = business_guard(&state.profiles, &session).await?;
    let employees = or_empty(fetch_employees(&state.db, &admin.id).await, "employees");
    Ok((StatusCode::OK, Json(employees)))
}

/// Dashboard stat tiles. The four aggregates are independent queries issued
/// concurrently; each one degrades to its zero value on failure.
pub async fn get_employee_stats(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<EmployeeStats>), (StatusCode, String)> {
    let admin = business_guard(&state.profiles, &session).await?;

    let (total, active, average, top) = tokio::join!(
        count_employees(&state.db, &admin.id),
        count_active_today(&state.db, &admin.id),
        average_sales_per_employee(&state.db, &admin.id),
        employee_of_the_month(&state.db, &admin.id),
    );

    let stats = EmployeeStats {
        total_employees: total.unwrap_or_else(|e| {
            tracing::error!(error = %e, "employee count read failed");
            0
        }),
        active_today: active.unwrap_or_else(|e| {
            tracing::error!(error = %e, "active employees read failed");
            0
        }),
        average_sales: average.unwrap_or_else(|e| {
            tracing::error!(error = %e, "average sales read failed");
            0
        }),
        employee_of_the_month: or_none(top, "employee of the month"),
    };
    Ok((StatusCode::OK, Json(stats)))
}

pub async fn get_gender_distribution(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<CategorySlice>>), (StatusCode, String)> {
    let admin = business_guard(&state.profiles, &session).await?;
    let genders = or_empty(
        fetch_gender_rows(&state.db, &admin.id).await,
        "gender distribution",
    );
    Ok((StatusCode::OK, Json(reports::gender_distribution(&genders))))
}
