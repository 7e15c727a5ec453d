//! Chart-facing endpoints: overviews, distributions, summary and goal.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::AppState;
use crate::categories::fetch_categories;
use crate::database::Db;
use crate::errors::ReadError;
use crate::expenses::fetch_expenses;
use crate::incomes::fetch_incomes;
use crate::models::{Category, ExpenseRecord, GoalPayload, IncomeRecord};
use crate::profile::{admin_guard, auth_guard};
use crate::reports::{
    self, CategoryAmount, CategorySlice, DatedAmount, OverviewMode, OverviewPoint,
};
use crate::utils::{db_error, or_empty, or_none, parse_day, today_utc};

#[derive(Deserialize, Debug)]
pub struct OverviewQuery {
    pub mode: Option<OverviewMode>,
}

fn to_dated(date: &str, amount: f64) -> Option<DatedAmount> {
    parse_day(date).map(|date| DatedAmount { date, amount })
}

pub async fn income_overview(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OverviewQuery>,
) -> Result<(StatusCode, Json<Vec<OverviewPoint>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;
    let mode = query.mode.unwrap_or(OverviewMode::Weekly);

    let incomes = fetch_incomes(&state.db, &user).await;
    let records: Vec<DatedAmount> = incomes
        .iter()
        .filter_map(|income| to_dated(&income.date, income.amount))
        .collect();

    let series = reports::overview(&records, mode, today_utc());
    Ok((StatusCode::OK, Json(series)))
}

pub async fn expense_overview(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OverviewQuery>,
) -> Result<(StatusCode, Json<Vec<OverviewPoint>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;
    let mode = query.mode.unwrap_or(OverviewMode::Weekly);

    let expenses = fetch_expenses(&state.db, &user.id).await;
    let records: Vec<DatedAmount> = expenses
        .iter()
        .filter_map(|expense| to_dated(&expense.date, expense.amount))
        .collect();

    let series = reports::overview(&records, mode, today_utc());
    Ok((StatusCode::OK, Json(series)))
}

pub async fn income_distribution(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<CategorySlice>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let (incomes, categories) = tokio::join!(
        fetch_incomes(&state.db, &user),
        fetch_categories(&state.db, &user.id),
    );
    let categories = or_empty(categories, "categories");
    let amounts: Vec<CategoryAmount> = incomes
        .iter()
        .map(|income| CategoryAmount {
            category: income.category.clone(),
            amount: income.amount,
        })
        .collect();

    let slices = reports::category_distribution(&amounts, &categories);
    Ok((StatusCode::OK, Json(slices)))
}

pub async fn expense_distribution(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<CategorySlice>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let (expenses, categories) = tokio::join!(
        fetch_expenses(&state.db, &user.id),
        fetch_categories(&state.db, &user.id),
    );
    let categories = or_empty(categories, "categories");
    let amounts: Vec<CategoryAmount> = expenses
        .iter()
        .map(|expense| CategoryAmount {
            category: expense.category.clone(),
            amount: expense.amount,
        })
        .collect();

    let slices = reports::category_distribution(&amounts, &categories);
    Ok((StatusCode::OK, Json(slices)))
}

async fn fetch_sold_quantities(
    db: &Db,
    owner_id: &str,
) -> Result<Vec<(String, f64)>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT p.name, ip.quantity FROM income_product ip \
             JOIN product p ON p.id = ip.product_id \
             WHERE p.user_id = ?",
            [owner_id],
        )
        .await?;

    let mut sold = Vec::new();
    while let Some(row) = rows.next().await? {
        let name: String = row.get(0)?;
        let quantity: f64 = row.get(1)?;
        sold.push((name, quantity));
    }
    Ok(sold)
}

pub async fn best_sellers(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<CategorySlice>>), (StatusCode, String)> {
    let admin = admin_guard(&state.profiles, &session).await?;
    let sold = or_empty(
        fetch_sold_quantities(&state.db, &admin.id).await,
        "best sellers",
    );
    Ok((StatusCode::OK, Json(reports::best_sellers(&sold))))
}

pub async fn fetch_goal(db: &Db, user_id: &str) -> Result<Option<f64>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query("SELECT goal FROM users WHERE id = ?", [user_id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(None),
    }
}

#[derive(Serialize, Debug)]
pub struct DashboardSummary {
    pub incomes: Vec<IncomeRecord>,
    pub expenses: Vec<ExpenseRecord>,
    pub categories: Vec<Category>,
    pub goal: Option<f64>,
}

/// One round trip for the dashboard page: four independent reads issued
/// concurrently and joined before the response is assembled.
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<DashboardSummary>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let (incomes, expenses, categories, goal) = tokio::join!(
        fetch_incomes(&state.db, &user),
        fetch_expenses(&state.db, &user.id),
        fetch_categories(&state.db, &user.id),
        fetch_goal(&state.db, &user.id),
    );

    let summary = DashboardSummary {
        incomes,
        expenses,
        categories: or_empty(categories, "categories"),
        goal: or_none(goal, "goal"),
    };
    Ok((StatusCode::OK, Json(summary)))
}

pub async fn get_goal(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<GoalPayload>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;
    let goal = or_none(fetch_goal(&state.db, &user.id).await, "goal");
    Ok((StatusCode::OK, Json(GoalPayload { goal })))
}

pub async fn update_goal(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<GoalPayload>,
) -> Result<(StatusCode, Json<GoalPayload>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    if let Some(goal) = payload.goal {
        if !goal.is_finite() || goal < 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "Goal must be a non-negative number".to_string(),
            ));
        }
    }

    let conn = state.db.write().await;
    conn.execute(
        "UPDATE users SET goal = ? WHERE id = ?",
        (payload.goal, user.id.as_str()),
    )
    .await
    .map_err(|_| db_error())?;
    drop(conn);

    // The cached profile carries the goal; refresh it.
    state.profiles.load_current_user(&user.id, true).await;

    Ok((StatusCode::OK, Json(payload)))
}
