//! Merged income/expense recency view.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use time::{Date, Duration};
use tower_sessions::Session;

use crate::AppState;
use crate::constants::*;
use crate::database::Db;
use crate::errors::ReadError;
use crate::expenses::fetch_expenses;
use crate::incomes::fetch_incomes;
use crate::models::{ExpenseRecord, IncomeKind, IncomeRecord};
use crate::profile::{auth_guard, employee_guard};
use crate::reports::month_abbrev;
use crate::utils::{or_empty, parse_day, today_utc, validate_sales_limit};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransactionView {
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub kind: TransactionKind,
}

/// "Today", "Yesterday", or a short date; the year is only spelled out when
/// it differs from the current one.
pub fn date_label(date: Date, today: Date) -> String {
    if date == today {
        return "Today".to_string();
    }
    if date == today - Duration::days(1) {
        return "Yesterday".to_string();
    }
    if date.year() == today.year() {
        format!("{} {}", month_abbrev(date.month()), date.day())
    } else {
        format!("{} {}, {}", month_abbrev(date.month()), date.day(), date.year())
    }
}

/// Merges both record shapes, sorts descending by parsed date (stable, so
/// same-day records keep their merge order), keeps the newest five and
/// relabels the dates. Records with unparseable dates are dropped.
pub fn merge_recent(
    incomes: &[IncomeRecord],
    expenses: &[ExpenseRecord],
    today: Date,
) -> Vec<TransactionView> {
    let mut dated: Vec<(Date, TransactionView)> = Vec::new();

    for income in incomes {
        let Some(date) = parse_day(&income.date) else {
            tracing::debug!(id = %income.id, raw = %income.date, "skipping income with bad date");
            continue;
        };
        dated.push((
            date,
            TransactionView {
                name: income.name.clone(),
                amount: income.amount,
                date: String::new(),
                kind: TransactionKind::Income,
            },
        ));
    }
    for expense in expenses {
        let Some(date) = parse_day(&expense.date) else {
            tracing::debug!(id = %expense.id, raw = %expense.date, "skipping expense with bad date");
            continue;
        };
        dated.push((
            date,
            TransactionView {
                name: expense.name.clone(),
                amount: expense.amount,
                date: String::new(),
                kind: TransactionKind::Expense,
            },
        ));
    }

    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.truncate(RECENT_TRANSACTIONS_LIMIT);

    dated
        .into_iter()
        .map(|(date, mut view)| {
            view.date = date_label(date, today);
            view
        })
        .collect()
}

pub async fn get_recent_transactions(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<TransactionView>>), (StatusCode, String)> {
    let user = auth_guard(&state.profiles, &session).await?;

    let (incomes, expenses) = tokio::join!(
        fetch_incomes(&state.db, &user),
        fetch_expenses(&state.db, &user.id),
    );

    let recent = merge_recent(&incomes, &expenses, today_utc());
    Ok((StatusCode::OK, Json(recent)))
}

#[derive(Deserialize, Debug)]
pub struct SalesQuery {
    pub limit: Option<u32>,
}

/// A user's own product sales, newest first.
pub async fn fetch_last_sales(
    db: &Db,
    user_id: &str,
    limit: u32,
) -> Result<Vec<IncomeRecord>, ReadError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT ip.id, ip.quantity, ip.date, ip.notes, ip.payment_method, \
                    p.name, p.price, c.name \
             FROM income_product ip \
             LEFT JOIN product p ON p.id = ip.product_id \
             LEFT JOIN category c ON c.id = p.id_category \
             WHERE ip.user_id = ? \
             ORDER BY ip.date DESC \
             LIMIT ?",
            (user_id, limit as i64),
        )
        .await?;

    let mut sales = Vec::new();
    while let Some(row) = rows.next().await? {
        let quantity: f64 = row.get(1)?;
        let product_name: Option<String> = row.get(5)?;
        let price: Option<f64> = row.get(6)?;
        let category: Option<String> = row.get(7)?;

        sales.push(IncomeRecord {
            id: row.get(0)?,
            name: product_name.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
            amount: price.unwrap_or(0.0) * quantity,
            quantity: Some(quantity),
            date: row.get(2)?,
            notes: row.get(3)?,
            employee_name: None,
            payment_method: row.get(4)?,
            kind: IncomeKind::Product,
        });
    }
    Ok(sales)
}

pub async fn get_my_sales(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SalesQuery>,
) -> Result<(StatusCode, Json<Vec<IncomeRecord>>), (StatusCode, String)> {
    let user = employee_guard(&state.profiles, &session).await?;
    let limit = validate_sales_limit(query.limit)?;

    let sales = or_empty(
        fetch_last_sales(&state.db, &user.id, limit).await,
        "employee sales",
    );
    Ok((StatusCode::OK, Json(sales)))
}
