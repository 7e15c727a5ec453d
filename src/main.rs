use axum::{
    Router,
    routing::{get, post},
};
use time::Duration;
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};
use tracing_subscriber::EnvFilter;

use finboard_server::{
    AppState, auth, categories, config::Config, constants::*, dashboard, database, employees,
    expenses, incomes, products, profile, transactions,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = database::init_db(&config.data_path).await?;
    let state = AppState::new(db);

    let store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(false)
        .with_name(SESSION_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_signed(Key::try_from(config.session_secret.as_bytes())?);

    let app = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/profile", get(auth::me).put(profile::update_profile))
        .route("/profile/account-type", get(profile::get_account_type))
        .route(
            "/categories",
            get(categories::get_categories).post(categories::create_category),
        )
        .route("/categories/{id}", axum::routing::delete(categories::delete_category))
        .route(
            "/products",
            get(products::get_products).post(products::create_product),
        )
        .route("/products/{id}", axum::routing::delete(products::delete_product))
        .route(
            "/incomes",
            get(incomes::get_incomes).post(incomes::create_income_source),
        )
        .route("/incomes/sale", post(incomes::record_sale))
        .route(
            "/incomes/source/{id}",
            axum::routing::delete(incomes::delete_income_source),
        )
        .route(
            "/incomes/product/{id}",
            axum::routing::delete(incomes::delete_income_product),
        )
        .route(
            "/expenses",
            get(expenses::get_expenses).post(expenses::create_normal_expense),
        )
        .route("/expenses/product", post(expenses::create_product_expense))
        .route(
            "/expenses/normal/{id}",
            axum::routing::delete(expenses::delete_normal_expense),
        )
        .route(
            "/expenses/product/{id}",
            axum::routing::delete(expenses::delete_product_expense),
        )
        .route("/employees", get(employees::get_employees))
        .route("/employees/stats", get(employees::get_employee_stats))
        .route(
            "/employees/gender-distribution",
            get(employees::get_gender_distribution),
        )
        .route("/dashboard/income-overview", get(dashboard::income_overview))
        .route("/dashboard/expense-overview", get(dashboard::expense_overview))
        .route(
            "/dashboard/income-distribution",
            get(dashboard::income_distribution),
        )
        .route(
            "/dashboard/expense-distribution",
            get(dashboard::expense_distribution),
        )
        .route(
            "/dashboard/recent-transactions",
            get(transactions::get_recent_transactions),
        )
        .route("/dashboard/best-sellers", get(dashboard::best_sellers))
        .route("/dashboard/summary", get(dashboard::summary))
        .route("/sales", get(transactions::get_my_sales))
        .route("/goal", get(dashboard::get_goal).put(dashboard::update_goal))
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server running on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
