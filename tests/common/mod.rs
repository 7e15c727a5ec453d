#![allow(dead_code)]

use finboard_server::database::{Db, init_db};
use finboard_server::models::{Profile, Role};
use tempfile::TempDir;
use uuid::Uuid;

/// Isolated database in a temp directory. Keep the TempDir alive for the
/// duration of the test.
pub async fn setup_test_db() -> (Db, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();

    let db = init_db(&data_path)
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize database at {}: {}", data_path, e));

    (db, temp_dir)
}

pub async fn create_test_user(
    db: &Db,
    email: &str,
    role: &str,
    account_type: Option<&str>,
    manager_id: Option<&str>,
) -> String {
    create_named_user(db, email, "Test", "User", role, account_type, manager_id).await
}

pub async fn create_named_user(
    db: &Db,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
    account_type: Option<&str>,
    manager_id: Option<&str>,
) -> String {
    let id = Uuid::new_v4().to_string();
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, role, \
         account_type, id_manager, language, created_at) \
         VALUES (?, ?, 'hash', ?, ?, ?, ?, ?, 'en', 0)",
        (
            id.as_str(),
            email,
            first_name,
            last_name,
            role,
            account_type,
            manager_id,
        ),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test user {}: {}", email, e));
    id
}

pub async fn create_test_category(
    db: &Db,
    user_id: Option<&str>,
    name: &str,
    color: &str,
    kind: &str,
) -> String {
    let id = Uuid::new_v4().to_string();
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO category (id, name, color, kind, user_id) VALUES (?, ?, ?, ?, ?)",
        (id.as_str(), name, color, kind, user_id),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test category {}: {}", name, e));
    id
}

pub async fn create_test_product(
    db: &Db,
    owner_id: &str,
    name: &str,
    price: f64,
    category_id: Option<&str>,
) -> String {
    let id = Uuid::new_v4().to_string();
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO product (id, name, price, barcode, description, id_category, user_id) \
         VALUES (?, ?, ?, '0000', NULL, ?, ?)",
        (id.as_str(), name, price, category_id, owner_id),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test product {}: {}", name, e));
    id
}

pub async fn create_test_income_source(
    db: &Db,
    user_id: &str,
    name: &str,
    amount: f64,
    date: &str,
    category_id: Option<&str>,
) -> String {
    let id = Uuid::new_v4().to_string();
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO income_source (id, name, amount, date, notes, id_category, user_id) \
         VALUES (?, ?, ?, ?, NULL, ?, ?)",
        (id.as_str(), name, amount, date, category_id, user_id),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test income {}: {}", name, e));
    id
}

pub async fn create_test_sale(
    db: &Db,
    user_id: &str,
    product_id: &str,
    quantity: f64,
    date: &str,
) -> String {
    let id = Uuid::new_v4().to_string();
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO income_product \
         (id, product_id, quantity, date, scan_type, notes, payment_method, user_id) \
         VALUES (?, ?, ?, ?, NULL, NULL, NULL, ?)",
        (id.as_str(), product_id, quantity, date, user_id),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test sale: {}", e));
    id
}

pub async fn create_test_normal_expense(
    db: &Db,
    user_id: &str,
    name: &str,
    amount: f64,
    date: &str,
    category_id: Option<&str>,
) -> String {
    let id = Uuid::new_v4().to_string();
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO normal_expenses \
         (id, name, amount, date, notes, receipt, category_id, user_id) \
         VALUES (?, ?, ?, ?, NULL, NULL, ?, ?)",
        (id.as_str(), name, amount, date, category_id, user_id),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test expense {}: {}", name, e));
    id
}

pub async fn create_test_product_expense(
    db: &Db,
    user_id: &str,
    product_id: &str,
    quantity: f64,
    date: &str,
    category_id: Option<&str>,
) -> String {
    let id = Uuid::new_v4().to_string();
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO product_expenses \
         (id, product_id, quantity, date, notes, receipt, category_id, user_id) \
         VALUES (?, ?, ?, ?, NULL, NULL, ?, ?)",
        (id.as_str(), product_id, quantity, date, category_id, user_id),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test product expense: {}", e));
    id
}

/// In-memory profile for exercising role-scoped fetchers without a session.
pub fn test_profile(id: &str, role: Role, manager_id: Option<&str>) -> Profile {
    Profile {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role,
        account_type: None,
        gender: None,
        tel_number: None,
        country: None,
        currency: None,
        language: "en".to_string(),
        theme: None,
        avatar_url: None,
        manager_id: manager_id.map(str::to_string),
        goal: None,
    }
}
