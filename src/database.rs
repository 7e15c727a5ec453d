use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id             TEXT    PRIMARY KEY,
    email          TEXT    UNIQUE NOT NULL,
    password_hash  TEXT    NOT NULL,
    first_name     TEXT    NOT NULL,
    last_name      TEXT    NOT NULL,
    role           TEXT    NOT NULL,
    account_type   TEXT,
    gender         TEXT,
    tel_number     TEXT,
    country        TEXT,
    currency       TEXT,
    language       TEXT    NOT NULL DEFAULT 'en',
    theme          TEXT,
    avatar_url     TEXT,
    id_manager     TEXT    REFERENCES users(id),
    goal           REAL,
    created_at     INTEGER NOT NULL
);
"#;

const CREATE_CATEGORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS category (
    id       TEXT PRIMARY KEY,
    name     TEXT NOT NULL,
    color    TEXT NOT NULL,
    kind     TEXT NOT NULL,
    user_id  TEXT REFERENCES users(id)
);
"#;

const CREATE_PRODUCT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS product (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    price        REAL NOT NULL,
    barcode      TEXT NOT NULL,
    description  TEXT,
    id_category  TEXT REFERENCES category(id),
    user_id      TEXT NOT NULL REFERENCES users(id)
);
"#;

const CREATE_INCOME_SOURCE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS income_source (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    amount       REAL NOT NULL,
    date         TEXT NOT NULL,
    notes        TEXT,
    id_category  TEXT REFERENCES category(id),
    user_id      TEXT NOT NULL REFERENCES users(id)
);
"#;

const CREATE_INCOME_PRODUCT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS income_product (
    id              TEXT PRIMARY KEY,
    product_id      TEXT NOT NULL REFERENCES product(id),
    quantity        REAL NOT NULL,
    date            TEXT NOT NULL,
    scan_type       TEXT,
    notes           TEXT,
    payment_method  TEXT,
    user_id         TEXT NOT NULL REFERENCES users(id)
);
"#;

const CREATE_NORMAL_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS normal_expenses (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    amount       REAL NOT NULL,
    date         TEXT NOT NULL,
    notes        TEXT,
    receipt      TEXT,
    category_id  TEXT REFERENCES category(id),
    user_id      TEXT NOT NULL REFERENCES users(id)
);
"#;

const CREATE_PRODUCT_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS product_expenses (
    id           TEXT PRIMARY KEY,
    product_id   TEXT NOT NULL REFERENCES product(id),
    quantity     REAL NOT NULL,
    date         TEXT NOT NULL,
    notes        TEXT,
    receipt      TEXT,
    category_id  TEXT REFERENCES category(id),
    user_id      TEXT NOT NULL REFERENCES users(id)
);
"#;

pub type Db = Arc<RwLock<Connection>>;

/// Single shared database (finboard.db). All tables are per-user scoped by
/// a user_id column; the manager hierarchy lives in users.id_manager, so
/// cross-user queries (admin reading subordinate sales) stay in one file.
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join("finboard.db");
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    for ddl in [
        CREATE_USERS_TABLE,
        CREATE_CATEGORY_TABLE,
        CREATE_PRODUCT_TABLE,
        CREATE_INCOME_SOURCE_TABLE,
        CREATE_INCOME_PRODUCT_TABLE,
        CREATE_NORMAL_EXPENSES_TABLE,
        CREATE_PRODUCT_EXPENSES_TABLE,
    ] {
        conn.execute(ddl, ()).await?;
    }
    Ok(Arc::new(RwLock::new(conn)))
}
