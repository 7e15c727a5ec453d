use std::sync::Arc;

pub mod auth;
pub mod categories;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod database;
pub mod employees;
pub mod errors;
pub mod expenses;
pub mod incomes;
pub mod models;
pub mod products;
pub mod profile;
pub mod reports;
pub mod transactions;
pub mod utils;

use database::Db;
use profile::{DbProfileSource, ProfileService};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub profiles: Arc<ProfileService<DbProfileSource>>,
}

impl AppState {
    pub fn new(db: Db) -> Self {
        let profiles = Arc::new(ProfileService::new(DbProfileSource::new(db.clone())));
        Self { db, profiles }
    }
}
