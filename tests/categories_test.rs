/*!
 * Category & Product Catalog Tests
 *
 * Visibility rules for the category list (own plus global, never another
 * user's), name lookups for record enrichment, and the product catalog
 * fetcher that sale and expense flows join against.
 */

mod common;

use common::*;
use finboard_server::categories::{category_name, fetch_categories};
use finboard_server::models::CategoryKind;
use finboard_server::products::fetch_products;

#[tokio::test]
async fn categories_include_own_and_global_only() {
    let (db, _temp_dir) = setup_test_db().await;
    let user_a = create_test_user(&db, "a@example.com", "Admin", None, None).await;
    let user_b = create_test_user(&db, "b@example.com", "Admin", None, None).await;

    create_test_category(&db, Some(&user_a), "Groceries", "#ff0000", "expense").await;
    create_test_category(&db, None, "Salary", "#00ff00", "income").await;
    create_test_category(&db, Some(&user_b), "Secret", "#0000ff", "expense").await;

    let categories = fetch_categories(&db, &user_a).await.unwrap();
    let mut names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Groceries", "Salary"]);

    let global = categories.iter().find(|c| c.name == "Salary").unwrap();
    assert_eq!(global.user_id, None);
    assert_eq!(global.kind, CategoryKind::Income);
}

#[tokio::test]
async fn category_name_lookup() {
    let (db, _temp_dir) = setup_test_db().await;
    let user_id = create_test_user(&db, "a@example.com", "Admin", None, None).await;
    let category_id =
        create_test_category(&db, Some(&user_id), "Hardware", "#abcdef", "product").await;

    assert_eq!(
        category_name(&db, &category_id).await.unwrap().as_deref(),
        Some("Hardware")
    );
    assert_eq!(category_name(&db, "missing").await.unwrap(), None);
}

#[tokio::test]
async fn products_are_scoped_to_their_owner() {
    let (db, _temp_dir) = setup_test_db().await;
    let owner_id = create_test_user(&db, "owner@example.com", "Admin", None, None).await;
    let other_id = create_test_user(&db, "other@example.com", "Admin", None, None).await;
    let category_id =
        create_test_category(&db, Some(&owner_id), "Hardware", "#abcdef", "product").await;

    create_test_product(&db, &owner_id, "Laptop", 999.99, Some(&category_id)).await;
    create_test_product(&db, &owner_id, "Mouse", 19.99, None).await;
    create_test_product(&db, &other_id, "Desk", 150.0, None).await;

    let products = fetch_products(&db, &owner_id).await.unwrap();
    assert_eq!(products.len(), 2);

    let laptop = products.iter().find(|p| p.name == "Laptop").unwrap();
    assert_eq!(laptop.price, 999.99);
    assert_eq!(laptop.category, "Hardware");

    let mouse = products.iter().find(|p| p.name == "Mouse").unwrap();
    assert_eq!(mouse.category, "Uncategorized");
}

#[test]
fn category_kind_parse_is_case_insensitive() {
    assert_eq!(CategoryKind::parse("Income"), Some(CategoryKind::Income));
    assert_eq!(CategoryKind::parse("EXPENSE"), Some(CategoryKind::Expense));
    assert_eq!(CategoryKind::parse(" product "), Some(CategoryKind::Product));
    assert_eq!(CategoryKind::parse("all"), Some(CategoryKind::All));
    assert_eq!(CategoryKind::parse("misc"), None);
}
