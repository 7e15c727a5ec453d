/*!
 * Employee Listing & Stats Tests
 *
 * Manager scoping for the direct-report list, and the dashboard stat
 * aggregates: head count, activity today, average sales since month start
 * and the top seller.
 */

mod common;

use common::*;
use finboard_server::employees::{
    average_sales_per_employee, count_active_today, count_employees, employee_of_the_month,
    fetch_employees,
};
use finboard_server::models::Role;
use finboard_server::utils::{day_key, today_utc};

#[tokio::test]
async fn employees_are_scoped_to_their_manager() {
    let (db, _temp_dir) = setup_test_db().await;
    let manager_id = create_test_user(&db, "boss@example.com", "Admin", None, None).await;
    let other_manager =
        create_test_user(&db, "boss2@example.com", "Admin", None, None).await;

    let report_a =
        create_test_user(&db, "emp-a@example.com", "Employee", None, Some(&manager_id)).await;
    let report_b =
        create_test_user(&db, "emp-b@example.com", "Employee", None, Some(&manager_id)).await;
    create_test_user(&db, "emp-c@example.com", "Employee", None, Some(&other_manager)).await;

    let employees = fetch_employees(&db, &manager_id).await.unwrap();
    assert_eq!(employees.len(), 2);

    let mut ids: Vec<&str> = employees.iter().map(|e| e.id.as_str()).collect();
    ids.sort();
    let mut expected = vec![report_a.as_str(), report_b.as_str()];
    expected.sort();
    assert_eq!(ids, expected);

    assert!(employees.iter().all(|e| e.role == Role::Employee));
    assert!(
        employees
            .iter()
            .all(|e| e.manager_id.as_deref() == Some(manager_id.as_str()))
    );
}

#[tokio::test]
async fn manager_without_reports_gets_empty_list() {
    let (db, _temp_dir) = setup_test_db().await;
    let manager_id = create_test_user(&db, "boss@example.com", "Admin", None, None).await;

    assert!(fetch_employees(&db, &manager_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_are_zero_without_employees() {
    let (db, _temp_dir) = setup_test_db().await;
    let manager_id = create_test_user(&db, "boss@example.com", "Admin", None, None).await;

    assert_eq!(count_employees(&db, &manager_id).await.unwrap(), 0);
    assert_eq!(count_active_today(&db, &manager_id).await.unwrap(), 0);
    // No division by zero: no employees means average 0.
    assert_eq!(
        average_sales_per_employee(&db, &manager_id).await.unwrap(),
        0
    );
    assert!(
        employee_of_the_month(&db, &manager_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn stats_average_over_all_reports_and_count_todays_sellers() {
    let (db, _temp_dir) = setup_test_db().await;
    let manager_id = create_test_user(&db, "boss@example.com", "Admin", None, None).await;
    let seller = create_named_user(
        &db,
        "alice@example.com",
        "Alice",
        "Stone",
        "Employee",
        None,
        Some(&manager_id),
    )
    .await;
    let idle = create_named_user(
        &db,
        "bob@example.com",
        "Bob",
        "Reed",
        "Employee",
        None,
        Some(&manager_id),
    )
    .await;

    let product_id = create_test_product(&db, &manager_id, "Widget", 50.5, None).await;
    let today = day_key(today_utc());
    create_test_sale(&db, &seller, &product_id, 2.0, &today).await;
    // Far outside the current month; must not count anywhere.
    create_test_sale(&db, &idle, &product_id, 4.0, "2000-01-05").await;

    assert_eq!(count_employees(&db, &manager_id).await.unwrap(), 2);
    assert_eq!(count_active_today(&db, &manager_id).await.unwrap(), 1);
    // 2 * 50.5 = 101 revenue over 2 employees, rounded to 51.
    assert_eq!(
        average_sales_per_employee(&db, &manager_id).await.unwrap(),
        51
    );

    let top = employee_of_the_month(&db, &manager_id).await.unwrap();
    assert_eq!(top.map(|e| e.name), Some("Alice Stone".to_string()));
}

#[tokio::test]
async fn employee_of_the_month_picks_highest_revenue() {
    let (db, _temp_dir) = setup_test_db().await;
    let manager_id = create_test_user(&db, "boss@example.com", "Admin", None, None).await;
    let small = create_named_user(
        &db,
        "alice@example.com",
        "Alice",
        "Stone",
        "Employee",
        None,
        Some(&manager_id),
    )
    .await;
    let big = create_named_user(
        &db,
        "bob@example.com",
        "Bob",
        "Reed",
        "Employee",
        None,
        Some(&manager_id),
    )
    .await;

    let product_id = create_test_product(&db, &manager_id, "Widget", 10.0, None).await;
    let today = day_key(today_utc());
    create_test_sale(&db, &small, &product_id, 1.0, &today).await;
    create_test_sale(&db, &big, &product_id, 3.0, &today).await;

    let top = employee_of_the_month(&db, &manager_id).await.unwrap();
    assert_eq!(top.map(|e| e.name), Some("Bob Reed".to_string()));
}

#[tokio::test]
async fn stats_ignore_other_managers_reports() {
    let (db, _temp_dir) = setup_test_db().await;
    let manager_id = create_test_user(&db, "boss@example.com", "Admin", None, None).await;
    let other_manager = create_test_user(&db, "boss2@example.com", "Admin", None, None).await;
    let outsider =
        create_test_user(&db, "emp@example.com", "Employee", None, Some(&other_manager)).await;

    let product_id = create_test_product(&db, &other_manager, "Widget", 10.0, None).await;
    create_test_sale(&db, &outsider, &product_id, 5.0, &day_key(today_utc())).await;

    assert_eq!(count_active_today(&db, &manager_id).await.unwrap(), 0);
    assert!(
        employee_of_the_month(&db, &manager_id)
            .await
            .unwrap()
            .is_none()
    );
}
